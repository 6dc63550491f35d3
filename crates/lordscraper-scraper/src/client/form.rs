//! `application/x-www-form-urlencoded` value encoding.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except ASCII alphanumerics, `_ . - ~` and space, which is
/// turned into `+` afterwards.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b' ');

/// Encodes a form value the way the register's own form submission does:
/// reserved bytes percent-encoded with uppercase hex, spaces as `+`.
#[must_use]
pub fn quote_plus(value: &str) -> String {
    utf8_percent_encode(value, FORM_VALUE)
        .to_string()
        .replace(' ', "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_pipe_and_spaces() {
        assert_eq!(quote_plus("123|1 Main St"), "123%7C1+Main+St");
    }

    #[test]
    fn keeps_unreserved_characters() {
        assert_eq!(quote_plus("a-b_c.d~e"), "a-b_c.d~e");
    }

    #[test]
    fn encodes_plus_and_comma() {
        assert_eq!(quote_plus("Flat 1/2, 3+4"), "Flat+1%2F2%2C+3%2B4");
    }

    #[test]
    fn encodes_non_ascii_as_utf8() {
        assert_eq!(quote_plus("Caf\u{e9}"), "Caf%C3%A9");
    }
}
