use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry from the postcode search's address dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCandidate {
    /// Human-readable address, also the dedupe key for storage.
    pub display_address: String,
    /// Opaque `id|address` value the register expects back verbatim.
    pub full_address_token: String,
}

/// The five registration fields scraped from a property detail page.
///
/// Every field is optional: the register omits sections it has nothing for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFields {
    pub application_by: Option<String>,
    pub joint_owners: Option<String>,
    pub agent_details: Option<String>,
    pub local_authority: Option<String>,
    pub contact_address: Option<String>,
}

impl RegistrationFields {
    /// `true` when no field was found. Empty results are never stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.application_by.is_none()
            && self.joint_owners.is_none()
            && self.agent_details.is_none()
            && self.local_authority.is_none()
            && self.contact_address.is_none()
    }

    /// Attaches the display address, producing a storable record.
    #[must_use]
    pub fn with_address(self, address: impl Into<String>) -> AddressDetails {
        AddressDetails {
            fields: self,
            address: address.into(),
        }
    }
}

/// Registration details for one address, ready for the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDetails {
    #[serde(flatten)]
    pub fields: RegistrationFields,
    pub address: String,
}

/// A persisted registration as read back from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub postcode: String,
    #[serde(flatten)]
    pub details: AddressDetails,
    pub created_at: DateTime<Utc>,
}
