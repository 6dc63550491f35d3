pub mod app_config;
pub mod config;
pub mod postcode;
pub mod registration;

pub use app_config::{AppConfig, StoreBackend};
pub use config::{load_app_config, load_app_config_from_env};
pub use postcode::{parse_input_entry, parse_postcode_list, read_postcode_file, Postcode};
pub use registration::{AddressCandidate, AddressDetails, RegistrationFields, StoredRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read postcode list {path}: {source}")]
    PostcodeFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
