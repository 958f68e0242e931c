use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Config directory not found at {0}. Run 'pos-admin init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write payout draft: {0}")]
    DraftWrite(#[from] toml::ser::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown role {0} in [session]. Use 1 for an admin or 0 for staff.")]
    UnknownRole(u8),

    #[error("Staff user '{0}' has no associated admin. Set 'admin' in [session].")]
    MissingAdmin(String),

    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Request to {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode payout: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Row {index} does not exist (the payout has {count} row(s))")]
    RowOutOfRange { index: usize, count: usize },

    #[error("Amounts are too large to total. Correct the received amounts and try again.")]
    AmountOverflow,

    #[error("Invoice '{0}' is not in the report")]
    InvoiceNotFound(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid {field} '{value}'. Expected one of: {expected}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, AdminError>;
