use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing setting '{setting}'. Set it in config.toml or export {env}.")]
    MissingSetting {
        setting: &'static str,
        env: &'static str,
    },

    #[error("Invalid value '{value}' for {setting}: {reason}")]
    InvalidSetting {
        setting: String,
        value: String,
        reason: String,
    },

    #[error("Failed to fetch {endpoint}: {reason}")]
    Fetch { endpoint: String, reason: String },

    #[error("Malformed invoice record {id}: invalid {field} '{value}'")]
    MalformedRecord {
        id: String,
        field: &'static str,
        value: String,
    },

    #[error("{label} overflowed the decimal range")]
    TotalOverflow { label: &'static str },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidDate(String),

    #[error("Failed to render chart: {0}")]
    Chart(String),

    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to deliver report: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
