use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not decode '{path}' with any of: {tried}")]
    Encoding { path: String, tried: String },

    #[error("Reference table error: {0}")]
    Reference(String),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, RosterError>;
