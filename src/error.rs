use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmlError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{entity} has no `{field}` attribute")]
    MissingField { entity: String, field: &'static str },

    #[error("{entity} has a non-numeric `{field}` value: {value}")]
    InvalidField {
        entity: String,
        field: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, CmlError>;
