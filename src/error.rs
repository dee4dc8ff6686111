use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Source dataset not found: {0}")]
    SourceNotFound(String),

    #[error("Malformed source record '{id}': {reason}")]
    MalformedSource { id: String, reason: String },

    #[error("Duplicate case identifier: {0}")]
    IdentifierCollision(String),

    #[error("Sink insert failed: {0}")]
    SinkInsert(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, EtlError>;
