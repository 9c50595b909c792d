use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config json could not be parsed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("environment variable {key} has invalid value '{value}'")]
    InvalidEnv { key: &'static str, value: String },

    #[error("{field} must be {expected}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },
}
