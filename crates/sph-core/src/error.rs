use thiserror::Error;

#[derive(Debug, Error)]
pub enum SphError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    #[error("Candles not in chronological order at index {index}")]
    OutOfOrder { index: usize },
}
