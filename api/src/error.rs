use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("account data too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
