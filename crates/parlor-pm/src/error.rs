use thiserror::Error;

#[derive(Debug, Error)]
pub enum PmError {
    #[error("unknown export target: {0}")]
    UnknownExportTarget(String),

    #[error("unknown tokenizer encoding: {0}")]
    UnknownEncoding(String),

    #[error("tokenizer failed to load: {0}")]
    Tokenizer(String),

    #[error("invalid chat message: {0}")]
    InvalidMessage(String),
}
