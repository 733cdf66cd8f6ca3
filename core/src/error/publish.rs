use thiserror::Error;

use super::code::ErrorCode;
use super::spec::CompileError;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("deployment '{0}' already exists and the overwrite was not confirmed")]
    RemoteConflict(String),

    #[error("remote API returned status {status} for {url}: {body}")]
    TransportFailure { status: u16, url: String, body: String },

    #[error("remote API request failed kind={kind} url={url}: {message}")]
    Network {
        kind: &'static str,
        url: String,
        message: String,
    },

    #[error("failed to encode transport payload: {0}")]
    Encoding(String),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl PublishError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::RemoteConflict(_) => ErrorCode::RemoteConflict,
            Self::TransportFailure { .. } => ErrorCode::TransportError,
            Self::Network { .. } => ErrorCode::NetworkError,
            Self::Encoding(_) => ErrorCode::GeneralError,
            Self::Prompt(_) => ErrorCode::GeneralError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Compile(e) => e.error_code(),
        }
    }
}
