use thiserror::Error;

use super::code::ErrorCode;
use super::publish::PublishError;
use super::spec::CompileError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("local run failed: {0}")]
    Runner(#[from] RunnerError),
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Compile(e) => e.error_code(),
            Self::Runner(_) => ErrorCode::RunnerError,
            Self::Publish(e) => e.error_code(),
            Self::Command(_) => ErrorCode::GeneralError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::GeneralError,
        }
    }
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to prepare scratch script: {0}")]
    Scratch(#[source] std::io::Error),
    #[error("spawn failed: {cmd}: {source}")]
    Spawn {
        cmd: String,
        source: std::io::Error,
    },
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("failed to wait for child process: {0}")]
    Wait(#[source] std::io::Error),
}
