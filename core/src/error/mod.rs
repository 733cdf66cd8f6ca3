pub mod code;
#[allow(clippy::module_inception)]
pub mod error;
pub mod publish;
pub mod spec;

pub use code::ErrorCode;
pub use error::{CliError, RunnerError};
pub use publish::PublishError;
pub use spec::{CompileError, SpecError};
