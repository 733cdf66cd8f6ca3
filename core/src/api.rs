//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `dagen_core::api` instead of reaching into internal modules.

pub use crate::assemble::{assemble, Assembler, BuildMode, CompiledArtifact, GENERATOR_VERSION};
pub use crate::config::{load_default, ApiConfig, AppConfig, LoggingConfig, RunnerConfig};
pub use crate::driver::{
    compile, publish, run_local, validate, CompiledWorkflow, PublishOptions, ValidationReport,
};
pub use crate::error::{CliError, CompileError, ErrorCode, PublishError, RunnerError, SpecError};
pub use crate::publish::{
    CheckExistsPayload, DeploymentApi, Existence, Prompter, PublishOutcome, SubmitPayload,
};
pub use crate::runner::{LineStream, LineTap, LocalRunOutcome};
pub use crate::spec::{load as load_spec, TaskKind, WorkflowSpec};
