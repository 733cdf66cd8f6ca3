use std::fmt::Write as _;
use std::path::PathBuf;

use thiserror::Error;

use super::code::ErrorCode;

/// Loader and validator failures.
///
/// Set-checks (dependency membership, identifier grammar, duplicate ids)
/// carry every violation they found, never only the first one.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error while parsing JSON file {}: {message}", path.display())]
    MalformedSpec { path: PathBuf, message: String },

    #[error("required field '{0}' is missing from the workflow specification")]
    MissingRequiredField(String),

    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("{}", render_missing_tasks(.missing))]
    DependencyGraph { missing: Vec<String> },

    #[error("{}", render_malformed_ids(.malformed))]
    IdentifierGrammar { malformed: Vec<String> },

    #[error("duplicate task ids in workflow: {}", .duplicates.join(", "))]
    DuplicateTaskId { duplicates: Vec<String> },

    #[error("malformed dependency expression \"{expression}\": {reason}")]
    MalformedDependency { expression: String, reason: String },

    #[error("circular dependency detected: {0}")]
    DependencyCycle(String),
}

impl SpecError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unreadable { .. } => ErrorCode::FileNotFound,
            Self::MalformedSpec { .. } => ErrorCode::ParseError,
            Self::MissingRequiredField(_) => ErrorCode::MissingField,
            Self::InvalidField { .. } => ErrorCode::ValidationError,
            Self::DependencyGraph { .. } => ErrorCode::DependencyError,
            Self::IdentifierGrammar { .. } => ErrorCode::ValidationError,
            Self::DuplicateTaskId { .. } => ErrorCode::ValidationError,
            Self::MalformedDependency { .. } => ErrorCode::DependencyError,
            Self::DependencyCycle(_) => ErrorCode::CircularDependency,
        }
    }

    /// One human-readable line per violation.
    pub fn violations(&self) -> Vec<String> {
        match self {
            Self::DependencyGraph { missing } => missing.iter().map(|id| missing_task_line(id)).collect(),
            Self::IdentifierGrammar { malformed } => {
                malformed.iter().map(|id| malformed_id_line(id)).collect()
            }
            Self::DuplicateTaskId { duplicates } => duplicates
                .iter()
                .map(|id| format!("the task ID \"{id}\" is declared more than once"))
                .collect(),
            other => vec![other.to_string()],
        }
    }
}

fn missing_task_line(id: &str) -> String {
    format!(
        "the task with ID \"{id}\" is present in \"task_dependencies\" but not in \"workflow\""
    )
}

fn malformed_id_line(id: &str) -> String {
    format!(
        "the task ID \"{id}\" is malformed: first character must be a letter, \
         letters, numbers and underscores may follow, the last character cannot be an underscore"
    )
}

fn render_missing_tasks(missing: &[String]) -> String {
    let mut out = format!(
        "{} task(s) referenced in task_dependencies are not declared in workflow:",
        missing.len()
    );
    for id in missing {
        let _ = write!(out, "\n  - {}", missing_task_line(id));
    }
    out
}

fn render_malformed_ids(malformed: &[String]) -> String {
    let mut out = format!("{} malformed task id(s):", malformed.len());
    for id in malformed {
        let _ = write!(out, "\n  - {}", malformed_id_line(id));
    }
    out
}

/// Failures while turning a validated spec into an artifact.
///
/// All of these are fatal: assembly stops at the first one and no partial
/// artifact is produced.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("error while parsing DDL JSON file {}: {message}", path.display())]
    MalformedDdl { path: PathBuf, message: String },

    #[error("failed to compile task '{task_id}': {cause}")]
    TaskCompilationFailed { task_id: String, cause: String },

    #[error("the task \"{0}\" requested for local execution does not exist in the workflow")]
    UnknownLocalTask(String),

    #[error("template error in {template}: {message}")]
    Template { template: String, message: String },
}

impl CompileError {
    pub fn task_failed(task_id: &str, cause: impl std::fmt::Display) -> Self {
        Self::TaskCompilationFailed {
            task_id: task_id.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Spec(e) => e.error_code(),
            Self::MalformedDdl { .. } => ErrorCode::ParseError,
            Self::TaskCompilationFailed { .. } => ErrorCode::CompilationError,
            Self::UnknownLocalTask(_) => ErrorCode::TaskNotFound,
            Self::Template { .. } => ErrorCode::GeneralError,
        }
    }
}
