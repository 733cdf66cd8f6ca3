use serde::{Deserialize, Serialize};

pub const CHECK_DAG_EXISTS: &str = "check_dag_exists";
pub const CLIENT_TYPE: &str = "dagen";

/// Request body wrapper: `{"payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRequest<T> {
    pub payload: T,
}

/// Success body: `{"payload": {"message": ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub payload: ApiMessage<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage<T> {
    pub message: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileListPayload {
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DagFileRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckExistsPayload {
    pub resource: String,
    pub dag_file: DagFileRef,
    pub project_profile: String,
}

impl CheckExistsPayload {
    pub fn new(file_name: String, project_profile: String) -> Self {
        Self {
            resource: CHECK_DAG_EXISTS.to_string(),
            dag_file: DagFileRef { name: file_name },
            project_profile,
        }
    }
}

/// Named, opaquely encoded script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedFile {
    pub name: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPayload {
    /// Encoded transport envelope.
    pub resource: String,
    /// Encoded deployable script.
    pub dag_file: EncodedFile,
    /// Encoded forced-local script, kept for diagnostics.
    pub python_script: EncodedFile,
    pub project_profile: String,
    pub uid: String,
    pub client_type: String,
    pub client_version: String,
}

/// Result of the conflict check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Existence {
    Exists { message: String },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { message: String },
    /// The user declined to overwrite an existing deployment; nothing was sent.
    Declined,
}
