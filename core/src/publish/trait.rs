use async_trait::async_trait;

use super::models::{CheckExistsPayload, Existence, SubmitPayload};
use crate::error::PublishError;

/// Remote deployment management API.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    fn name(&self) -> &str;
    async fn list_project_profiles(&self, uid: &str) -> Result<Vec<String>, PublishError>;
    async fn check_exists(&self, payload: &CheckExistsPayload) -> Result<Existence, PublishError>;
    async fn submit(&self, payload: &SubmitPayload) -> Result<String, PublishError>;
}

/// Interactive questions asked during publish.
pub trait Prompter {
    fn say(&mut self, message: &str) -> Result<(), PublishError>;
    /// Returns the answer line, or `None` once input is exhausted.
    fn ask(&mut self, question: &str) -> Result<Option<String>, PublishError>;
}
