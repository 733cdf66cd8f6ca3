use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::CLIENT_TYPE;
use crate::assemble::{DAG_TYPE, GENERATOR_VERSION};
use crate::error::{CompileError, PublishError};
use crate::spec::{QueryParams, TaskKind, WorkflowSpec};

/// Task metadata shipped next to the scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportEnvelope {
    /// Base64 SQL body per query task id.
    pub sql: BTreeMap<String, String>,
    pub short_descriptions: BTreeMap<String, String>,
    pub docs_md: BTreeMap<String, String>,
    pub account: Value,
    pub environment: String,
    /// The full spec, with task `doc_md` replaced by the markdown body.
    pub configuration: Value,
    pub configuration_type: String,
    pub configuration_id: String,
    pub client_type: String,
    pub client_version: String,
}

/// Collects SQL bodies, descriptions and docs for every task of `spec`.
///
/// An unreadable SQL file is fatal; unreadable markdown only warns.
pub fn build_envelope(spec: &WorkflowSpec) -> Result<TransportEnvelope, CompileError> {
    let mut configuration = spec.clone();
    let mut sql = BTreeMap::new();
    let mut short_descriptions = BTreeMap::new();
    let mut docs_md = BTreeMap::new();

    for task in &mut configuration.workflow {
        if let Some(desc) = task.short_description.as_deref() {
            short_descriptions.insert(task.id.clone(), desc.trim().to_string());
        }

        if let Some(rel) = task.doc_md.clone() {
            let path = spec.resolve_path(&rel);
            match std::fs::read_to_string(&path) {
                Ok(body) => {
                    docs_md.insert(task.id.clone(), body.clone());
                    task.doc_md = Some(body);
                }
                Err(e) => tracing::warn!(
                    target: "dagen.publish",
                    stage = "envelope",
                    task_id = %task.id,
                    path = %path.display(),
                    error = %e,
                    "markdown documentation unreadable, continuing"
                ),
            }
        }

        if task.kind() == TaskKind::Query {
            let params: QueryParams = serde_json::from_value(Value::Object(task.params.clone()))
                .map_err(|e| CompileError::task_failed(&task.id, e))?;
            let path = spec.resolve_path(&params.sql_file);
            let body = std::fs::read(&path).map_err(|e| {
                CompileError::task_failed(
                    &task.id,
                    format!("cannot read SQL file {}: {e}", path.display()),
                )
            })?;
            sql.insert(task.id.clone(), STANDARD.encode(body));

            if task.temporary_table.is_none() {
                task.temporary_table = Some(false);
            }
        }
    }

    let configuration = serde_json::to_value(&configuration).map_err(|e| CompileError::Template {
        template: "envelope".to_string(),
        message: e.to_string(),
    })?;

    Ok(TransportEnvelope {
        sql,
        short_descriptions,
        docs_md,
        account: spec.account.clone().unwrap_or(Value::Null),
        environment: spec.environment.clone(),
        configuration,
        configuration_type: DAG_TYPE.to_string(),
        configuration_id: spec.deployment_name(),
        client_type: CLIENT_TYPE.to_string(),
        client_version: GENERATOR_VERSION.to_string(),
    })
}

/// JSON serialization followed by standard base64.
pub fn encode_opaque<T: Serialize + ?Sized>(value: &T) -> Result<String, PublishError> {
    let bytes = serde_json::to_vec(value).map_err(|e| PublishError::Encoding(e.to_string()))?;
    Ok(STANDARD.encode(bytes))
}

pub fn decode_opaque<T: DeserializeOwned>(encoded: &str) -> Result<T, PublishError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| PublishError::Encoding(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| PublishError::Encoding(e.to_string()))
}
