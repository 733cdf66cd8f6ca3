use std::path::{Path, PathBuf};

use serde_json::Value;

use super::deps::DependencyGraph;
use super::types::{TaskKind, WorkflowSpec};
use super::validate::{normalize_start_date, validate};
use crate::error::SpecError;

/// Root fields without a default.
pub const REQUIRED_FIELDS: &[&str] = &[
    "configuration_id",
    "start_date",
    "schedule_interval",
    "short_description",
    "default_gcp_project_id",
    "default_bq_dataset",
    "default_write_disposition",
    "task_dependencies",
    "workflow",
];

/// Reads, normalizes and validates a workflow specification file.
pub fn load(path: &Path) -> Result<WorkflowSpec, SpecError> {
    load_with_graph(path).map(|(spec, _)| spec)
}

/// [`load`], also returning the dependency graph built during validation.
pub fn load_with_graph(path: &Path) -> Result<(WorkflowSpec, DependencyGraph), SpecError> {
    let text = std::fs::read_to_string(path).map_err(|source| SpecError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    parse_with_graph(&text, path, base_dir)
}

/// Same as [`load`] for an in-memory document; `path` is only used in errors.
pub fn parse_spec(text: &str, path: &Path, base_dir: PathBuf) -> Result<WorkflowSpec, SpecError> {
    parse_with_graph(text, path, base_dir).map(|(spec, _)| spec)
}

fn parse_with_graph(
    text: &str,
    path: &Path,
    base_dir: PathBuf,
) -> Result<(WorkflowSpec, DependencyGraph), SpecError> {
    let malformed = |message: String| SpecError::MalformedSpec {
        path: path.to_path_buf(),
        message,
    };

    let mut root: Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
    let Value::Object(map) = &mut root else {
        return Err(malformed("top-level value must be an object".to_string()));
    };

    if !map.contains_key("default_bq_dataset") {
        if let Some(v) = map.remove("default_dataset") {
            map.insert("default_bq_dataset".to_string(), v);
        }
    }

    for field in REQUIRED_FIELDS {
        if !map.contains_key(*field) {
            return Err(SpecError::MissingRequiredField((*field).to_string()));
        }
    }
    if let Some(Value::Array(items)) = map.get("workflow") {
        for (i, item) in items.iter().enumerate() {
            if item.get("id").is_none() {
                return Err(SpecError::MissingRequiredField(format!("workflow[{i}].id")));
            }
        }
    }

    let mut spec: WorkflowSpec =
        serde_json::from_value(root).map_err(|e| malformed(e.to_string()))?;
    spec.base_dir = base_dir;
    normalize(&mut spec);
    spec.start_date = normalize_start_date(&spec.start_date)?;
    let graph = validate(&spec)?;

    if let Some(doc) = spec.doc_md.as_deref() {
        let doc_path = spec.resolve_path(doc);
        let body = std::fs::read_to_string(&doc_path)
            .map_err(|source| SpecError::Unreadable { path: doc_path, source })?;
        spec.doc_text = Some(body);
    }

    tracing::info!(
        target: "dagen.spec",
        stage = "load",
        path = %path.display(),
        deployment = %spec.deployment_name(),
        tasks = spec.workflow.len(),
        "workflow specification loaded"
    );
    Ok((spec, graph))
}

/// Trims identifiers and persists loader defaults so later stages and the
/// envelope see explicit values.
fn normalize(spec: &mut WorkflowSpec) {
    spec.environment = spec.environment.trim().to_string();
    for task in &mut spec.workflow {
        task.id = task.id.trim().to_string();
        if task.kind() == TaskKind::Query && task.temporary_table.is_none() {
            task.temporary_table = Some(false);
        }
    }
}
