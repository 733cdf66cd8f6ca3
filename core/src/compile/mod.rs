//! Per-kind task compilers.

mod copy;
mod create;
mod query;
mod vm;

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::assemble::BuildMode;
use crate::error::CompileError;
use crate::render::Renderer;
use crate::spec::{resolve_against, TaskParams, TaskSpec, WorkflowSpec};

pub use create::resolve_time_partitioning;

/// Spec-level values every compiler needs.
#[derive(Debug, Clone)]
pub struct CompileContext<'a> {
    pub deployment_name: String,
    pub environment: &'a str,
    pub default_gcp_project_id: &'a str,
    pub default_bq_dataset: &'a str,
    pub default_write_disposition: &'a str,
    pub base_dir: &'a Path,
}

impl<'a> CompileContext<'a> {
    pub fn from_spec(spec: &'a WorkflowSpec) -> Self {
        Self {
            deployment_name: spec.deployment_name(),
            environment: &spec.environment,
            default_gcp_project_id: &spec.default_gcp_project_id,
            default_bq_dataset: &spec.default_bq_dataset,
            default_write_disposition: &spec.default_write_disposition,
            base_dir: &spec.base_dir,
        }
    }

    pub fn project<'t>(&'t self, task: &'t TaskSpec) -> &'t str {
        task.gcp_project_id.as_deref().unwrap_or(self.default_gcp_project_id).trim()
    }

    pub fn dataset<'t>(&'t self, task: &'t TaskSpec) -> &'t str {
        task.bq_dataset.as_deref().unwrap_or(self.default_bq_dataset).trim()
    }

    pub fn write_disposition<'t>(&'t self, task: &'t TaskSpec) -> &'t str {
        task.write_disposition
            .as_deref()
            .unwrap_or(self.default_write_disposition)
            .trim()
    }

    pub fn resolve(&self, rel: &str) -> PathBuf {
        resolve_against(self.base_dir, rel)
    }

    /// Required file-backed input; failure aborts the compilation.
    pub fn read_required(&self, task: &TaskSpec, what: &str, rel: &str) -> Result<String, CompileError> {
        let path = self.resolve(rel);
        std::fs::read_to_string(&path).map_err(|e| {
            CompileError::task_failed(
                &task.id,
                format!("cannot read {what} {}: {e}", path.display()),
            )
        })
    }

    /// Optional per-task markdown. A missing or unreadable file only warns.
    pub fn read_task_doc(&self, task: &TaskSpec) -> Option<String> {
        let rel = task.doc_md.as_deref()?;
        let path = self.resolve(rel);
        match std::fs::read_to_string(&path) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(
                    target: "dagen.compile",
                    stage = "task_doc",
                    task_id = %task.id,
                    path = %path.display(),
                    error = %e,
                    "task documentation unreadable, continuing without it"
                );
                None
            }
        }
    }
}

/// Generated code for one task.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub task_id: String,
    pub code: String,
    /// Procedure the local entry point calls; `None` in deployable mode.
    pub entry_point: Option<String>,
    /// Fields merged back into the task of the post-compilation spec.
    pub spec_updates: Map<String, Value>,
}

impl Fragment {
    fn new(task: &TaskSpec, mode: BuildMode, code: String) -> Self {
        Self {
            task_id: task.id.clone(),
            code,
            entry_point: (mode == BuildMode::Local).then(|| task.id.clone()),
            spec_updates: Map::new(),
        }
    }
}

/// Compiles one task. `Ok(None)` means the kind has no code in this mode.
pub fn compile_task(
    task: &TaskSpec,
    mode: BuildMode,
    ctx: &CompileContext<'_>,
    renderer: &Renderer,
) -> Result<Option<Fragment>, CompileError> {
    let params = task.decode_params()?;
    tracing::debug!(
        target: "dagen.compile",
        stage = "task",
        task_id = %task.id,
        kind = task.kind().as_str(),
        mode = mode.as_str(),
        "compiling task"
    );

    match params {
        TaskParams::Query(p) => query::compile(task, &p, mode, ctx, renderer).map(Some),
        TaskParams::CopyTable(p) => copy::compile(task, &p, mode, ctx, renderer).map(Some),
        TaskParams::CreateTable(p) => create::compile(task, &p, mode, ctx, renderer).map(Some),
        TaskParams::VmLaunch(p) => vm::compile(task, &p, mode, ctx, renderer),
    }
}
