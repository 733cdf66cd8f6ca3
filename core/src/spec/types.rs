use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_ENVIRONMENT: &str = "PROD";

/// Root of a workflow specification document.
///
/// Fields the compiler does not interpret are kept in `extra` so the full
/// document can be re-emitted in the transport envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub configuration_id: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    /// Literal argument list of the target datetime constructor, e.g. `2019, 7, 1`.
    pub start_date: String,

    pub schedule_interval: String,

    #[serde(default = "default_max_active_runs")]
    pub max_active_runs: u32,

    #[serde(default = "default_task_concurrency")]
    pub task_concurrency: u32,

    #[serde(default)]
    pub catchup: bool,

    pub short_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_md: Option<String>,

    pub default_gcp_project_id: String,

    pub default_bq_dataset: String,

    pub default_write_disposition: String,

    pub task_dependencies: Vec<String>,

    pub workflow: Vec<TaskSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Directory of the spec file; relative SQL/DDL/markdown paths resolve here.
    #[serde(skip)]
    pub base_dir: PathBuf,

    /// Body of the DAG-level markdown, read by the loader.
    #[serde(skip)]
    pub doc_text: Option<String>,
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_max_active_runs() -> u32 {
    1
}

fn default_task_concurrency() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Unscheduled,
    Interval(String),
}

impl WorkflowSpec {
    /// `configuration_id + "_" + environment`, unique per deployment.
    pub fn deployment_name(&self) -> String {
        format!("{}_{}", self.configuration_id, self.environment)
    }

    pub fn schedule(&self) -> Schedule {
        match self.schedule_interval.trim() {
            "None" | "unscheduled" => Schedule::Unscheduled,
            other => Schedule::Interval(other.to_string()),
        }
    }

    pub fn task(&self, id: &str) -> Option<&TaskSpec> {
        self.workflow.iter().find(|t| t.id == id)
    }

    pub fn resolve_path(&self, rel: &str) -> PathBuf {
        resolve_against(&self.base_dir, rel)
    }
}

/// Absolute paths are kept, relative ones are joined onto `base`.
pub fn resolve_against(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel.trim());
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// One node of the pipeline graph. Kind-specific parameters stay in `params`
/// until a compiler decodes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_md: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bq_dataset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_table: Option<bool>,

    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Closed set of task kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Query,
    CopyTable,
    CreateTable,
    VmLaunch,
}

impl TaskKind {
    pub fn from_task_type(task_type: Option<&str>) -> Self {
        match task_type.map(str::trim) {
            Some("copy_gbq_table") => Self::CopyTable,
            Some("create_gbq_table") => Self::CreateTable,
            Some("vm_launcher") => Self::VmLaunch,
            _ => Self::Query,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::CopyTable => "copy_gbq_table",
            Self::CreateTable => "create_gbq_table",
            Self::VmLaunch => "vm_launcher",
        }
    }
}

impl TaskSpec {
    pub fn kind(&self) -> TaskKind {
        TaskKind::from_task_type(self.task_type.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_task_type_is_query() {
        assert_eq!(TaskKind::from_task_type(None), TaskKind::Query);
        assert_eq!(TaskKind::from_task_type(Some("sql")), TaskKind::Query);
        assert_eq!(
            TaskKind::from_task_type(Some(" vm_launcher ")),
            TaskKind::VmLaunch
        );
    }

    #[test]
    fn task_round_trips_unknown_fields() {
        let raw = serde_json::json!({
            "id": "load_sales",
            "sql_file": "load.sql",
            "table_name": "sales",
            "owner_team": "finance"
        });
        let task: TaskSpec = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(task.params.get("owner_team"), Some(&Value::from("finance")));
        assert_eq!(serde_json::to_value(&task).unwrap(), raw);
    }
}
