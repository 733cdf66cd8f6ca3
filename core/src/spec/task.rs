use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::{TaskKind, TaskSpec};
use crate::error::CompileError;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    pub sql_file: String,
    pub table_name: String,
    #[serde(default)]
    pub sql_query_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopyTableParams {
    pub source_gcp_project_id: String,
    pub source_bq_dataset: String,
    pub source_bq_table: String,
    pub destination_bq_table: String,
    #[serde(default)]
    pub destination_bq_table_date_suffix: bool,
    #[serde(default)]
    pub destination_bq_table_date_suffix_format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTableParams {
    pub ddl_file: String,
    pub bq_table: String,
    #[serde(default)]
    pub force_delete: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmLaunchParams {
    pub script_to_execute: Vec<String>,
    #[serde(default)]
    pub vm_delete: bool,
    #[serde(default = "default_vm_working_directory")]
    pub vm_working_directory: String,
    #[serde(default = "default_vm_compute_zone")]
    pub vm_compute_zone: String,
    #[serde(default = "default_vm_core_number", deserialize_with = "string_or_number")]
    pub vm_core_number: String,
    #[serde(default = "default_vm_memory_amount", deserialize_with = "string_or_number")]
    pub vm_memory_amount: String,
    #[serde(default = "default_vm_disk_size", deserialize_with = "string_or_number")]
    pub vm_disk_size: String,
}

fn default_vm_working_directory() -> String {
    "/tmp".to_string()
}

fn default_vm_compute_zone() -> String {
    "europe-west1-b".to_string()
}

fn default_vm_core_number() -> String {
    "1".to_string()
}

fn default_vm_memory_amount() -> String {
    "4".to_string()
}

fn default_vm_disk_size() -> String {
    "10".to_string()
}

/// Sizing values are written either as `"4"` or `4` in practice.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

/// Decoded kind-specific parameters of a task.
#[derive(Debug, Clone)]
pub enum TaskParams {
    Query(QueryParams),
    CopyTable(CopyTableParams),
    CreateTable(CreateTableParams),
    VmLaunch(VmLaunchParams),
}

impl TaskSpec {
    pub fn decode_params(&self) -> Result<TaskParams, CompileError> {
        Ok(match self.kind() {
            TaskKind::Query => TaskParams::Query(self.decode_as()?),
            TaskKind::CopyTable => TaskParams::CopyTable(self.decode_as()?),
            TaskKind::CreateTable => TaskParams::CreateTable(self.decode_as()?),
            TaskKind::VmLaunch => TaskParams::VmLaunch(self.decode_as()?),
        })
    }

    fn decode_as<T: DeserializeOwned>(&self) -> Result<T, CompileError> {
        serde_json::from_value(Value::Object(self.params.clone()))
            .map_err(|e| CompileError::task_failed(&self.id, e))
    }
}

/// Optional table layout options carried by a DDL document.
#[derive(Debug, Clone, Deserialize)]
pub struct DdlDocument {
    pub bq_table_description: String,
    pub bq_table_schema: Vec<Value>,
    #[serde(default)]
    pub bq_table_clustering_fields: Option<Vec<String>>,
    #[serde(default)]
    pub bq_table_timepartitioning_field: Option<String>,
    #[serde(default)]
    pub bq_table_timepartitioning_expiration_ms: Option<Value>,
    #[serde(default)]
    pub bq_table_timepartitioning_require_partition_filter: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
