use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{CompileContext, Fragment};
use crate::assemble::BuildMode;
use crate::error::CompileError;
use crate::render::Renderer;
use crate::spec::{CreateTableParams, DdlDocument, TaskSpec};

/// DDL keys copied onto the task in the post-compilation spec.
const MERGED_DDL_KEYS: &[&str] = &[
    "bq_table_description",
    "bq_table_schema",
    "bq_table_clustering_fields",
    "bq_table_timepartitioning_field",
    "bq_table_timepartitioning_expiration_ms",
    "bq_table_timepartitioning_require_partition_filter",
];

#[derive(Serialize)]
struct CreateRecord<'a> {
    task_id: &'a str,
    gcp_project_id: &'a str,
    bq_dataset: &'a str,
    bq_table: &'a str,
    force_delete: bool,
    description: &'a str,
    schema: &'a [Value],
    clustering_fields: Option<&'a [String]>,
    time_partitioning: Option<Value>,
    doc_md: Option<String>,
}

pub(super) fn compile(
    task: &TaskSpec,
    params: &CreateTableParams,
    mode: BuildMode,
    ctx: &CompileContext<'_>,
    renderer: &Renderer,
) -> Result<Fragment, CompileError> {
    let (ddl, raw) = load_ddl(task, params, ctx)?;

    let clustering = ddl
        .bq_table_clustering_fields
        .as_deref()
        .filter(|fields| !fields.is_empty());

    let record = CreateRecord {
        task_id: &task.id,
        gcp_project_id: ctx.project(task),
        bq_dataset: ctx.dataset(task),
        bq_table: params.bq_table.trim(),
        force_delete: params.force_delete,
        description: ddl.bq_table_description.trim(),
        schema: &ddl.bq_table_schema,
        clustering_fields: clustering,
        time_partitioning: resolve_time_partitioning(&ddl),
        doc_md: match mode {
            BuildMode::Local => None,
            BuildMode::Deployable => ctx.read_task_doc(task),
        },
    };

    let template = match mode {
        BuildMode::Local => "create_local",
        BuildMode::Deployable => "create_deploy",
    };
    let code = renderer.render(template, &record)?;

    let mut fragment = Fragment::new(task, mode, code);
    for key in MERGED_DDL_KEYS {
        if let Some(v) = raw.get(*key) {
            fragment.spec_updates.insert((*key).to_string(), v.clone());
        }
    }
    Ok(fragment)
}

fn load_ddl(
    task: &TaskSpec,
    params: &CreateTableParams,
    ctx: &CompileContext<'_>,
) -> Result<(DdlDocument, Map<String, Value>), CompileError> {
    let path = ctx.resolve(&params.ddl_file);
    let text = ctx.read_required(task, "DDL file", &params.ddl_file)?;
    let malformed = |message: String| CompileError::MalformedDdl {
        path: path.clone(),
        message,
    };

    let raw: Value = serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))?;
    let Value::Object(map) = raw else {
        return Err(malformed("top-level value must be an object".to_string()));
    };
    let ddl: DdlDocument =
        serde_json::from_value(Value::Object(map.clone())).map_err(|e| malformed(e.to_string()))?;
    Ok((ddl, map))
}

/// Partitioning record passed to the create-table helper.
///
/// Present when any partitioning option is set, and also whenever
/// clustering fields are given since clustering requires a partitioned table.
pub fn resolve_time_partitioning(ddl: &DdlDocument) -> Option<Value> {
    let explicit = ddl.bq_table_timepartitioning_field.is_some()
        || ddl.bq_table_timepartitioning_expiration_ms.is_some()
        || ddl.bq_table_timepartitioning_require_partition_filter.is_some();
    let clustered = ddl
        .bq_table_clustering_fields
        .as_ref()
        .is_some_and(|fields| !fields.is_empty());

    if !explicit && !clustered {
        return None;
    }

    Some(json!({
        "field": ddl.bq_table_timepartitioning_field,
        "expiration_ms": ddl.bq_table_timepartitioning_expiration_ms.as_ref().map(expiration_as_number),
        "require_partition_filter": ddl.bq_table_timepartitioning_require_partition_filter,
    }))
}

/// Expirations are often written as strings; the helper needs an integer.
fn expiration_as_number(v: &Value) -> Value {
    match v {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| v.clone()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::compile_task;
    use super::super::test_support::{context, task};
    use super::*;

    fn ddl(raw: Value) -> DdlDocument {
        serde_json::from_value(raw).unwrap()
    }

    fn create_task() -> TaskSpec {
        task(json!({
            "id": "create_sales",
            "task_type": "create_gbq_table",
            "ddl_file": "sales.ddl.json",
            "bq_table": "sales"
        }))
    }

    #[test]
    fn clustering_implies_partitioning() {
        let d = ddl(json!({
            "bq_table_description": "d",
            "bq_table_schema": [],
            "bq_table_clustering_fields": ["country"]
        }));
        assert_eq!(
            resolve_time_partitioning(&d),
            Some(json!({"field": null, "expiration_ms": null, "require_partition_filter": null}))
        );
    }

    #[test]
    fn no_options_means_no_partitioning() {
        let d = ddl(json!({
            "bq_table_description": "d",
            "bq_table_schema": [],
            "bq_table_clustering_fields": []
        }));
        assert_eq!(resolve_time_partitioning(&d), None);
    }

    #[test]
    fn explicit_options_are_kept() {
        let d = ddl(json!({
            "bq_table_description": "d",
            "bq_table_schema": [],
            "bq_table_timepartitioning_field": "event_date",
            "bq_table_timepartitioning_expiration_ms": "86400000",
            "bq_table_timepartitioning_require_partition_filter": true
        }));
        assert_eq!(
            resolve_time_partitioning(&d),
            Some(json!({
                "field": "event_date",
                "expiration_ms": 86400000,
                "require_partition_filter": true
            }))
        );
    }

    #[test]
    fn clustered_table_renders_partitioning_and_merges_ddl() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sales.ddl.json"),
            json!({
                "bq_table_description": "Sales facts",
                "bq_table_schema": [{"name": "country", "type": "STRING", "mode": "REQUIRED"}],
                "bq_table_clustering_fields": ["country"]
            })
            .to_string(),
        )
        .unwrap();

        let r = Renderer::new().unwrap();
        let frag = compile_task(&create_task(), BuildMode::Local, &context(dir.path()), &r)
            .unwrap()
            .unwrap();

        assert!(frag.code.contains("bq_table_clustering_fields=[\"country\"],"));
        assert!(frag.code.contains(
            "time_partitioning={\"expiration_ms\": None, \"field\": None, \"require_partition_filter\": None},"
        ), "{}", frag.code);
        assert!(frag.code.contains("force_delete=False,"));
        assert!(frag.code.contains(
            "bq_table_schema=[{\"mode\": \"REQUIRED\", \"name\": \"country\", \"type\": \"STRING\"}],"
        ));
        assert_eq!(
            frag.spec_updates.get("bq_table_description"),
            Some(&json!("Sales facts"))
        );
        assert!(!frag.spec_updates.contains_key("bq_table_timepartitioning_field"));
    }

    #[test]
    fn malformed_ddl_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sales.ddl.json"), "{ nope").unwrap();
        let r = Renderer::new().unwrap();
        let err = compile_task(&create_task(), BuildMode::Deployable, &context(dir.path()), &r)
            .unwrap_err();
        match err {
            CompileError::MalformedDdl { path, .. } => {
                assert!(path.ends_with("sales.ddl.json"))
            }
            other => panic!("unexpected: {other}"),
        }
    }
}
