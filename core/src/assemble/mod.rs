//! Script assembly: prelude, helpers, fragments, then mode-specific tail.

mod artifact;

use serde::Serialize;
use serde_json::Value;

pub use artifact::{BuildMode, CompiledArtifact};

use crate::compile::{compile_task, CompileContext};
use crate::error::CompileError;
use crate::render::{Renderer, HELPERS, PRELUDE, TELEMETRY};
use crate::spec::{Schedule, TaskSpec, WorkflowSpec};

pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_OWNER: &str = "dagen";
pub const DAG_TYPE: &str = "gbq-to-gbq";
pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_RETRY_DELAY_MINUTES: u32 = 2;

/// Telemetry node ids every task is wired to.
pub const NOTIFY_AFTER_CONFIG: &str = "notify_after_config";
pub const NOTIFY_SUCCESS: &str = "notify_success";
pub const NOTIFY_FAILED: &str = "notify_failed";

#[derive(Serialize)]
struct DeployHeader<'a> {
    owner: &'a str,
    retries: u32,
    retry_delay_minutes: u32,
    start_date: &'a str,
    dag_name: &'a str,
    dag_type: &'a str,
    generator_version: &'a str,
    task_concurrency: u32,
    max_active_runs: u32,
    schedule: Value,
    catchup: bool,
    description: &'a str,
    doc_md: &'a str,
}

#[derive(Serialize)]
struct LocalMain<'a> {
    procedures: &'a [String],
}

#[derive(Serialize)]
struct Wiring<'a> {
    dependency_lines: &'a [String],
    task_ids: Vec<&'a str>,
}

/// Holds the compiled templates so both build modes share one renderer.
pub struct Assembler {
    renderer: Renderer,
}

impl Assembler {
    pub fn new() -> Result<Self, CompileError> {
        Ok(Self {
            renderer: Renderer::new()?,
        })
    }

    /// Builds one artifact. `subset` restricts and orders the run-list in
    /// local mode and is ignored in deployable mode.
    pub fn assemble(
        &self,
        spec: &WorkflowSpec,
        mode: BuildMode,
        subset: &[String],
    ) -> Result<CompiledArtifact, CompileError> {
        let ctx = CompileContext::from_spec(spec);
        let mut out_spec = spec.clone();
        let mut source = String::new();

        source.push_str(PRELUDE);
        source.push_str(HELPERS);

        if mode == BuildMode::Deployable {
            source.push_str(&self.render_header(spec, &ctx.deployment_name)?);
        }

        let render_set = select_tasks(spec, mode, subset)?;

        let mut procedures = Vec::new();
        for task in &render_set {
            match compile_task(task, mode, &ctx, &self.renderer)? {
                Some(fragment) => {
                    source.push_str(&fragment.code);
                    if let Some(entry) = fragment.entry_point {
                        procedures.push(entry);
                    }
                    if !fragment.spec_updates.is_empty() {
                        if let Some(t) = out_spec
                            .workflow
                            .iter_mut()
                            .find(|t| t.id == fragment.task_id)
                        {
                            t.params.extend(fragment.spec_updates);
                        }
                    }
                }
                None => {
                    tracing::warn!(
                        target: "dagen.assemble",
                        stage = "fragments",
                        task_id = %task.id,
                        kind = task.kind().as_str(),
                        "task has no local procedure, skipped from the run-list"
                    );
                }
            }
        }

        match mode {
            BuildMode::Local => {
                let main = LocalMain {
                    procedures: &procedures,
                };
                source.push_str(&self.renderer.render("local_main", &main)?);
            }
            BuildMode::Deployable => {
                source.push_str(TELEMETRY);
                let wiring = Wiring {
                    dependency_lines: &spec.task_dependencies,
                    task_ids: spec.workflow.iter().map(|t| t.id.as_str()).collect(),
                };
                source.push_str(&self.renderer.render("wiring", &wiring)?);
            }
        }

        tracing::info!(
            target: "dagen.assemble",
            stage = "done",
            mode = mode.as_str(),
            deployment = %ctx.deployment_name,
            tasks = render_set.len(),
            bytes = source.len(),
            "artifact assembled"
        );

        Ok(CompiledArtifact {
            kind: mode,
            deployment_name: ctx.deployment_name,
            source,
            spec: out_spec,
        })
    }

    fn render_header(&self, spec: &WorkflowSpec, dag_name: &str) -> Result<String, CompileError> {
        let schedule = match spec.schedule() {
            Schedule::Unscheduled => Value::Null,
            Schedule::Interval(s) => Value::String(s),
        };
        let header = DeployHeader {
            owner: DEFAULT_OWNER,
            retries: DEFAULT_RETRIES,
            retry_delay_minutes: DEFAULT_RETRY_DELAY_MINUTES,
            start_date: &spec.start_date,
            dag_name,
            dag_type: DAG_TYPE,
            generator_version: GENERATOR_VERSION,
            task_concurrency: spec.task_concurrency,
            max_active_runs: spec.max_active_runs,
            schedule,
            catchup: spec.catchup,
            description: &spec.short_description,
            doc_md: spec.doc_text.as_deref().unwrap_or_default(),
        };
        self.renderer.render("deploy_header", &header)
    }
}

/// Convenience wrapper building a fresh [`Assembler`].
pub fn assemble(
    spec: &WorkflowSpec,
    mode: BuildMode,
    subset: &[String],
) -> Result<CompiledArtifact, CompileError> {
    Assembler::new()?.assemble(spec, mode, subset)
}

fn select_tasks<'a>(
    spec: &'a WorkflowSpec,
    mode: BuildMode,
    subset: &[String],
) -> Result<Vec<&'a TaskSpec>, CompileError> {
    if mode == BuildMode::Deployable || subset.is_empty() {
        return Ok(spec.workflow.iter().collect());
    }

    subset
        .iter()
        .map(|id| {
            let id = id.trim();
            spec.task(id)
                .ok_or_else(|| CompileError::UnknownLocalTask(id.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_spec;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::Path;

    fn fixture() -> (tempfile::TempDir, WorkflowSpec) {
        let dir = tempfile::tempdir().unwrap();
        for id in ["t1_q", "t2_q", "t3_q", "t4_q"] {
            std::fs::write(dir.path().join(format!("{id}.sql")), format!("SELECT '{id}'\n")).unwrap();
        }
        let workflow: Vec<Value> = ["t1_q", "t2_q", "t3_q", "t4_q"]
            .iter()
            .map(|id| json!({"id": id, "sql_file": format!("{id}.sql"), "table_name": id}))
            .collect();
        let doc = json!({
            "configuration_id": "demo",
            "start_date": "2019, 7, 1",
            "schedule_interval": "None",
            "short_description": "Demo \"pipeline\"",
            "default_gcp_project_id": "acme",
            "default_bq_dataset": "ds",
            "default_write_disposition": "WRITE_TRUNCATE",
            "task_dependencies": ["t1_q >> [t2_q, t3_q]", "[t2_q, t3_q] >> t4_q"],
            "workflow": workflow
        });
        let spec = parse_spec(&doc.to_string(), Path::new("demo.json"), dir.path().to_path_buf())
            .unwrap();
        (dir, spec)
    }

    #[test]
    fn local_subset_renders_only_requested_tasks_in_order() {
        let (_dir, spec) = fixture();
        let subset = vec!["t4_q".to_string(), "t2_q".to_string()];
        let art = assemble(&spec, BuildMode::Local, &subset).unwrap();

        assert!(art.source.contains("def t4_q():"));
        assert!(art.source.contains("def t2_q():"));
        assert!(!art.source.contains("def t1_q():"));
        assert!(!art.source.contains("def t3_q():"));
        assert!(art.source.find("def t4_q():") < art.source.find("def t2_q():"));
        assert!(art.source.ends_with("    t4_q()\n    t2_q()\n"));
        assert!(!art.source.contains("import airflow"));
    }

    #[test]
    fn unknown_local_task_fails_on_first_miss() {
        let (_dir, spec) = fixture();
        let subset = vec!["t1_q".into(), "nope_a".into(), "nope_b".into()];
        match assemble(&spec, BuildMode::Local, &subset) {
            Err(CompileError::UnknownLocalTask(id)) => assert_eq!(id, "nope_a"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn deployable_wiring_is_verbatim_plus_trailing_edges() {
        let (_dir, spec) = fixture();
        let art = assemble(&spec, BuildMode::Deployable, &[]).unwrap();
        let wiring = &art.source[art.source.find("# Task dependencies").unwrap()..];

        let mut expected = String::from(
            "# Task dependencies\n    #\n    notify_start >> initialize >> notify_after_config\n    initialize >> notify_deactivated\n    t1_q >> [t2_q, t3_q]\n    [t2_q, t3_q] >> t4_q\n",
        );
        for id in ["t1_q", "t2_q", "t3_q", "t4_q"] {
            expected.push_str(&format!(
                "    {id} << notify_after_config\n    {id} >> notify_success\n    {id} >> notify_failed\n"
            ));
        }
        assert_eq!(wiring, expected);
    }

    #[test]
    fn deployable_header_declares_dag() {
        let (_dir, spec) = fixture();
        let art = assemble(&spec, BuildMode::Deployable, &[]).unwrap();
        assert_eq!(art.file_name(), "demo_PROD.py");
        assert!(art.source.contains("'retries': 1,"));
        assert!(art.source.contains("datetime.timedelta(minutes=2)"));
        assert!(art.source.contains("'start_date': datetime.datetime(2019, 7, 1),"));
        assert!(art.source.contains("_dag_name = \"demo_PROD\""));
        assert!(art.source.contains("schedule_interval=None,"));
        assert!(art.source.contains("catchup=False,"));
        assert!(art.source.contains("description=\"Demo \\\"pipeline\\\"\") as dag:"));
        let prelude_end = art.source.find("import airflow").unwrap();
        assert!(art.source.find("def execute_gbq(").unwrap() < prelude_end);
    }

    #[test]
    fn assembly_is_deterministic() {
        let (_dir, spec) = fixture();
        let assembler = Assembler::new().unwrap();
        for mode in [BuildMode::Local, BuildMode::Deployable] {
            let a = assembler.assemble(&spec, mode, &[]).unwrap();
            let b = assembler.assemble(&spec, mode, &[]).unwrap();
            assert_eq!(a.source, b.source);
        }
    }
}
