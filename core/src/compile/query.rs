use serde::Serialize;

use super::{CompileContext, Fragment};
use crate::assemble::BuildMode;
use crate::error::CompileError;
use crate::render::Renderer;
use crate::spec::{QueryParams, TaskSpec};

#[derive(Serialize)]
struct QueryRecord<'a> {
    task_id: &'a str,
    environment: &'a str,
    dag_name: &'a str,
    gcp_project_id: &'a str,
    bq_dataset: &'a str,
    table_name: &'a str,
    write_disposition: &'a str,
    sql_query_template: &'a str,
    sql: &'a str,
    doc_md: String,
}

pub(super) fn compile(
    task: &TaskSpec,
    params: &QueryParams,
    mode: BuildMode,
    ctx: &CompileContext<'_>,
    renderer: &Renderer,
) -> Result<Fragment, CompileError> {
    let sql = ctx.read_required(task, "SQL file", &params.sql_file)?;

    let doc_md = match mode {
        BuildMode::Local => String::new(),
        BuildMode::Deployable => deploy_doc(ctx.read_task_doc(task).as_deref(), &sql),
    };

    let record = QueryRecord {
        task_id: &task.id,
        environment: ctx.environment,
        dag_name: &ctx.deployment_name,
        gcp_project_id: ctx.project(task),
        bq_dataset: ctx.dataset(task),
        table_name: params.table_name.trim(),
        write_disposition: ctx.write_disposition(task),
        sql_query_template: params.sql_query_template.trim(),
        sql: &sql,
        doc_md,
    };

    let template = match mode {
        BuildMode::Local => "query_local",
        BuildMode::Deployable => "query_deploy",
    };
    let code = renderer.render(template, &record)?;
    Ok(Fragment::new(task, mode, code))
}

/// Node documentation: task markdown, then the SQL as markdown paragraphs
/// with backticks neutralized.
pub(crate) fn deploy_doc(task_doc: Option<&str>, sql: &str) -> String {
    let sql_doc = sql.replace('`', "'").replace('\n', "\n\n");
    format!(
        "{}\n\n# **SQL Query**\n\n{}\n",
        task_doc.unwrap_or_default(),
        sql_doc
    )
}
