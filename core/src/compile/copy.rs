use serde::Serialize;

use super::{CompileContext, Fragment};
use crate::assemble::BuildMode;
use crate::error::CompileError;
use crate::render::Renderer;
use crate::spec::{CopyTableParams, TaskSpec};

#[derive(Serialize)]
struct CopyRecord<'a> {
    task_id: &'a str,
    source_gcp_project_id: &'a str,
    source_bq_dataset: &'a str,
    source_bq_table: &'a str,
    destination_gcp_project_id: &'a str,
    destination_bq_dataset: &'a str,
    destination_bq_table: &'a str,
    date_suffix: bool,
    date_suffix_format: &'a str,
    doc_md: Option<String>,
}

pub(super) fn compile(
    task: &TaskSpec,
    params: &CopyTableParams,
    mode: BuildMode,
    ctx: &CompileContext<'_>,
    renderer: &Renderer,
) -> Result<Fragment, CompileError> {
    let record = CopyRecord {
        task_id: &task.id,
        source_gcp_project_id: params.source_gcp_project_id.trim(),
        source_bq_dataset: params.source_bq_dataset.trim(),
        source_bq_table: params.source_bq_table.trim(),
        destination_gcp_project_id: ctx.project(task),
        destination_bq_dataset: ctx.dataset(task),
        destination_bq_table: params.destination_bq_table.trim(),
        date_suffix: params.destination_bq_table_date_suffix,
        date_suffix_format: params.destination_bq_table_date_suffix_format.trim(),
        doc_md: match mode {
            BuildMode::Local => None,
            BuildMode::Deployable => ctx.read_task_doc(task),
        },
    };

    let template = match mode {
        BuildMode::Local => "copy_local",
        BuildMode::Deployable => "copy_deploy",
    };
    let code = renderer.render(template, &record)?;
    Ok(Fragment::new(task, mode, code))
}
