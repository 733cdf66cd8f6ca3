use serde::Serialize;

use super::{CompileContext, Fragment};
use crate::assemble::BuildMode;
use crate::error::CompileError;
use crate::render::Renderer;
use crate::spec::{TaskSpec, VmLaunchParams};

#[derive(Serialize)]
struct VmRecord<'a> {
    task_id: &'a str,
    gcp_project_id: &'a str,
    script_to_execute: &'a [String],
    vm_delete: bool,
    vm_working_directory: &'a str,
    vm_compute_zone: &'a str,
    vm_core_number: &'a str,
    vm_memory_amount: &'a str,
    vm_disk_size: &'a str,
    doc_md: Option<String>,
}

/// Remote compute launches have no local analogue, so local mode yields nothing.
pub(super) fn compile(
    task: &TaskSpec,
    params: &VmLaunchParams,
    mode: BuildMode,
    ctx: &CompileContext<'_>,
    renderer: &Renderer,
) -> Result<Option<Fragment>, CompileError> {
    if mode == BuildMode::Local {
        return Ok(None);
    }

    let record = VmRecord {
        task_id: &task.id,
        gcp_project_id: ctx.project(task),
        script_to_execute: &params.script_to_execute,
        vm_delete: params.vm_delete,
        vm_working_directory: params.vm_working_directory.trim(),
        vm_compute_zone: params.vm_compute_zone.trim(),
        vm_core_number: params.vm_core_number.trim(),
        vm_memory_amount: params.vm_memory_amount.trim(),
        vm_disk_size: params.vm_disk_size.trim(),
        doc_md: ctx.read_task_doc(task),
    };
    let code = renderer.render("vm_deploy", &record)?;
    Ok(Some(Fragment::new(task, mode, code)))
}
