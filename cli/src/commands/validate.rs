use dagen_core::api as core_api;

use crate::commands::cli::ValidateArgs;

pub fn handle_validate(args: ValidateArgs) -> Result<i32, core_api::CliError> {
    let report = core_api::validate(&args.spec).map_err(core_api::CompileError::from)?;
    println!(
        "{}: {} task(s), {} dependency edge(s), OK",
        report.deployment_name, report.task_count, report.edge_count
    );
    Ok(0)
}
