use std::io::Write;

use dagen_core::api as core_api;

use crate::commands::cli::RunArgs;

/// Returns the child's exit code.
pub async fn handle_run(
    args: RunArgs,
    cfg: &core_api::AppConfig,
) -> Result<i32, core_api::CliError> {
    let mut runner_cfg = cfg.runner.clone();
    if let Some(python) = args.python.filter(|p| !p.trim().is_empty()) {
        runner_cfg.interpreter = python;
    }

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let outcome = core_api::run_local(&args.spec, &args.tasks, &runner_cfg, |tap| {
        // A closed terminal must not abort the child.
        let _ = match tap.stream {
            core_api::LineStream::Stdout => writeln!(stdout.lock(), "{}", tap.line),
            core_api::LineStream::Stderr => writeln!(stderr.lock(), "{}", tap.line),
        };
    })
    .await?;

    if !outcome.success() {
        tracing::warn!(
            target: "dagen.cli",
            stage = "run",
            exit_code = outcome.exit_code,
            "local run failed"
        );
    }
    Ok(outcome.exit_code)
}
