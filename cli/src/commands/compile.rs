use std::path::PathBuf;

use dagen_core::api as core_api;

use crate::commands::cli::CompileArgs;

pub fn handle_compile(args: CompileArgs) -> Result<i32, core_api::CliError> {
    let mode = if args.local {
        core_api::BuildMode::Local
    } else {
        core_api::BuildMode::Deployable
    };
    let compiled = core_api::compile(&args.spec, mode, &args.tasks)?;
    let artifact = &compiled.requested;

    let out_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(artifact.file_name()));
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&out_path, &artifact.source)?;

    tracing::info!(
        target: "dagen.cli",
        stage = "compile",
        mode = mode.as_str(),
        output = %out_path.display(),
        "script written"
    );
    println!("{} script written to {}", mode, out_path.display());
    Ok(0)
}
