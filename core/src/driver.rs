//! Entry points used by the command line: load once, then compile, run or publish.

use std::path::Path;

use crate::assemble::{Assembler, BuildMode, CompiledArtifact};
use crate::config::RunnerConfig;
use crate::error::{CliError, CompileError, PublishError, SpecError};
use crate::publish::{publish as publish_artifacts, DeploymentApi, PublishOutcome, PublishRequest, Prompter};
use crate::runner::{LineTap, LocalRunOutcome, LocalRunner};
use crate::spec::{self, WorkflowSpec};

/// Both artifacts of one compile.
#[derive(Debug, Clone)]
pub struct CompiledWorkflow {
    pub spec: WorkflowSpec,
    /// Local artifact over the full workflow, regardless of the requested subset.
    pub forced_local: CompiledArtifact,
    pub requested: CompiledArtifact,
}

/// Summary returned by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub deployment_name: String,
    pub task_count: usize,
    pub edge_count: usize,
}

pub fn compile(
    spec_path: &Path,
    mode: BuildMode,
    subset: &[String],
) -> Result<CompiledWorkflow, CompileError> {
    let spec = spec::load(spec_path)?;
    compile_loaded(spec, mode, subset)
}

fn compile_loaded(
    spec: WorkflowSpec,
    mode: BuildMode,
    subset: &[String],
) -> Result<CompiledWorkflow, CompileError> {
    let assembler = Assembler::new()?;
    let forced_local = assembler.assemble(&spec, BuildMode::Local, &[])?;
    let requested = if mode == BuildMode::Local && subset.is_empty() {
        forced_local.clone()
    } else {
        assembler.assemble(&spec, mode, subset)?
    };
    Ok(CompiledWorkflow {
        spec,
        forced_local,
        requested,
    })
}

/// Loader and validator only; every violation is in the error.
pub fn validate(spec_path: &Path) -> Result<ValidationReport, SpecError> {
    let (spec, graph) = spec::load_with_graph(spec_path)?;
    Ok(ValidationReport {
        deployment_name: spec.deployment_name(),
        task_count: spec.workflow.len(),
        edge_count: graph.edge_count(),
    })
}

/// Compiles the requested local run-list and executes it. Never touches the network.
pub async fn run_local<F>(
    spec_path: &Path,
    subset: &[String],
    runner_cfg: &RunnerConfig,
    on_line: F,
) -> Result<LocalRunOutcome, CliError>
where
    F: FnMut(&LineTap),
{
    let spec = spec::load(spec_path).map_err(CompileError::from)?;
    let artifact = Assembler::new()?.assemble(&spec, BuildMode::Local, subset)?;
    Ok(LocalRunner::new(runner_cfg).run(&artifact, on_line).await?)
}

/// Publish options that do not come from the spec.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub project_profile: Option<String>,
    pub user_id: String,
    pub assume_yes: bool,
}

/// Compiles the deployable and forced-local artifacts and runs the publish protocol.
pub async fn publish(
    spec_path: &Path,
    api: &dyn DeploymentApi,
    prompter: &mut dyn Prompter,
    opts: PublishOptions,
) -> Result<PublishOutcome, PublishError> {
    let spec = spec::load(spec_path).map_err(CompileError::from)?;
    let compiled = compile_loaded(spec, BuildMode::Deployable, &[])?;
    publish_artifacts(
        api,
        prompter,
        PublishRequest {
            deployable: &compiled.requested,
            forced_local: &compiled.forced_local,
            project_profile: opts.project_profile,
            user_id: opts.user_id,
            assume_yes: opts.assume_yes,
        },
    )
    .await
}
