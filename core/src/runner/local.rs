use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::mpsc;

use super::io_pump::{pump_lines, LineStream, LineTap};
use crate::assemble::{BuildMode, CompiledArtifact};
use crate::config::RunnerConfig;
use crate::error::RunnerError;

#[derive(Debug, Clone)]
pub struct LocalRunOutcome {
    pub exit_code: i32,
    pub lines: u64,
}

impl LocalRunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes local-debug artifacts with the configured interpreter.
#[derive(Debug, Clone)]
pub struct LocalRunner {
    interpreter: String,
    line_channel_capacity: usize,
}

impl LocalRunner {
    pub fn new(cfg: &RunnerConfig) -> Self {
        Self {
            interpreter: cfg.interpreter.clone(),
            line_channel_capacity: cfg.line_channel_capacity.max(1),
        }
    }

    /// Writes the artifact into a scratch directory, runs it and forwards the
    /// combined stdout/stderr to `on_line` until the child exits.
    ///
    /// The scratch directory is removed when this returns, on every path.
    /// No timeout is applied.
    pub async fn run<F>(
        &self,
        artifact: &CompiledArtifact,
        mut on_line: F,
    ) -> Result<LocalRunOutcome, RunnerError>
    where
        F: FnMut(&LineTap),
    {
        if artifact.kind != BuildMode::Local {
            tracing::warn!(
                target: "dagen.runner",
                stage = "prepare",
                kind = artifact.kind.as_str(),
                "running a non-local artifact"
            );
        }

        let scratch = tempfile::Builder::new()
            .prefix("dagen-run-")
            .tempdir()
            .map_err(RunnerError::Scratch)?;
        let script_path: PathBuf = scratch.path().join(artifact.file_name());
        tokio::fs::write(&script_path, &artifact.source)
            .await
            .map_err(RunnerError::Scratch)?;

        tracing::info!(
            target: "dagen.runner",
            stage = "spawn",
            interpreter = %self.interpreter,
            script = %script_path.display(),
            "starting local run"
        );

        let mut child = Command::new(&self.interpreter)
            .arg(&script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                cmd: self.interpreter.clone(),
                source,
            })?;

        let (line_tx, mut line_rx) = mpsc::channel::<LineTap>(self.line_channel_capacity);
        let mut pumps = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            pumps.push(pump_lines(out, LineStream::Stdout, line_tx.clone()));
        }
        if let Some(err) = child.stderr.take() {
            pumps.push(pump_lines(err, LineStream::Stderr, line_tx.clone()));
        }
        drop(line_tx);

        let mut lines = 0u64;
        while let Some(tap) = line_rx.recv().await {
            lines += 1;
            on_line(&tap);
        }

        for pump in pumps {
            pump.await.map_err(|e| RunnerError::StreamIo {
                stream: "pump",
                source: std::io::Error::other(e.to_string()),
            })??;
        }

        let status = child.wait().await.map_err(RunnerError::Wait)?;
        let exit_code = status.code().unwrap_or(-1);

        tracing::info!(
            target: "dagen.runner",
            stage = "exit",
            exit_code,
            lines,
            "local run finished"
        );

        drop(scratch);
        Ok(LocalRunOutcome { exit_code, lines })
    }
}
