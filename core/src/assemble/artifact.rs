use std::fmt;

use crate::spec::WorkflowSpec;

/// Which of the two script flavours is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    /// Self-contained script running a chosen run-list on this machine.
    Local,
    /// Full orchestration script with telemetry and dependency wiring.
    Deployable,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Deployable => "deployable",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one assembly.
///
/// `spec` is the spec as seen after compilation, including DDL fields
/// merged into table-create tasks.
#[derive(Debug, Clone)]
pub struct CompiledArtifact {
    pub kind: BuildMode,
    pub deployment_name: String,
    pub source: String,
    pub spec: WorkflowSpec,
}

impl CompiledArtifact {
    pub fn file_name(&self) -> String {
        format!("{}.py", self.deployment_name)
    }
}
