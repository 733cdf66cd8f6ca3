pub mod deps;
mod load;
pub mod task;
mod types;
pub mod validate;

pub use deps::DependencyGraph;
pub use load::{load, load_with_graph, parse_spec, REQUIRED_FIELDS};
pub use task::{
    CopyTableParams, CreateTableParams, DdlDocument, QueryParams, TaskParams, VmLaunchParams,
};
pub use types::{resolve_against, Schedule, TaskKind, TaskSpec, WorkflowSpec, DEFAULT_ENVIRONMENT};
