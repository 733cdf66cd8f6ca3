mod load;
mod types;

pub use load::{apply_env_overrides, get_dagen_data_dir, load_default, load_from};
pub use types::{ApiConfig, AppConfig, LoggingConfig, RunnerConfig};
