use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default dagen data directory: ~/.dagen
pub fn get_dagen_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".dagen"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    let data_dir = get_dagen_data_dir()?;
    let mut cfg = load_from(&data_dir, Path::new("."))?;
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    Ok(cfg)
}

/// `<data_dir>/config.toml` wins over `<cwd>/config.toml`; neither present
/// yields defaults.
pub fn load_from(data_dir: &Path, cwd: &Path) -> anyhow::Result<AppConfig> {
    let user_config = data_dir.join("config.toml");
    let local_config = cwd.join("config.toml");

    let mut cfg = if user_config.exists() {
        read_config(&user_config)?
    } else if local_config.exists() {
        read_config(&local_config)?
    } else {
        AppConfig::default()
    };

    if cfg
        .logging
        .directory
        .as_ref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    Ok(cfg)
}

fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))
}

/// Environment variables take priority over any file.
pub fn apply_env_overrides(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("DAGEN_API_ENDPOINT") {
        cfg.api.endpoint = v;
    }
    if let Some(v) = non_empty("DAGEN_API_TOKEN") {
        cfg.api.token = v;
    }
    if let Some(v) = non_empty("DAGEN_PYTHON") {
        cfg.runner.interpreter = v;
    }
}
