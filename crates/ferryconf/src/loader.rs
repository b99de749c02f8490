//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, FerryConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local). Only returns files
/// that exist. If `cli_path` is provided and exists, it replaces the local
/// override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/ferryman/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("ferryman/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("ferryman.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Overlay the keys present in `path` onto `config`.
pub fn apply_file(config: &mut FerryConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

/// Parse config from a TOML string on top of compiled defaults.
pub fn parse_toml(contents: &str, path: &Path) -> Result<FerryConfig, ConfigError> {
    let mut config = FerryConfig::default();
    apply_toml(&mut config, contents, path)?;
    Ok(config)
}

/// Overlay only the keys that appear in `contents`, so a later file can
/// change one value without resetting what earlier files set.
fn apply_toml(config: &mut FerryConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let bad_type = |key: &str, expected: &str| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("{} must be {}", key, expected),
    };

    if let Some(server) = table.get("server").and_then(|v| v.as_table()) {
        if let Some(v) = server.get("name") {
            config.server.name = v
                .as_str()
                .ok_or_else(|| bad_type("server.name", "a string"))?
                .to_string();
        }
        if let Some(v) = server.get("instructions") {
            config.server.instructions = v
                .as_str()
                .ok_or_else(|| bad_type("server.instructions", "a string"))?
                .to_string();
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level") {
            config.telemetry.log_level = v
                .as_str()
                .ok_or_else(|| bad_type("telemetry.log_level", "a string"))?
                .to_string();
        }
        if let Some(v) = telemetry.get("ansi") {
            config.telemetry.ansi = v
                .as_bool()
                .ok_or_else(|| bad_type("telemetry.ansi", "a boolean"))?;
        }
    }

    if let Some(play) = table.get("play").and_then(|v| v.as_table()) {
        if let Some(v) = play.get("max_steps") {
            config.play.max_steps = v
                .as_integer()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| bad_type("play.max_steps", "a non-negative integer"))?;
        }
    }

    Ok(())
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut FerryConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from any variable lookup.
///
/// `apply_env_overrides` passes the process environment; tests pass a map.
pub fn apply_overrides_from<F>(config: &mut FerryConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("FERRYMAN_SERVER_NAME") {
        config.server.name = v;
        sources.env_overrides.push("FERRYMAN_SERVER_NAME".to_string());
    }
    if let Some(v) = lookup("FERRYMAN_INSTRUCTIONS") {
        config.server.instructions = v;
        sources.env_overrides.push("FERRYMAN_INSTRUCTIONS".to_string());
    }

    if let Some(v) = lookup("FERRYMAN_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("FERRYMAN_LOG_LEVEL".to_string());
    }
    // RUST_LOG wins over FERRYMAN_LOG_LEVEL
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
    // https://no-color.org: any value disables colour
    if lookup("NO_COLOR").is_some() {
        config.telemetry.ansi = false;
        sources.env_overrides.push("NO_COLOR".to_string());
    }

    if let Some(v) = lookup("FERRYMAN_MAX_STEPS") {
        if let Ok(steps) = v.parse() {
            config.play.max_steps = steps;
            sources.env_overrides.push("FERRYMAN_MAX_STEPS".to_string());
        }
    }
}
