//! Configuration loading for ferryman.
//!
//! Everything here is read once at startup. The puzzle itself has no
//! tunables; configuration only shapes the outer surfaces: what the stdio
//! server calls itself, how chatty logging is, and how many moves the
//! `play` command will apply.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ferryconf::FerryConfig;
//!
//! let (config, sources) = FerryConfig::load_with_sources_from(None).expect("Failed to load config");
//! println!("files read: {:?}", sources.files);
//! println!("server name: {}", config.server.name);
//! println!("log level: {}", config.telemetry.log_level);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/ferryman/config.toml` (system)
//! 2. `~/.config/ferryman/config.toml` (user)
//! 3. `./ferryman.toml` (local override, replaced by `--config` when given)
//! 4. Environment variables (`FERRYMAN_*`, `RUST_LOG`, `NO_COLOR`)
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! name = "ferryman"
//! instructions = "Solve the river crossing using the tools."
//!
//! [telemetry]
//! log_level = "debug"
//! ansi = false
//!
//! [play]
//! max_steps = 15
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use settings::{PlayConfig, ServerConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete ferryman configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FerryConfig {
    /// Identity and instructions announced by the stdio server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log filtering and formatting.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Limits for the `play` command.
    #[serde(default)]
    pub play: PlayConfig,
}

impl FerryConfig {
    /// Load configuration from all sources and report where values came from.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/ferryman/config.toml`
    /// 3. `~/.config/ferryman/config.toml`
    /// 4. `./ferryman.toml`, or `config_path` when given
    /// 5. Environment variables
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = FerryConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::apply_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# ferryman configuration\n\n");

        output.push_str("[server]\n");
        output.push_str(&format!("name = {}\n", quote(&self.server.name)));
        output.push_str(&format!(
            "instructions = {}\n",
            quote(&self.server.instructions)
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "log_level = {}\n",
            quote(&self.telemetry.log_level)
        ));
        output.push_str(&format!("ansi = {}\n", self.telemetry.ansi));

        output.push_str("\n[play]\n");
        output.push_str(&format!("max_steps = {}\n", self.play.max_steps));

        output
    }
}

// toml's Display for a string value gives a correctly escaped basic string
fn quote(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FerryConfig::default();
        assert_eq!(config.server.name, "ferryman");
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.play.max_steps, 15);
    }

    #[test]
    fn test_to_toml_sections() {
        let toml = FerryConfig::default().to_toml();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[telemetry]"));
        assert!(toml.contains("[play]"));
        assert!(toml.contains("max_steps = 15"));
    }

    #[test]
    fn test_to_toml_parses_back() {
        let mut config = FerryConfig::default();
        config.server.instructions = "Use \"move_across_river\".\nThen check.".to_string();
        config.telemetry.ansi = false;

        let rendered = config.to_toml();
        let reparsed = loader::parse_toml(&rendered, Path::new("rendered.toml")).unwrap();
        assert_eq!(reparsed, config);
    }
}
