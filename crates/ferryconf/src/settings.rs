//! Configuration sections.

use serde::{Deserialize, Serialize};

/// How the stdio server introduces itself during `initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported as `serverInfo.name`.
    /// Default: ferryman
    #[serde(default = "ServerConfig::default_name")]
    pub name: String,

    /// Instructions handed to the client along with the capabilities.
    #[serde(default = "ServerConfig::default_instructions")]
    pub instructions: String,
}

impl ServerConfig {
    fn default_name() -> String {
        "ferryman".to_string()
    }

    fn default_instructions() -> String {
        concat!(
            "You are solving the wolf, goat and cabbage river crossing. ",
            "Move everything to the right bank. The ferryman can carry at most one ",
            "passenger and may also cross alone (passenger 'nothing'). ",
            "Never leave the wolf with the goat, or the goat with the cabbage, ",
            "on the bank without the boat. Call get_current_state when unsure, ",
            "read the reason of any failed move before trying again, and call ",
            "check_if_solved when you think you are done."
        )
        .to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            instructions: Self::default_instructions(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// EnvFilter directive (trace, debug, info, warn, error, or per-target).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,

    /// Colour log lines on stderr.
    /// Default: true
    #[serde(default = "TelemetryConfig::default_ansi")]
    pub ansi: bool,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_ansi() -> bool {
        true
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            ansi: Self::default_ansi(),
        }
    }
}

/// Limits for scripted play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayConfig {
    /// Maximum number of moves applied by one `play` invocation.
    /// Default: 15
    #[serde(default = "PlayConfig::default_max_steps")]
    pub max_steps: u32,
}

impl PlayConfig {
    fn default_max_steps() -> u32 {
        15
    }
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            max_steps: Self::default_max_steps(),
        }
    }
}
