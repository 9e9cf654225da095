//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then
//! `config/default.toml`, then an optional `--config` file, then `GHC_*`
//! environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::health::{CheckSettings, GlThreshold};

/// External command settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Wall-clock timeout for every external command, in seconds
    pub timeout_secs: u64,
}

/// Native helper settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeConfig {
    /// Helper library path; relative paths are resolved next to the executable
    pub library_path: PathBuf,
    /// Probe surface width in pixels
    pub context_width: i32,
    /// Probe surface height in pixels
    pub context_height: i32,
}

/// Minimum supported OpenGL version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    pub min_gl_major: u32,
    pub min_gl_minor: u32,
}

/// Report layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Working directory created under `--temp-dir`
    pub dir_name: String,
    /// Archive written into `--report-dir`
    pub archive_name: String,
    /// Session log name inside the archive
    pub log_name: String,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub commands: CommandsConfig,
    pub native: NativeConfig,
    pub thresholds: ThresholdsConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    /// Loads configuration, optionally layering an extra file on top
    ///
    /// Sources, lowest priority first:
    /// 1. Built-in defaults
    /// 2. config/default.toml (next to the executable, or in the current directory)
    /// 3. `extra` file, if given (must exist)
    /// 4. Environment variables with prefix GHC_ (e.g., GHC_COMMANDS__TIMEOUT_SECS=10)
    pub fn load(extra: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(extra, Self::environment())
    }

    fn load_with(extra: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(dir) = Self::find_config_dir() {
            builder = builder.add_source(File::from(dir.join("default.toml")).required(false));
        }

        if let Some(path) = extra {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.add_source(env).build()?.try_deserialize()
    }

    /// `GHC_<SECTION>__<KEY>` variables
    fn environment() -> Environment {
        Environment::with_prefix("GHC")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<PathBuf> {
        // Try to find config dir relative to executable
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        // Fall back to current directory
        let cwd_config = PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Timeout for external commands
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.commands.timeout_secs)
    }

    /// Settings consumed by the check engine
    pub fn check_settings(&self) -> CheckSettings {
        CheckSettings {
            min_gl: GlThreshold {
                major: self.thresholds.min_gl_major,
                minor: self.thresholds.min_gl_minor,
            },
            context_size: (self.native.context_width, self.native.context_height),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            commands: CommandsConfig { timeout_secs: 5 },
            native: NativeConfig {
                library_path: PathBuf::from("bin/libGfxHealthCheck.so"),
                context_width: 1,
                context_height: 1,
            },
            thresholds: ThresholdsConfig {
                min_gl_major: 4,
                min_gl_minor: 3,
            },
            report: ReportConfig {
                dir_name: "gfx-health-report".to_string(),
                archive_name: "gfx_health_report.zip".to_string(),
                log_name: "gfx_health.log".to_string(),
            },
        }
    }
}
