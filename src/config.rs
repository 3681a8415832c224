//! Configuration management for wss.
//!
//! Two layers live here. `Config` holds tool settings that may come from a
//! YAML, JSON or TOML file and be overridden on the command line. `RunConfig`
//! is the validated, immutable description of one measurement run, built
//! only from the command line.

use crate::cli::{Args, ConfigFormat, LogLevel};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Default configuration constants
pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_SMAPS_BUFFER_KB: usize = 512;
pub const MAX_SMAPS_BUFFER_KB: usize = 64 * 1024;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Shortest measurement window accepted, in seconds.
pub const MIN_DURATION_SECS: f64 = 0.001;

const DEFAULT_CONFIG_PATHS: [&str; 6] = [
    "/etc/wss/wss.yaml",
    "/etc/wss/wss.yml",
    "/etc/wss/wss.json",
    "./wss.yaml",
    "./wss.yml",
    "./wss.json",
];

/// Tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    /// Initial read buffer for /proc/<pid>/smaps
    #[serde(alias = "smaps-buffer-kb")]
    pub smaps_buffer_kb: Option<usize>,

    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    /// File the settings were read from, if any
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            smaps_buffer_kb: Some(DEFAULT_SMAPS_BUFFER_KB),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            loaded_from: None,
        }
    }
}

impl Config {
    pub fn proc_root(&self) -> &Path {
        self.proc_root
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_PROC_ROOT))
    }

    pub fn smaps_buffer_kb(&self) -> usize {
        self.smaps_buffer_kb.unwrap_or(DEFAULT_SMAPS_BUFFER_KB)
    }

    /// Effective log level, falling back to the default for unknown names.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(parse_log_level)
            .unwrap_or(LogLevel::Warn)
    }
}

fn parse_log_level(s: &str) -> Option<LogLevel> {
    match s.to_ascii_lowercase().as_str() {
        "off" => Some(LogLevel::Off),
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warn),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        if parse_log_level(level).is_none() {
            return Err(ConfigError::ConfigFile(format!(
                "invalid log_level '{}', expected off/error/warn/info/debug/trace",
                level
            )));
        }
    }

    if let Some(kb) = cfg.smaps_buffer_kb {
        if kb == 0 || kb > MAX_SMAPS_BUFFER_KB {
            return Err(ConfigError::ConfigFile(format!(
                "smaps_buffer_kb must be between 1 and {}, got {}",
                MAX_SMAPS_BUFFER_KB, kb
            )));
        }
    }

    if let Some(root) = cfg.proc_root.as_deref() {
        if root.as_os_str().is_empty() {
            return Err(ConfigError::ConfigFile("proc_root must not be empty".into()));
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, ConfigError> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(format!("{:?}", level).to_ascii_lowercase());
    }

    Ok(config)
}

/// Loads a config file, or the first default location that exists.
/// An explicitly named file must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::ConfigFile(format!(
                    "{} does not exist",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => match DEFAULT_CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| ConfigError::ConfigFile(format!("{}: {}", path.display(), e)))?;
    let mut config = parse_config(&content, &path)?;
    config.loaded_from = Some(path);
    Ok(config)
}

fn parse_config(content: &str, path: &Path) -> Result<Config, ConfigError> {
    let bad = |e: String| ConfigError::ConfigFile(format!("{}: {}", path.display(), e));

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content).map_err(|e| bad(e.to_string())),
        Some("toml") => toml::from_str(content).map_err(|e| bad(e.to_string())),
        // Default to YAML
        _ => serde_yaml::from_str(content).map_err(|e| bad(e.to_string())),
    }
}

/// Renders configuration in the requested format
pub fn render_config(config: &Config, format: ConfigFormat) -> Result<String, ConfigError> {
    let rendered = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::to_string(config).map_err(|e| e.to_string()),
    };
    rendered.map_err(ConfigError::ConfigFile)
}

/// Converts a non-negative number of seconds, rejecting values `Duration` can't hold.
fn seconds(name: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::DurationTooLong { name, secs })
}

/// Which reporting loop to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// One measurement, then exit.
    Single,
    /// Repeat every duration, all measured since one initial reset.
    Cumulative,
    /// Reset, measure, then pause; repeat.
    Snapshot { pause: Duration },
    /// Cumulative windows doubling from the base duration.
    Profile { steps: u32 },
}

impl Mode {
    pub fn is_profile(&self) -> bool {
        matches!(self, Mode::Profile { .. })
    }

    /// Snapshot mode resets before every window; all others reset once.
    pub fn resets_every_iteration(&self) -> bool {
        matches!(self, Mode::Snapshot { .. })
    }
}

/// Validated parameters of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub pid: u32,
    pub duration: Duration,
    /// Cap on total runtime, cumulative and snapshot modes only.
    pub total_duration: Option<Duration>,
    pub mode: Mode,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let (pid, duration) = match (args.pid, args.duration) {
            (Some(pid), Some(duration)) => (pid, duration),
            _ => return Err(ConfigError::MissingArguments),
        };

        let mut modes = Vec::new();
        if args.cumulative {
            modes.push("-C");
        }
        if args.snapshot.is_some() {
            modes.push("-s");
        }
        if args.profile.is_some() {
            modes.push("-P");
        }
        if modes.len() > 1 {
            return Err(ConfigError::ConflictingModes(modes));
        }

        if !(duration >= MIN_DURATION_SECS) {
            return Err(ConfigError::DurationTooShort {
                duration,
                minimum: MIN_DURATION_SECS,
            });
        }
        let duration = seconds("DURATION", duration)?;

        let mode = if args.cumulative {
            Mode::Cumulative
        } else if let Some(pause) = args.snapshot {
            if !(pause >= 0.0) {
                return Err(ConfigError::NegativeSnapshotInterval(pause));
            }
            Mode::Snapshot {
                pause: seconds("-s", pause)?,
            }
        } else if let Some(steps) = args.profile {
            if steps == 0 {
                return Err(ConfigError::ZeroProfileSteps);
            }
            Mode::Profile { steps }
        } else {
            Mode::Single
        };

        let total_duration = match args.total_duration {
            Some(secs) if secs > 0.0 => Some(seconds("-d", secs)?),
            Some(secs) => return Err(ConfigError::InvalidTotalDuration(secs)),
            None => None,
        };

        Ok(Self {
            pid,
            duration,
            total_duration,
            mode,
        })
    }
}
