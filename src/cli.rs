//! CLI arguments for wss.
//!
//! This module defines the command-line interface using the clap library.
//! Positional arguments are optional at the clap level so that a bare `wss`
//! prints the usage text and exits cleanly instead of erroring.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

pub const USAGE_EXAMPLES: &str = "\
   eg,
       wss 181 0.01           # measure PID 181 WSS for 10 milliseconds
       wss 181 5              # measure PID 181 WSS for 5 seconds (same overhead)
       wss -C 181 5           # show PID 181 growth every 5 seconds
       wss -Cd 10 181 5       # PID 181 growth each 5 secs, for 10 secs total
       wss -s 1 181 0.01      # show a 10 ms WSS snapshot every 1 second
       wss -s 0 181 1         # measure WSS every 1 second (not cumulative)
       wss -P 10 181 0.01     # 10 step power-of-two profile, starting with 0.01s";

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "wss",
    about = "Estimate the working set size of a process",
    long_about = "Estimate the working set size of a process.\n\n\
                  Resets the referenced flag on every page of PID via /proc/PID/clear_refs, \
                  waits DURATION seconds, then sums Rss, Pss and Referenced from \
                  /proc/PID/smaps. Writing clear_refs and reading smaps make the kernel walk \
                  the page tables, which can add latency to the target process.",
    version,
    override_usage = "wss [OPTIONS] PID DURATION",
    after_help = USAGE_EXAMPLES
)]
pub struct Args {
    /// Process ID to measure
    #[arg(value_name = "PID")]
    pub pid: Option<u32>,

    /// Measurement window in seconds (minimum 0.001)
    #[arg(value_name = "DURATION", allow_negative_numbers = true)]
    pub duration: Option<f64>,

    /// Show cumulative output every DURATION seconds
    #[arg(short = 'C', long)]
    pub cumulative: bool,

    /// Take a snapshot every SECS seconds
    #[arg(short = 's', long, value_name = "SECS", allow_negative_numbers = true)]
    pub snapshot: Option<f64>,

    /// Total duration of measurement (for -s or -C)
    #[arg(short = 'd', long = "duration", value_name = "SECS", allow_negative_numbers = true)]
    pub total_duration: Option<f64>,

    /// Profile run (cumulative), number of power-of-two steps to take
    #[arg(short = 'P', long, value_name = "STEPS")]
    pub profile: Option<u32>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Root of the proc filesystem
    #[arg(long, value_name = "DIR")]
    pub proc_root: Option<PathBuf>,
}

impl Args {
    /// True when the positional arguments needed for a run are missing.
    pub fn wants_usage(&self) -> bool {
        self.pid.is_none() || self.duration.is_none()
    }
}
