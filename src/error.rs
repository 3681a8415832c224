//! Error taxonomy for wss.
//!
//! Configuration errors are raised before any measurement I/O. Every other
//! error means the target became unavailable mid-run and aborts the run.

use std::io;
use std::path::PathBuf;

/// Invalid command line or configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PID and duration are required")]
    MissingArguments,

    #[error("duration {duration} is too short. Minimum is {minimum} seconds")]
    DurationTooShort { duration: f64, minimum: f64 },

    #[error("only one of {} may be specified", .0.join(", "))]
    ConflictingModes(Vec<&'static str>),

    #[error("{name} value {secs} is out of range")]
    DurationTooLong { name: &'static str, secs: f64 },

    #[error("snapshot interval must not be negative, got {0}")]
    NegativeSnapshotInterval(f64),

    #[error("total duration must be a positive number of seconds, got {0}")]
    InvalidTotalDuration(f64),

    #[error("profile mode needs at least one step")]
    ZeroProfileSteps,

    #[error("config file: {0}")]
    ConfigFile(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WssError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("process {pid} not found ({})", path.display())]
    TargetMissing { pid: u32, path: PathBuf },

    #[error(
        "can't write to {} for PID {pid}: {source} \
         (process exited, insufficient privilege, or kernel older than 2.6.22?)",
        path.display()
    )]
    ResetRefs {
        pid: u32,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't read {} for PID {pid}: {source} (process exited?)", path.display())]
    ReadSmaps {
        pid: u32,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed line in {}: {line:?}", path.display())]
    MalformedSmaps { path: PathBuf, line: String },

    #[error("writing output: {0}")]
    Output(#[from] io::Error),
}
