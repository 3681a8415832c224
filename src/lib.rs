//! wss: working set size estimation for Linux processes
//!
//! The measurement clears the referenced flag on every page of a process by
//! writing to `/proc/<pid>/clear_refs`, waits for a time window, then sums the
//! `Rss`, `Pss` and `Referenced` fields of `/proc/<pid>/smaps`. `Referenced`
//! is the working set touched during the window.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use wss::{Mode, ProcTarget, RunConfig, Sampler};
//!
//! let cfg = RunConfig {
//!     pid: 181,
//!     duration: Duration::from_millis(10),
//!     total_duration: None,
//!     mode: Mode::Single,
//! };
//! let target = ProcTarget::new(Path::new("/proc"), cfg.pid, 512);
//! let summary = Sampler::new(cfg, target, std::io::stdout()).run()?;
//! assert_eq!(summary.samples, 1);
//! # Ok::<(), wss::WssError>(())
//! ```
//!
//! Both /proc operations make the kernel walk the target's page tables and can
//! add latency to it.

pub mod cli;
pub mod config;
pub mod error;
pub mod process;
pub mod report;
pub mod sampler;
pub mod startup_checks;

// Re-export main types for convenience
pub use config::{Config, Mode, RunConfig};
pub use error::{ConfigError, WssError};
pub use process::{MemoryTotals, ProcTarget};
pub use sampler::{RunSummary, Sampler};
