//! Output formatting for the measurement table.
//!
//! Numeric columns are MiB, right-aligned in width 10 with 2 decimals. Profile
//! mode adds a leading duration column, left-aligned in width 8 with 3
//! decimals.

use std::time::Duration;

use crate::config::{Mode, RunConfig};
use crate::process::MemoryTotals;

/// Describes what is being measured.
pub fn banner(cfg: &RunConfig) -> String {
    let secs = cfg.duration.as_secs_f64();
    let mut line = match cfg.mode {
        Mode::Single => format!(
            "Watching PID {} page references during {} seconds...",
            cfg.pid, secs
        ),
        Mode::Cumulative => format!(
            "Watching PID {} page references grow, output every {} seconds...",
            cfg.pid, secs
        ),
        Mode::Snapshot { pause } => format!(
            "Watching PID {} page references for {} seconds, repeating after {} seconds...",
            cfg.pid,
            secs,
            pause.as_secs_f64()
        ),
        Mode::Profile { steps } => format!(
            "Watching PID {} page references grow, profile beginning with {} seconds, {} steps...",
            cfg.pid, secs, steps
        ),
    };

    if let (Some(total), Mode::Cumulative | Mode::Snapshot { .. }) = (cfg.total_duration, cfg.mode)
    {
        line.push_str(&format!(" (for {} seconds total)", total.as_secs_f64()));
    }
    line
}

pub fn column_header(mode: &Mode) -> String {
    let columns = format!("{:>10} {:>10} {:>10}", "RSS(MB)", "PSS(MB)", "Ref(MB)");
    if mode.is_profile() {
        format!("{:<8} {}", "Est(s)", columns)
    } else {
        columns
    }
}

/// One output row. `step` is the window length, shown in profile mode only.
pub fn sample_line(totals: &MemoryTotals, step: Option<Duration>) -> String {
    let columns = format!(
        "{:>10.2} {:>10.2} {:>10.2}",
        totals.rss_mb(),
        totals.pss_mb(),
        totals.referenced_mb()
    );
    match step {
        Some(d) => format!("{:<8.3} {}", d.as_secs_f64(), columns),
        None => columns,
    }
}
