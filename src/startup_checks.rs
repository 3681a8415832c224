//! Pre-flight checks of the target process.
//!
//! Runs after the run configuration is validated and before the first reset.
//! Only a missing process is fatal; the rest are warnings, since the first
//! reset reports the precise OS error anyway.

use nix::unistd::geteuid;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::WssError;

/// Validate that the target can plausibly be measured
pub fn validate_target(proc_root: &Path, pid: u32) -> Result<(), WssError> {
    let proc_dir = proc_root.join(pid.to_string());
    if !proc_dir.is_dir() {
        return Err(WssError::TargetMissing {
            pid,
            path: proc_dir,
        });
    }

    check_user_privileges();
    check_clear_refs(&proc_dir);

    if let Ok(version) = fs::read_to_string(proc_root.join("version")) {
        debug!("Kernel version: {}", version.lines().next().unwrap_or("unknown"));
    }

    Ok(())
}

/// Check if running with sufficient privileges
fn check_user_privileges() {
    if geteuid().is_root() {
        debug!("Running as root (uid=0)");
    } else {
        warn!("Not running as root - clear_refs is only writable for your own processes");
    }
}

fn check_clear_refs(proc_dir: &Path) {
    let clear_refs = proc_dir.join("clear_refs");
    match fs::metadata(&clear_refs) {
        Ok(_) => info!("{} available", clear_refs.display()),
        Err(e) => {
            warn!("Cannot stat {}: {}", clear_refs.display(), e);
            warn!("   clear_refs needs Linux 2.6.22 or later");
        }
    }
}
