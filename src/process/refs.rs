//! Reference flag reset through `/proc/<pid>/clear_refs`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::WssError;

/// Writing this to clear_refs clears the referenced bit on every page.
const CLEAR_ALL_REFS: &[u8] = b"1";

#[derive(Debug, Clone)]
pub struct RefsResetter {
    pid: u32,
    path: PathBuf,
}

impl RefsResetter {
    pub fn new(proc_dir: &Path, pid: u32) -> Self {
        Self {
            pid,
            path: proc_dir.join("clear_refs"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the handle fresh and writes the reset command.
    ///
    /// The kernel walks the page tables during this write, which can stall
    /// the target for a moment.
    pub fn reset(&self) -> Result<(), WssError> {
        let to_err = |source| WssError::ResetRefs {
            pid: self.pid,
            path: self.path.clone(),
            source,
        };

        let mut handle = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(to_err)?;
        handle.write_all(CLEAR_ALL_REFS).map_err(to_err)?;

        debug!(pid = self.pid, "Reset page reference flags");
        Ok(())
    }
}
