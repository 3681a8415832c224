//! Access to a target process through /proc.
//!
//! This module provides:
//! - `memory`: Reading and summing /proc/<pid>/smaps
//! - `refs`: Resetting page reference flags via /proc/<pid>/clear_refs

pub mod memory;
pub mod refs;

use std::path::{Path, PathBuf};

pub use memory::{parse_smaps_totals, MemoryTotals, SmapsReader, KIB_PER_MIB};
pub use refs::RefsResetter;

/// The two /proc surfaces the sampler uses for one process.
#[derive(Debug, Clone)]
pub struct ProcTarget {
    pub pid: u32,
    pub proc_dir: PathBuf,
    pub refs: RefsResetter,
    pub smaps: SmapsReader,
}

impl ProcTarget {
    pub fn new(proc_root: &Path, pid: u32, smaps_buffer_kb: usize) -> Self {
        let proc_dir = proc_root.join(pid.to_string());
        Self {
            pid,
            refs: RefsResetter::new(&proc_dir, pid),
            smaps: SmapsReader::new(&proc_dir, pid, smaps_buffer_kb),
            proc_dir,
        }
    }
}
