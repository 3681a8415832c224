//! Memory map snapshot reading and parsing.
//!
//! `/proc/<pid>/smaps` is read in one pass into memory and then summed. Values
//! in smaps are in kibibytes; totals are kept in KiB and only converted to MiB
//! when displayed.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::WssError;

/// smaps reports sizes in KiB; output columns are MiB.
pub const KIB_PER_MIB: f64 = 1024.0;

/// The smaps fields that make up a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmapsField {
    Rss,
    Pss,
    Referenced,
}

/// Recognized line labels, checked in order against each line.
pub const FIELD_TABLE: [(&str, SmapsField); 3] = [
    ("Rss:", SmapsField::Rss),
    ("Pss:", SmapsField::Pss),
    ("Referenced:", SmapsField::Referenced),
];

/// Sum of each recognized field across all mappings, in KiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryTotals {
    pub rss_kb: u64,
    pub pss_kb: u64,
    pub referenced_kb: u64,
}

impl MemoryTotals {
    fn add(&mut self, field: SmapsField, kb: u64) {
        let slot = match field {
            SmapsField::Rss => &mut self.rss_kb,
            SmapsField::Pss => &mut self.pss_kb,
            SmapsField::Referenced => &mut self.referenced_kb,
        };
        *slot = slot.saturating_add(kb);
    }

    pub fn rss_mb(&self) -> f64 {
        self.rss_kb as f64 / KIB_PER_MIB
    }

    pub fn pss_mb(&self) -> f64 {
        self.pss_kb as f64 / KIB_PER_MIB
    }

    pub fn referenced_mb(&self) -> f64 {
        self.referenced_kb as f64 / KIB_PER_MIB
    }

    /// Referenced pages are a subset of resident pages.
    pub fn is_consistent(&self) -> bool {
        self.referenced_kb <= self.rss_kb
    }
}

/// Parses kilobyte values from smaps file lines.
pub fn parse_kb_value(v: &str) -> Option<u64> {
    v.split_whitespace().next()?.parse().ok()
}

/// Looks up the field a line reports, returning the remainder after the label.
fn match_field(line: &str) -> Option<(SmapsField, &str)> {
    FIELD_TABLE
        .iter()
        .find_map(|(label, field)| line.strip_prefix(label).map(|rest| (*field, rest)))
}

/// Sums the recognized fields of a full smaps report.
///
/// Lines that don't start with a recognized label are skipped. A recognized
/// label without a kibibyte integer fails the whole parse.
pub fn parse_smaps_totals(content: &str, path: &Path) -> Result<MemoryTotals, WssError> {
    let mut totals = MemoryTotals::default();

    for line in content.lines() {
        let Some((field, rest)) = match_field(line) else {
            continue;
        };
        let kb = parse_kb_value(rest).ok_or_else(|| WssError::MalformedSmaps {
            path: path.to_path_buf(),
            line: line.to_string(),
        })?;
        totals.add(field, kb);
    }

    Ok(totals)
}

/// Handle on a process's `smaps` report. Reopened on every read.
#[derive(Debug, Clone)]
pub struct SmapsReader {
    pid: u32,
    path: PathBuf,
    buf_bytes: usize,
}

impl SmapsReader {
    pub fn new(proc_dir: &Path, pid: u32, buf_kb: usize) -> Self {
        Self {
            pid,
            path: proc_dir.join("smaps"),
            buf_bytes: buf_kb.saturating_mul(1024),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole report before parsing, so the kernel walk finishes as
    /// soon after the measurement window as possible.
    pub fn read(&self) -> Result<String, WssError> {
        let to_err = |source| WssError::ReadSmaps {
            pid: self.pid,
            path: self.path.clone(),
            source,
        };

        let mut file = File::open(&self.path).map_err(to_err)?;
        let mut content = String::with_capacity(self.buf_bytes);
        file.read_to_string(&mut content).map_err(to_err)?;

        debug!(pid = self.pid, bytes = content.len(), "Read smaps snapshot");
        Ok(content)
    }

    pub fn sample(&self) -> Result<MemoryTotals, WssError> {
        let content = self.read()?;
        parse_smaps_totals(&content, &self.path)
    }
}
