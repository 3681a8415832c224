//! The measurement loop.
//!
//! Each iteration optionally resets the target's reference flags, sleeps for
//! the window, reads smaps and prints one line. The loop is strictly
//! sequential; the only state carried between iterations is `LoopState`.

use std::io::Write;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{Mode, RunConfig};
use crate::error::WssError;
use crate::process::ProcTarget;
use crate::report;

/// What the loop does after an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Counters carried from one iteration to the next.
#[derive(Debug)]
pub struct LoopState {
    pub elapsed: Duration,
    pub needs_first_reset: bool,
    /// Remaining profile windows; empty outside profile mode.
    pub steps: ProfileSteps,
    pub samples: usize,
    pub resets: usize,
}

impl LoopState {
    pub fn new(cfg: &RunConfig) -> Self {
        let steps = match cfg.mode {
            Mode::Profile { steps } => ProfileSteps::new(cfg.duration, steps),
            _ => ProfileSteps::new(cfg.duration, 0),
        };
        Self {
            elapsed: Duration::ZERO,
            needs_first_reset: true,
            steps,
            samples: 0,
            resets: 0,
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub samples: usize,
    pub resets: usize,
    pub elapsed: Duration,
}

/// Window lengths for profile mode: `base`, then doubling each step.
///
/// Computed as they are taken; doubling saturates at `Duration::MAX`.
#[derive(Debug, Clone)]
pub struct ProfileSteps {
    next: Duration,
    remaining: u32,
}

impl ProfileSteps {
    pub fn new(base: Duration, steps: u32) -> Self {
        Self {
            next: base,
            remaining: steps,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Iterator for ProfileSteps {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let step = self.next;
        self.next = step.saturating_mul(2);
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

/// Decides whether another iteration follows a completed one.
///
/// Profile mode always continues here; it ends when its steps run out.
pub fn next_flow(mode: &Mode, elapsed: Duration, total: Option<Duration>) -> Flow {
    match mode {
        Mode::Profile { .. } => Flow::Continue,
        Mode::Single => Flow::Stop,
        Mode::Cumulative | Mode::Snapshot { .. } => match total {
            Some(cap) if elapsed >= cap => Flow::Stop,
            _ => Flow::Continue,
        },
    }
}

pub struct Sampler<W: Write> {
    cfg: RunConfig,
    target: ProcTarget,
    out: W,
}

impl<W: Write> Sampler<W> {
    pub fn new(cfg: RunConfig, target: ProcTarget, out: W) -> Self {
        Self { cfg, target, out }
    }

    /// Prints the banner and header, then iterates until the mode says stop.
    pub fn run(&mut self) -> Result<RunSummary, WssError> {
        writeln!(self.out, "{}", report::banner(&self.cfg))?;
        writeln!(self.out, "{}", report::column_header(&self.cfg.mode))?;
        self.out.flush()?;

        info!(pid = self.cfg.pid, mode = ?self.cfg.mode, "Starting measurement");

        let mut state = LoopState::new(&self.cfg);
        while self.iterate(&mut state)? == Flow::Continue {}

        let summary = RunSummary {
            samples: state.samples,
            resets: state.resets,
            elapsed: state.elapsed,
        };
        info!(
            samples = summary.samples,
            resets = summary.resets,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "Measurement finished"
        );
        Ok(summary)
    }

    /// Runs one measurement window.
    pub fn iterate(&mut self, state: &mut LoopState) -> Result<Flow, WssError> {
        let window = if self.cfg.mode.is_profile() {
            match state.steps.next() {
                Some(step) => step,
                None => return Ok(Flow::Stop),
            }
        } else {
            self.cfg.duration
        };

        if state.needs_first_reset || self.cfg.mode.resets_every_iteration() {
            self.target.refs.reset()?;
            state.needs_first_reset = false;
            state.resets += 1;
        }

        thread::sleep(window);
        state.elapsed = state.elapsed.saturating_add(window);

        let totals = self.target.smaps.sample()?;
        if !totals.is_consistent() {
            warn!(
                pid = self.cfg.pid,
                rss_kb = totals.rss_kb,
                referenced_kb = totals.referenced_kb,
                "Referenced exceeds RSS, snapshot may be inconsistent"
            );
        }

        let step = self.cfg.mode.is_profile().then_some(window);
        writeln!(self.out, "{}", report::sample_line(&totals, step))?;
        self.out.flush()?;
        state.samples += 1;

        if let Mode::Snapshot { pause } = self.cfg.mode {
            debug!(pause_secs = pause.as_secs_f64(), "Pausing before next snapshot");
            thread::sleep(pause);
            state.elapsed = state.elapsed.saturating_add(pause);
        }

        Ok(next_flow(
            &self.cfg.mode,
            state.elapsed,
            self.cfg.total_duration,
        ))
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
