//! Integration tests for the sampler loop.
//!
//! These run the full loop against a fake proc tree: a plain `smaps` text
//! file and a writable regular file standing in for `clear_refs`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tempfile::TempDir;
use wss::cli::Args;
use wss::{ConfigError, Mode, ProcTarget, RunConfig, Sampler, WssError};

const PID: u32 = 4242;

const SMAPS: &str = "\
55d0c8a00000-55d0c8a21000 rw-p 00000000 00:00 0                          [heap]
Size:                132 kB
Rss:                2048 kB
Pss:                1024 kB
Referenced:          512 kB
Swap:                  0 kB
7f2a1c000000-7f2a1c400000 rw-p 00000000 00:00 0
Size:               4096 kB
Rss:                1024 kB
Pss:                1024 kB
Referenced:          512 kB
";

fn fake_proc(smaps: Option<&str>, clear_refs: bool) -> TempDir {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join(PID.to_string());
    fs::create_dir(&dir).unwrap();
    if let Some(content) = smaps {
        fs::write(dir.join("smaps"), content).unwrap();
    }
    if clear_refs {
        fs::write(dir.join("clear_refs"), "").unwrap();
    }
    root
}

fn run_config(mode: Mode, duration: Duration, total: Option<Duration>) -> RunConfig {
    RunConfig {
        pid: PID,
        duration,
        total_duration: total,
        mode,
    }
}

fn run(root: &Path, cfg: RunConfig) -> (Result<wss::RunSummary, WssError>, Vec<String>) {
    let target = ProcTarget::new(root, cfg.pid, 4);
    let mut sampler = Sampler::new(cfg, target, Vec::new());
    let result = sampler.run();
    let out = String::from_utf8(sampler.into_output()).unwrap();
    (result, out.lines().map(str::to_string).collect())
}

#[test]
fn test_single_shot_prints_one_sample() {
    let root = fake_proc(Some(SMAPS), true);
    let cfg = run_config(Mode::Single, Duration::from_millis(1), None);

    let (result, lines) = run(root.path(), cfg);
    let summary = result.unwrap();

    assert_eq!(summary.samples, 1);
    assert_eq!(summary.resets, 1);
    assert_eq!(lines.len(), 3, "banner, header, one sample: {:?}", lines);
    assert!(lines[0].starts_with("Watching PID 4242"));
    assert_eq!(lines[1], "   RSS(MB)    PSS(MB)    Ref(MB)");
    assert_eq!(lines[2], "      3.00       2.00       1.00");

    let refs = fs::read_to_string(root.path().join("4242/clear_refs")).unwrap();
    assert_eq!(refs, "1");
}

#[test]
fn test_profile_doubles_and_stops() {
    let root = fake_proc(Some(SMAPS), true);
    let cfg = run_config(Mode::Profile { steps: 3 }, Duration::from_millis(10), None);

    let (result, lines) = run(root.path(), cfg);
    let summary = result.unwrap();

    assert_eq!(summary.samples, 3);
    assert_eq!(summary.resets, 1);
    assert_eq!(summary.elapsed, Duration::from_millis(70));
    assert!(lines[1].starts_with("Est(s)"));

    let durations: Vec<&str> = lines[2..]
        .iter()
        .map(|l| l.split_whitespace().next().unwrap())
        .collect();
    assert_eq!(durations, vec!["0.010", "0.020", "0.040"]);
}

#[test]
fn test_cumulative_resets_once_and_honors_cap() {
    let root = fake_proc(Some(SMAPS), true);
    let cfg = run_config(
        Mode::Cumulative,
        Duration::from_millis(1),
        Some(Duration::from_millis(5)),
    );

    let (result, lines) = run(root.path(), cfg);
    let summary = result.unwrap();

    assert_eq!(summary.samples, 5);
    assert_eq!(summary.resets, 1);
    assert_eq!(lines.len(), 7);
}

#[test]
fn test_snapshot_resets_every_window() {
    let root = fake_proc(Some(SMAPS), true);
    let cfg = run_config(
        Mode::Snapshot {
            pause: Duration::from_millis(1),
        },
        Duration::from_millis(1),
        Some(Duration::from_millis(6)),
    );

    let (result, _) = run(root.path(), cfg);
    let summary = result.unwrap();

    // Each iteration accounts for the window plus the pause.
    assert_eq!(summary.samples, 3);
    assert_eq!(summary.resets, 3);
    assert_eq!(summary.elapsed, Duration::from_millis(6));
}

#[test]
fn test_missing_clear_refs_aborts_before_sampling() {
    let root = fake_proc(Some(SMAPS), false);
    let cfg = run_config(Mode::Single, Duration::from_millis(1), None);

    let (result, lines) = run(root.path(), cfg);

    assert!(matches!(result, Err(WssError::ResetRefs { pid: PID, .. })));
    assert_eq!(lines.len(), 2, "no sample line after header: {:?}", lines);
}

#[test]
fn test_vanished_smaps_aborts_without_partial_line() {
    let root = fake_proc(None, true);
    let cfg = run_config(Mode::Cumulative, Duration::from_millis(1), None);

    let (result, lines) = run(root.path(), cfg);

    match result {
        Err(WssError::ReadSmaps { pid, path, .. }) => {
            assert_eq!(pid, PID);
            assert!(path.ends_with("4242/smaps"));
        }
        other => panic!("expected ReadSmaps error, got {:?}", other),
    }
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_malformed_smaps_aborts() {
    let root = fake_proc(Some("Rss: ??? kB\n"), true);
    let cfg = run_config(Mode::Single, Duration::from_millis(1), None);

    let (result, lines) = run(root.path(), cfg);

    assert!(matches!(result, Err(WssError::MalformedSmaps { .. })));
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_conflicting_modes_rejected_before_io() {
    let args = Args::try_parse_from(["wss", "-C", "-s", "1", "4242", "1"]).unwrap();
    assert!(matches!(
        RunConfig::from_args(&args),
        Err(ConfigError::ConflictingModes(_))
    ));
}

#[test]
fn test_live_smaps_referenced_within_rss() {
    let proc_self = Path::new("/proc/self/smaps");
    if !proc_self.exists() {
        return;
    }

    let pid = std::process::id();
    let target = ProcTarget::new(Path::new("/proc"), pid, 64);
    let totals = target.smaps.sample().unwrap();

    assert!(totals.rss_kb > 0);
    assert!(totals.is_consistent());
}
