//! Indexer tests against a scratch task directory: script writing, reporting, rank gating.

use anyhow::Result;
use btx::{Indexer, IndexerEnv, IndexingParams, RunIdentity};
use std::fs;
use std::path::{Path, PathBuf};

const PEAKFINDING_SUMMARY: &str = "Number of events processed: 1200\n\
Number of hits found: 100\n\
Fractional hit rate: 0.08\n\
Number of events with > 1 crystal: 0\n";

fn identity(taskdir: &Path, tag_cxi: Option<&str>) -> RunIdentity {
    RunIdentity {
        exp: "mfxp22820".to_string(),
        run: 7,
        det_type: "epix10k2M".to_string(),
        tag: "foo".to_string(),
        tag_cxi: tag_cxi.map(str::to_string),
        taskdir: taskdir.to_path_buf(),
    }
}

fn env(rank: u32) -> IndexerEnv {
    IndexerEnv {
        nproc: 4,
        rank,
        tmp_exe: None,
        launcher: "/opt/btx".to_string(),
    }
}

fn params() -> IndexingParams {
    IndexingParams {
        geom: Some(PathBuf::from("/g/r0001.geom")),
        ..IndexingParams::default()
    }
}

fn write_stream(taskdir: &Path, n_indexed: usize) -> Result<()> {
    let mut s = String::new();
    for i in 0..n_indexed {
        s.push_str(&format!("----- Begin chunk -----\nEvent: //{i}\n"));
        s.push_str("Cell parameters 7.91 7.91 3.80 nm, 90.00 90.00 90.00 deg\n");
    }
    s.push_str("----- Begin chunk -----\nEvent: //unindexed\n");
    fs::write(taskdir.join("r0007_foo.stream"), s)?;
    Ok(())
}

fn write_peakfinding(taskdir: &Path, name: &str, text: &str) -> Result<()> {
    let run_dir = taskdir.join("r0007");
    fs::create_dir_all(&run_dir)?;
    fs::write(run_dir.join(name), text)?;
    Ok(())
}

// --- write_exe ---

#[test]
fn test_write_exe_creates_script() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let indexer = Indexer::new(identity(dir.path(), None), params(), env(0));
    let path = indexer.write_exe()?.expect("rank 0 writes");
    assert_eq!(path, dir.path().join("r0007/index_r0007.sh"));
    assert_eq!(path, indexer.paths().tmp_exe);

    let text = fs::read_to_string(&path)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "#!/bin/bash");
    assert!(lines[1].starts_with("indexamajig -i "));
    assert!(lines[1].contains(" -j 4 -g /g/r0001.geom "));
    assert!(lines[2].starts_with("/opt/btx index -e mfxp22820 -r 7 -d epix10k2M"));
    assert!(lines[2].contains("--report --tag foo"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&path)?.permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
    Ok(())
}

#[test]
fn test_write_exe_honors_override() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("scratch/custom.sh");
    let e = IndexerEnv {
        tmp_exe: Some(target.clone()),
        ..env(0)
    };
    let indexer = Indexer::new(identity(dir.path(), None), params(), e);
    assert_eq!(indexer.write_exe()?, Some(target.clone()));
    assert!(target.is_file());
    Ok(())
}

#[test]
fn test_write_exe_requires_geom() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let indexer = Indexer::new(
        identity(dir.path(), None),
        IndexingParams::default(),
        env(0),
    );
    assert!(indexer.write_exe().is_err());
    assert!(!dir.path().join("r0007/index_r0007.sh").exists());
    Ok(())
}

#[test]
fn test_write_exe_skipped_on_nonzero_rank() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let indexer = Indexer::new(identity(dir.path(), None), params(), env(3));
    assert!(!indexer.is_writer());
    assert_eq!(indexer.write_exe()?, None);
    assert!(!dir.path().join("r0007").exists());
    Ok(())
}

// --- report ---

#[test]
fn test_report_writes_summary() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_stream(dir.path(), 50)?;
    write_peakfinding(dir.path(), "peakfinding.summary", PEAKFINDING_SUMMARY)?;

    let indexer = Indexer::new(identity(dir.path(), None), params(), env(0));
    let summary = indexer.report(None)?.expect("rank 0 reports");
    assert_eq!(summary.n_indexed, 50);
    assert_eq!(summary.n_total, 100);
    assert_eq!(summary.rate, "0.50");
    assert!(!summary.posted);

    let text = fs::read_to_string(dir.path().join("r0007/indexing_foo.summary"))?;
    assert_eq!(
        text,
        "Number of indexed events: 50\nFractional indexing rate: 0.50\n"
    );
    Ok(())
}

#[test]
fn test_report_uses_tagged_peakfinding_summary() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_stream(dir.path(), 25)?;
    write_peakfinding(dir.path(), "peakfinding_bar.summary", PEAKFINDING_SUMMARY)?;

    let indexer = Indexer::new(identity(dir.path(), Some("bar")), params(), env(0));
    let summary = indexer.report(None)?.expect("rank 0 reports");
    assert_eq!(summary.rate, "0.25");
    Ok(())
}

#[test]
fn test_report_missing_stream_counts_zero() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_peakfinding(dir.path(), "peakfinding.summary", PEAKFINDING_SUMMARY)?;

    let indexer = Indexer::new(identity(dir.path(), None), params(), env(0));
    let summary = indexer.report(None)?.expect("rank 0 reports");
    assert_eq!(summary.n_indexed, 0);
    assert_eq!(summary.rate, "0.00");
    Ok(())
}

#[test]
fn test_report_zero_hits_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_stream(dir.path(), 0)?;
    write_peakfinding(
        dir.path(),
        "peakfinding.summary",
        "Number of events processed: 10\nNumber of hits found: 0\nFractional hit rate: 0.00\n",
    )?;

    let indexer = Indexer::new(identity(dir.path(), None), params(), env(0));
    assert!(indexer.report(None).is_err());
    assert!(!dir.path().join("r0007/indexing_foo.summary").exists());
    Ok(())
}

#[test]
fn test_report_missing_peakfinding_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_stream(dir.path(), 3)?;
    let indexer = Indexer::new(identity(dir.path(), None), params(), env(0));
    assert!(indexer.report(None).is_err());
    Ok(())
}

#[test]
fn test_report_unreachable_elog_still_succeeds() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_stream(dir.path(), 10)?;
    write_peakfinding(dir.path(), "peakfinding.summary", PEAKFINDING_SUMMARY)?;

    let indexer = Indexer::new(identity(dir.path(), None), params(), env(0));
    let summary = indexer
        .report(Some("http://127.0.0.1:1/jid/update_counters"))?
        .expect("rank 0 reports");
    assert_eq!(summary.rate, "0.10");
    assert!(!summary.posted);
    assert!(dir.path().join("r0007/indexing_foo.summary").is_file());
    Ok(())
}

#[test]
fn test_report_skipped_on_nonzero_rank() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let indexer = Indexer::new(identity(dir.path(), None), params(), env(1));
    assert_eq!(indexer.report(None)?, None);
    Ok(())
}
