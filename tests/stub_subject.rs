//! End-to-end sweeps against stub subjects.
//!
//! Each test compiles nothing: the "subject" is a shell script written into
//! a tempdir. That keeps the full pipeline honest (process spawning, output
//! capture, parsing, aggregation, reporting) without depending on a real
//! limiter implementation.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use gatesweep::report::{console_summary, render_chart, ChartSpec};
use gatesweep::{
    build_subject, run_trials, DataFailure, Grammar, HarnessError, Invocation, MetricKind,
    ProcessSubject, StatsError, SweepConfig, SweepParams, SweepRunner, Toolchain, Variant,
};

fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn accuracy_config(cores: Vec<u32>, variants: Vec<Variant>, trials: usize) -> SweepConfig {
    SweepConfig::new(
        cores,
        variants,
        trials,
        SweepParams {
            duration: 10,
            refill_rate: 10,
            capacity: 10,
        },
        MetricKind::AccuracyPercent,
    )
    .unwrap()
}

#[test]
fn perfect_subject_sweeps_to_flat_series() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), "subject", r#"echo "Expected 100.0 Actual 100""#);

    let config = accuracy_config(
        vec![1, 2, 4],
        vec![
            Variant::new("Naive", "TokenBucketLoad", 1),
            Variant::new("Cascade", "CascadeLoad", 1),
        ],
        3,
    );
    let runner = SweepRunner::new(Box::new(ProcessSubject::new(&stub)));
    let results = runner.run(&config).unwrap();

    assert_eq!(results.series.len(), 2);
    for series in &results.series {
        assert_eq!(series.points.len(), 3);
        for point in &series.points {
            assert_eq!(point.result.mean, 100.0);
            assert_eq!(point.result.std_dev, 0.0);
        }
    }
    assert!(results.failed.is_empty());

    let summary = console_summary(&results);
    assert!(summary
        .lines()
        .any(|l| l == "Naive - Cores: 1, Avg Percentage: 100.000%, Std Dev: 0.000%"));
}

#[test]
fn alternating_subject_has_population_deviation() {
    // The stub flips between 90 and 110 admitted via a state file, so four
    // trials see {90, 110, 90, 110}: mean 100, population std dev 10.
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        r#"STATE="{}/state"
if [ -f "$STATE" ]; then
  rm "$STATE"
  echo "Expected 100.0 Actual 110"
else
  : > "$STATE"
  echo "Expected 100.0 Actual 90"
fi"#,
        dir.path().display()
    );
    let stub = write_stub(dir.path(), "subject", &body);

    let config = accuracy_config(vec![1], vec![Variant::new("Naive", "TokenBucketLoad", 1)], 4);
    let results = SweepRunner::new(Box::new(ProcessSubject::new(&stub)))
        .run(&config)
        .unwrap();

    let point = &results.series[0].points[0];
    assert!((point.result.mean - 100.0).abs() < 1e-9);
    assert!((point.result.std_dev - 10.0).abs() < 1e-9);
}

#[test]
fn latency_sweep_normalizes_per_request() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), "subject", r#"echo "Time: 4200""#);

    let config = SweepConfig::new(
        vec![1, 2],
        vec![Variant::new("Naive", "TokenBucketPerf", 1)],
        2,
        SweepParams {
            duration: 1_000,
            refill_rate: 100,
            capacity: 10,
        },
        MetricKind::ElapsedNanos { per_request: true },
    )
    .unwrap();
    let results = SweepRunner::new(Box::new(ProcessSubject::new(&stub)))
        .run(&config)
        .unwrap();

    for point in &results.series[0].points {
        assert!((point.result.mean - 4.2).abs() < 1e-9);
        assert_eq!(point.result.std_dev, 0.0);
    }

    let summary = console_summary(&results);
    assert!(summary
        .lines()
        .any(|l| l == "Naive Performance 1 cores: 4.200 ± 0.000"));
}

#[test]
fn crashing_selector_aborts_only_its_variant() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        "subject",
        r#"case "$1" in
  Crash*) echo "bucket underflow" >&2; exit 3 ;;
  *) echo "Expected 100.0 Actual 100" ;;
esac"#,
    );

    let config = accuracy_config(
        vec![1, 2],
        vec![
            Variant::new("Bad", "CrashLoad", 1),
            Variant::new("Good", "TokenBucketLoad", 1),
        ],
        2,
    );
    let results = SweepRunner::new(Box::new(ProcessSubject::new(&stub)))
        .run(&config)
        .unwrap();

    assert_eq!(results.series.len(), 1);
    assert_eq!(results.series[0].label, "Good");
    assert_eq!(results.series[0].points.len(), 2);

    assert_eq!(results.failed.len(), 1);
    assert_eq!(results.failed[0].label, "Bad");
    assert_eq!(results.failed[0].error, StatsError::InsufficientData);
}

#[test]
fn nonzero_exit_keeps_stderr_for_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), "subject", r#"echo "oops" >&2; exit 1"#);

    let invocation = Invocation {
        selector: "TokenBucketLoad".to_string(),
        cores: 1,
        variant_id: 1,
        params: SweepParams {
            duration: 10,
            refill_rate: 10,
            capacity: 10,
        },
    };
    let subject = ProcessSubject::new(&stub);
    let batch = run_trials(&subject, &invocation, Grammar::Throughput, 2).unwrap();

    assert_eq!(batch.failure_count(), 2);
    for (_, failure) in batch.failures() {
        match failure {
            DataFailure::NonZeroExit { code, stderr } => {
                assert_eq!(*code, Some(1));
                assert_eq!(stderr, "oops");
            }
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }
}

#[test]
fn hung_subject_is_killed_at_the_deadline() {
    let dir = tempfile::tempdir().unwrap();
    // exec so the kill reaches the sleeping process itself, not a shell
    // parent holding the pipe open.
    let stub = write_stub(dir.path(), "subject", "exec sleep 5");

    let config = accuracy_config(vec![1], vec![Variant::new("Naive", "TokenBucketLoad", 1)], 1);
    let subject = ProcessSubject::new(&stub).timeout(Duration::from_millis(200));

    let start = Instant::now();
    let results = SweepRunner::new(Box::new(subject)).run(&config).unwrap();
    assert!(
        start.elapsed() < Duration::from_secs(3),
        "bounded wait did not fire"
    );

    assert!(results.series.is_empty());
    assert_eq!(results.failed[0].error, StatsError::InsufficientData);
    assert_eq!(results.losses[0].failed, 1);
}

#[test]
fn build_step_follows_the_toolchain_contract() {
    // A stand-in compiler that checks the argument shape and "compiles" by
    // copying the source to the output path.
    let dir = tempfile::tempdir().unwrap();
    let toolchain_stub = write_stub(
        dir.path(),
        "fakego",
        r#"if [ "$1" != "build" ] || [ "$2" != "-o" ]; then
  echo "unexpected args: $@" >&2
  exit 1
fi
cp "$4" "$3""#,
    );
    let source = dir.path().join("main.go");
    fs::write(&source, "package main").unwrap();
    let output = dir.path().join("subject-exec");

    let toolchain = Toolchain {
        command: toolchain_stub.display().to_string(),
    };
    let built = build_subject(&toolchain, &source, &output).unwrap();
    assert_eq!(built, output);
    assert_eq!(fs::read_to_string(&output).unwrap(), "package main");
}

#[test]
fn build_failure_surfaces_compiler_stderr_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let toolchain_stub = write_stub(
        dir.path(),
        "fakego",
        r#"echo "main.go:7: undefined: Refill" >&2; exit 2"#,
    );

    let toolchain = Toolchain {
        command: toolchain_stub.display().to_string(),
    };
    let err = build_subject(
        &toolchain,
        &dir.path().join("main.go"),
        &dir.path().join("out"),
    )
    .unwrap_err();

    match err {
        HarnessError::BuildFailure { diagnostic } => {
            assert!(diagnostic.contains("main.go:7: undefined: Refill"));
        }
        other => panic!("expected BuildFailure, got {other:?}"),
    }
}

#[test]
fn toolchain_conf_redirects_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let toolchain_stub = write_stub(dir.path(), "pinnedgo", r#"cp "$4" "$3""#);
    let conf = dir.path().join("toolchain.conf");
    fs::write(&conf, format!("{}\n", toolchain_stub.display())).unwrap();

    let source = dir.path().join("main.go");
    fs::write(&source, "package main").unwrap();
    let output = dir.path().join("subject-exec");

    let toolchain = Toolchain::resolve(Some(&conf), "go");
    assert_eq!(toolchain.command, toolchain_stub.display().to_string());
    build_subject(&toolchain, &source, &output).unwrap();
    assert!(output.exists());
}

#[test]
fn chart_artifact_lands_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path(), "subject", r#"echo "Expected 100.0 Actual 98""#);

    let config = accuracy_config(
        vec![1, 2, 4],
        vec![
            Variant::new("Naive", "TokenBucketLoad", 1),
            Variant::new("Cascade", "CascadeLoad", 1),
        ],
        2,
    );
    let results = SweepRunner::new(Box::new(ProcessSubject::new(&stub)))
        .run(&config)
        .unwrap();

    let spec = ChartSpec::for_sweep(&results.config, dir.path());
    let report = render_chart(&results, &spec).unwrap();

    let document = fs::read_to_string(&report.path).unwrap();
    assert!(document.starts_with("<svg"));
    assert_eq!(document.matches("<polyline").count(), 2);
    assert!(document.contains("Runtime: 10s, Refill Rate: 10, Capacity: 10"));
}
