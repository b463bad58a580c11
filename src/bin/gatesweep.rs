//! CLI for sweeping an admission-control subject.
//!
//! # Usage
//!
//! ```bash
//! # Accuracy sweep with the standard grid (builds subject/main.go first)
//! cargo run --bin gatesweep -- --mode load
//!
//! # Latency sweep against a pre-built subject binary
//! cargo run --bin gatesweep -- --mode perf --subject-bin ./subject-exec
//!
//! # Custom grid
//! cargo run --bin gatesweep -- \
//!   --cores 1,2,4,8 --trials 5 --duration 10 --refill-rate 10 --capacity 10
//!
//! # Full sweep description from a file
//! cargo run --bin gatesweep -- --config sweep.json --output ./results/
//! ```

use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use gatesweep::report::{console_summary, render_chart, ChartSpec};
use gatesweep::{
    build_subject, HarnessError, ProcessSubject, SweepConfig, SweepRunner, Toolchain,
};

/// Benchmark-sweep harness for admission-control subjects
#[derive(Parser, Debug)]
#[command(name = "gatesweep")]
#[command(about = "Sweep an admission-control subject across core counts and variants")]
#[command(version)]
struct Args {
    /// Sweep preset: load (admission accuracy) or perf (per-request latency)
    #[arg(short, long, default_value = "load")]
    mode: String,

    /// JSON sweep configuration file (replaces the preset entirely)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated core counts (overrides preset)
    #[arg(long)]
    cores: Option<String>,

    /// Trial repetitions per grid point (overrides preset)
    #[arg(long)]
    trials: Option<usize>,

    /// Seconds (load) or request count (perf) per invocation
    #[arg(long)]
    duration: Option<u64>,

    /// Tokens added per second
    #[arg(long)]
    refill_rate: Option<u64>,

    /// Bucket capacity
    #[arg(long)]
    capacity: Option<u64>,

    /// Subject source file to compile
    #[arg(long, default_value = "subject/main.go")]
    subject_src: PathBuf,

    /// Pre-built subject binary (skips the build step)
    #[arg(long)]
    subject_bin: Option<PathBuf>,

    /// Optional file whose first line names the compiler command
    #[arg(long)]
    toolchain_conf: Option<PathBuf>,

    /// Per-invocation timeout in seconds; 0 disables the bound
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Output directory for the chart and results dump
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Skip writing the SVG chart
    #[arg(long)]
    no_chart: bool,

    /// Draw plain lines instead of error bars
    #[arg(long)]
    no_error_bars: bool,

    /// Suppress the progress bar and configuration echo
    #[arg(short, long)]
    quiet: bool,
}

fn fatal(error: &HarnessError) -> ! {
    eprintln!("{} {}", "error:".red().bold(), error);
    process::exit(1);
}

fn main() {
    let args = Args::parse();

    // Resolve the sweep description: file beats preset, flags tweak either.
    let mut config = if let Some(path) = &args.config {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!(
                    "{} failed to read config {}: {}",
                    "error:".red().bold(),
                    path.display(),
                    e
                );
                process::exit(1);
            }
        };
        match serde_json::from_str::<SweepConfig>(&text) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "{} invalid config {}: {}",
                    "error:".red().bold(),
                    path.display(),
                    e
                );
                process::exit(1);
            }
        }
    } else {
        match args.mode.to_lowercase().as_str() {
            "load" => SweepConfig::load_sweep(),
            "perf" | "performance" => SweepConfig::performance_sweep(),
            _ => {
                eprintln!(
                    "{} unknown mode '{}'. Available: load, perf",
                    "error:".red().bold(),
                    args.mode
                );
                process::exit(1);
            }
        }
    };

    if let Some(cores) = &args.cores {
        config.cores = cores
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
    }
    if let Some(trials) = args.trials {
        config.trials = trials;
    }
    if let Some(duration) = args.duration {
        config.params.duration = duration;
    }
    if let Some(refill_rate) = args.refill_rate {
        config.params.refill_rate = refill_rate;
    }
    if let Some(capacity) = args.capacity {
        config.params.capacity = capacity;
    }
    if let Err(e) = config.validate() {
        fatal(&HarnessError::Config(e));
    }

    if !args.output.exists() {
        if let Err(e) = fs::create_dir_all(&args.output) {
            eprintln!(
                "{} failed to create output directory: {}",
                "error:".red().bold(),
                e
            );
            process::exit(1);
        }
    }

    // One-time build, before any measurement.
    let binary = match &args.subject_bin {
        Some(path) => path.clone(),
        None => {
            let toolchain = Toolchain::resolve(args.toolchain_conf.as_deref(), "go");
            let output = args.output.join("subject-exec");
            match build_subject(&toolchain, &args.subject_src, &output) {
                Ok(path) => {
                    if !args.quiet {
                        println!("Compiled subject to {}", path.display());
                    }
                    path
                }
                Err(e) => fatal(&e),
            }
        }
    };

    let mut subject = ProcessSubject::new(&binary);
    if args.timeout_secs > 0 {
        subject = subject.timeout(Duration::from_secs(args.timeout_secs));
    }

    if !args.quiet {
        println!("=== gatesweep ===\n");
        println!("Configuration:");
        println!("  Subject: {}", binary.display());
        println!("  Cores: {:?}", config.cores);
        let labels: Vec<&str> = config.variants.iter().map(|v| v.label.as_str()).collect();
        println!("  Variants: {labels:?}");
        println!("  Trials per point: {}", config.trials);
        println!(
            "  Duration: {}, Refill rate: {}, Capacity: {}",
            config.params.duration, config.params.refill_rate, config.params.capacity
        );
        println!("  Total invocations: {}", config.total_trials());
        println!();
    }

    let total_trials = config.total_trials();
    let progress_bar = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(total_trials as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_message("starting...");
        bar
    };

    let bar = progress_bar.clone();
    let runner = SweepRunner::new(Box::new(subject)).on_progress(move |fraction, task| {
        bar.set_position((fraction * total_trials as f64) as u64);
        bar.set_message(task.to_string());
    });

    let results = match runner.run(&config) {
        Ok(results) => results,
        Err(e) => {
            progress_bar.abandon();
            fatal(&e);
        }
    };
    progress_bar.finish_with_message("complete");

    // Per-point summary lines.
    print!("{}", console_summary(&results));

    // Partial-data warnings, visually distinct from fatal aborts.
    for loss in &results.losses {
        eprintln!(
            "{} {} at {} cores: {}/{} trials discarded",
            "warning:".yellow().bold(),
            loss.label,
            loss.cores,
            loss.failed,
            loss.trials
        );
    }
    for failure in &results.failed {
        eprintln!(
            "{} series '{}' aborted at {} cores: {}",
            "warning:".yellow().bold(),
            failure.label,
            failure.cores,
            failure.error
        );
    }

    if results.series.is_empty() {
        eprintln!(
            "{} every variant failed; nothing to report",
            "error:".red().bold()
        );
        process::exit(1);
    }

    // Machine-readable dump next to the chart.
    let json_path = args.output.join("results.json");
    match serde_json::to_string_pretty(&results) {
        Ok(json) => {
            if let Err(e) = fs::write(&json_path, json) {
                eprintln!("{} failed to write results.json: {}", "warning:".yellow().bold(), e);
            } else if !args.quiet {
                println!("Wrote results to {}", json_path.display());
            }
        }
        Err(e) => eprintln!(
            "{} failed to serialize results: {}",
            "warning:".yellow().bold(),
            e
        ),
    }

    if !args.no_chart {
        let mut spec = ChartSpec::for_sweep(&results.config, &args.output);
        spec.error_bars = !args.no_error_bars;
        match render_chart(&results, &spec) {
            Ok(report) => println!("Chart saved to {}", report.path.display()),
            Err(e) => fatal(&e),
        }
    }
}
