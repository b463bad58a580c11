//! Subject invocation and the one-time build step.
//!
//! The subject is an externally built, independently owned program. The
//! harness knows two things about it: the positional argument contract
//! ([`Invocation::args`]) and the output grammar it prints (see
//! [`crate::parse`]). Everything else about it, algorithms and internal
//! concurrency included, is opaque.
//!
//! [`Subject`] is the invocation seam: the process-backed implementation is
//! [`ProcessSubject`]; [`ScriptedSubject`] replays canned outputs so the
//! sweep pipeline can run without a real binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::SweepParams;
use crate::error::HarnessError;

/// How often the bounded wait polls a running child.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A single request to the subject: which benchmark mode to run plus the
/// full positional parameter tuple. Stateless; safe to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub selector: String,
    pub cores: u32,
    pub variant_id: u32,
    pub params: SweepParams,
}

impl Invocation {
    /// Render the positional arguments in the documented contract order:
    /// selector, core count, variant id, duration, refill rate, capacity.
    pub fn args(&self) -> Vec<String> {
        vec![
            self.selector.clone(),
            self.cores.to_string(),
            self.variant_id.to_string(),
            self.params.duration.to_string(),
            self.params.refill_rate.to_string(),
            self.params.capacity.to_string(),
        ]
    }
}

/// Captured output of one subject invocation. The invoker does not
/// interpret stdout; classification happens in the trial runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub stdout: String,
    /// Kept separately for diagnostics.
    pub stderr: String,
    /// Exit code; `None` when the subject was killed by a signal.
    pub code: Option<i32>,
    /// True when the bounded wait expired and the subject was killed.
    pub timed_out: bool,
}

impl Captured {
    /// A clean run: exited zero within the wait bound.
    pub fn success(&self) -> bool {
        !self.timed_out && self.code == Some(0)
    }
}

/// Executes the subject program once per invocation.
pub trait Subject {
    /// Run the subject synchronously and capture its output.
    ///
    /// Failing to start the process at all is fatal
    /// ([`HarnessError::ExecutionFailure`]); a non-zero exit is not an
    /// error here. It is reported in [`Captured`] and classified by the
    /// caller.
    fn invoke(&self, invocation: &Invocation) -> Result<Captured, HarnessError>;
}

/// Runs the compiled subject binary as a child process.
#[derive(Debug, Clone)]
pub struct ProcessSubject {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessSubject {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Bound each invocation's wait. On expiry the subject is killed and
    /// the capture is flagged `timed_out`; without a bound a hung subject
    /// stalls the sweep indefinitely.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

impl Subject for ProcessSubject {
    fn invoke(&self, invocation: &Invocation) -> Result<Captured, HarnessError> {
        let mut child = Command::new(&self.binary)
            .args(invocation.args())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HarnessError::ExecutionFailure {
                program: self.binary.display().to_string(),
                source,
            })?;

        let timed_out = match self.timeout {
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    match child.try_wait() {
                        Ok(Some(_)) => break false,
                        Ok(None) if Instant::now() >= deadline => {
                            let _ = child.kill();
                            break true;
                        }
                        Ok(None) => thread::sleep(POLL_INTERVAL),
                        Err(_) => break false,
                    }
                }
            }
            None => false,
        };

        // Drains the pipes and reaps the child; for an already-waited or
        // killed child this returns the cached/final status immediately.
        let output = child
            .wait_with_output()
            .map_err(|source| HarnessError::ExecutionFailure {
                program: self.binary.display().to_string(),
                source,
            })?;

        Ok(Captured {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
            timed_out,
        })
    }
}

/// Subject stand-in that replays scripted captures instead of spawning a
/// process. Responses cycle when the sweep asks for more invocations than
/// were scripted; every invocation is logged for inspection.
pub struct ScriptedSubject {
    responses: Vec<Captured>,
    log: Arc<Mutex<Vec<Invocation>>>,
}

impl ScriptedSubject {
    /// A subject that cycles through `responses`. Panics later if
    /// `responses` is empty; a scripted subject with nothing to say is a
    /// test bug.
    pub fn new(responses: Vec<Captured>) -> Self {
        Self {
            responses,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A subject that always exits zero printing `stdout`.
    pub fn printing(stdout: &str) -> Self {
        Self::new(vec![Captured {
            stdout: stdout.to_string(),
            stderr: String::new(),
            code: Some(0),
            timed_out: false,
        }])
    }

    /// Shared handle onto the invocation log; keep a clone before boxing
    /// the subject into a runner.
    pub fn call_log(&self) -> Arc<Mutex<Vec<Invocation>>> {
        Arc::clone(&self.log)
    }
}

impl Subject for ScriptedSubject {
    fn invoke(&self, invocation: &Invocation) -> Result<Captured, HarnessError> {
        let mut log = self.log.lock().expect("invocation log poisoned");
        let index = log.len() % self.responses.len();
        log.push(invocation.clone());
        Ok(self.responses[index].clone())
    }
}

// =============================================================================
// Build step
// =============================================================================

/// Toolchain used to compile the subject, resolved once before any sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Compiler command, e.g. `go` or an absolute path to one.
    pub command: String,
}

impl Toolchain {
    /// Read the compiler command from the first line of `conf`, falling
    /// back to `default` when the file is absent or blank.
    pub fn resolve(conf: Option<&Path>, default: &str) -> Self {
        let command = conf
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|text| {
                let first = text.lines().next().unwrap_or("").trim().to_string();
                if first.is_empty() {
                    None
                } else {
                    Some(first)
                }
            })
            .unwrap_or_else(|| default.to_string());
        Self { command }
    }
}

/// Compile the subject source into an executable at `output`.
///
/// Runs `<toolchain> build -o <output> <source>`. A compiler that cannot be
/// started or exits non-zero is fatal; the compiler's stderr is surfaced
/// verbatim in [`HarnessError::BuildFailure`].
pub fn build_subject(
    toolchain: &Toolchain,
    source: &Path,
    output: &Path,
) -> Result<PathBuf, HarnessError> {
    let result = Command::new(&toolchain.command)
        .arg("build")
        .arg("-o")
        .arg(output)
        .arg(source)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| HarnessError::ExecutionFailure {
            program: toolchain.command.clone(),
            source: e,
        })?;

    if !result.status.success() {
        return Err(HarnessError::BuildFailure {
            diagnostic: String::from_utf8_lossy(&result.stderr).into_owned(),
        });
    }

    Ok(output.to_path_buf())
}
