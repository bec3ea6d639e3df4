use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::extract::MarkerFormat;
use crate::types::{ExperimentResult, ParameterPoint, TrialSample};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// How a single invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Non-zero exit or killed by a signal.
    Failed(String),
    SpawnFailed(String),
    TimedOut(Duration),
}

/// Captured result of one program run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stdout: String,
    pub stderr: String,
    pub outcome: Outcome,
}

/// Something that can be run once for a point and report its output.
pub trait Program {
    fn invoke(&mut self, point: &ParameterPoint) -> Invocation;
}

impl<P: Program + ?Sized> Program for &mut P {
    fn invoke(&mut self, point: &ParameterPoint) -> Invocation {
        (**self).invoke(point)
    }
}

/// Arguments appended after the configured command for a point.
pub fn point_args(input: &Path, point: &ParameterPoint) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        input.to_string_lossy().into_owned(),
        "-t".to_string(),
        point.thread_count.to_string(),
    ];
    if let Some(chunk) = point.chunk_size_bytes {
        args.push("-c".to_string());
        args.push(chunk.to_string());
    }
    args.push("-q".to_string());
    args
}

/// The real benchmarked program, launched as a child process.
#[derive(Debug, Clone)]
pub struct ExternalProgram {
    command: Vec<String>,
    input: PathBuf,
    timeout: Option<Duration>,
}

impl ExternalProgram {
    pub fn new(command: Vec<String>, input: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            command,
            input,
            timeout,
        }
    }
}

impl Program for ExternalProgram {
    fn invoke(&mut self, point: &ParameterPoint) -> Invocation {
        let Some((program, leading)) = self.command.split_first() else {
            return Invocation {
                stdout: String::new(),
                stderr: String::new(),
                outcome: Outcome::SpawnFailed("empty command".to_string()),
            };
        };

        let args = point_args(&self.input, point);
        tracing::debug!(program = %program, ?leading, ?args, "invoking");

        let mut cmd = Command::new(program);
        cmd.args(leading).args(&args).stdin(Stdio::null());

        match self.timeout {
            None => run_to_completion(cmd),
            Some(timeout) => run_with_timeout(cmd, timeout),
        }
    }
}

fn status_outcome(status: ExitStatus) -> Outcome {
    if status.success() {
        Outcome::Completed
    } else {
        Outcome::Failed(status.to_string())
    }
}

fn spawn_failed(err: &std::io::Error) -> Invocation {
    Invocation {
        stdout: String::new(),
        stderr: String::new(),
        outcome: Outcome::SpawnFailed(err.to_string()),
    }
}

fn log_abnormal_exit(invocation: &Invocation) {
    if !matches!(invocation.outcome, Outcome::Completed) {
        tracing::debug!(
            outcome = ?invocation.outcome,
            stderr = %invocation.stderr.trim(),
            "program exited abnormally"
        );
    }
}

fn run_to_completion(mut cmd: Command) -> Invocation {
    let invocation = match cmd.output() {
        Ok(output) => Invocation {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            outcome: status_outcome(output.status),
        },
        Err(e) => return spawn_failed(&e),
    };
    log_abnormal_exit(&invocation);
    invocation
}

fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Invocation {
    let child = match cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(e) => return spawn_failed(&e),
    };
    let invocation = wait_with_timeout(child, timeout);
    log_abnormal_exit(&invocation);
    invocation
}

/// Read a pipe to the end on a helper thread. The text arrives on the
/// returned channel once every writer has closed the pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

fn wait_with_timeout(mut child: Child, timeout: Duration) -> Invocation {
    // Drain both pipes concurrently so a chatty child cannot block on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let outcome = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status_outcome(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                break Outcome::TimedOut(timeout);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                break Outcome::Failed(e.to_string());
            }
        }
    };

    // Processes forked by the child can hold the pipes open after it exits.
    // Their output is not waited for past the deadline plus a short grace.
    let collect_by = deadline.max(Instant::now()) + DRAIN_GRACE;
    let remaining = || collect_by.saturating_duration_since(Instant::now());
    Invocation {
        stdout: stdout.recv_timeout(remaining()).unwrap_or_default(),
        stderr: stderr.recv_timeout(remaining()).unwrap_or_default(),
        outcome,
    }
}

/// What happened on one trial, handed to the progress observer.
#[derive(Debug)]
pub struct TrialReport<'a> {
    pub point: &'a ParameterPoint,
    /// 1-based.
    pub trial: usize,
    pub sample: Option<TrialSample>,
    pub outcome: &'a Outcome,
}

/// Runs a point's trials back to back and extracts their timings.
#[derive(Debug)]
pub struct TrialRunner<P> {
    program: P,
    marker: MarkerFormat,
}

impl<P: Program> TrialRunner<P> {
    pub fn new(program: P, marker: MarkerFormat) -> Self {
        Self { program, marker }
    }

    /// Run `repeat_count` trials of `point`. Trials without a timing are kept
    /// as `None` and logged; they never abort the run.
    pub fn run(
        &mut self,
        point: ParameterPoint,
        repeat_count: usize,
        on_trial: &mut dyn FnMut(&TrialReport<'_>),
    ) -> ExperimentResult {
        let mut trials = Vec::with_capacity(repeat_count);

        for trial in 1..=repeat_count {
            let invocation = self.program.invoke(&point);

            let sample = match &invocation.outcome {
                Outcome::TimedOut(_) => None,
                _ => self.marker.extract(&invocation.stdout).map(TrialSample),
            };

            match (&invocation.outcome, sample) {
                (Outcome::Completed, Some(_)) => {}
                (outcome, Some(_)) => {
                    tracing::warn!(%point, trial, ?outcome, "program did not exit cleanly; timing still recorded");
                }
                (outcome, None) => {
                    tracing::warn!(%point, trial, ?outcome, "no timing in program output; trial skipped");
                }
            }

            on_trial(&TrialReport {
                point: &point,
                trial,
                sample,
                outcome: &invocation.outcome,
            });
            trials.push(sample);
        }

        ExperimentResult::new(point, trials)
    }
}
