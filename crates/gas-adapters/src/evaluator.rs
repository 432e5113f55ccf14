//! External runtime evaluator.
//!
//! Pipes the synthesized module into a runtime process (by default
//! `node --input-type=module`) and decodes the JSON object printed on the
//! last non-blank line of its standard output.
//!
//! On unix the runtime leads its own process group, and a timeout kills the
//! whole group. Output still held open by an escaped descendant is abandoned
//! once the deadline has passed.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use gas_core::{
    application::{ApplicationError, ports::ConfigEvaluator},
    domain::{ConfigScript, EvaluatedConfigs},
    error::{GasError, GasResult},
};

pub const DEFAULT_PROGRAM: &str = "node";
pub const DEFAULT_ARGS: &[&str] = &["--input-type=module"];
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// How long output readers get after the runtime is gone.
const OUTPUT_GRACE: Duration = Duration::from_millis(250);

/// Evaluates scripts by running an external program.
#[derive(Debug, Clone)]
pub struct ProcessEvaluator {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessEvaluator {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// `node --input-type=module` with the default timeout.
    pub fn node() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_ARGS.iter().copied())
    }

    /// `None` waits for the runtime indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn locate(&self) -> GasResult<PathBuf> {
        which::which(&self.program).map_err(|e| {
            debug!(program = %self.program, error = %e, "runtime lookup failed");
            ApplicationError::RuntimeNotFound {
                program: self.program.clone(),
            }
            .into()
        })
    }

    fn failure(&self, reason: impl Into<String>, output: String) -> GasError {
        ApplicationError::EvaluationFailed {
            program: self.program.clone(),
            reason: reason.into(),
            output,
        }
        .into()
    }
}

impl Default for ProcessEvaluator {
    fn default() -> Self {
        Self::node()
    }
}

impl ConfigEvaluator for ProcessEvaluator {
    #[instrument(skip_all, fields(program = %self.program))]
    fn evaluate(&self, script: &ConfigScript) -> GasResult<EvaluatedConfigs> {
        let program = self.locate()?;
        debug!(path = %program.display(), bytes = script.as_str().len(), "starting runtime");

        let mut command = Command::new(&program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command
            .spawn()
            .map_err(|e| self.failure(format!("failed to start: {e}"), String::new()))?;

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let writer = feed_stdin(&mut child, script.as_str().to_owned());
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_deadline(&mut child, deadline);

        // Bounded only when a timeout is configured.
        let readers_until = deadline.map(|deadline| deadline.max(Instant::now() + OUTPUT_GRACE));
        let captured = Captured {
            stdout: collect_output(stdout, readers_until),
            stderr: collect_output(stderr, readers_until),
        };
        if let Some(writer) = writer.filter(JoinHandle::is_finished) {
            if let Ok(Err(e)) = writer.join() {
                debug!(error = %e, "runtime closed stdin early");
            }
        }

        match status {
            Err(e) => Err(self.failure(format!("failed to wait: {e}"), captured.combined())),
            Ok(None) => Err(ApplicationError::EvaluationTimedOut {
                program: self.program.clone(),
                timeout_secs: self.timeout.map_or(0, |t| t.as_secs()),
                output: captured.combined(),
            }
            .into()),
            Ok(Some(status)) if !status.success() => {
                Err(self.failure(describe(status), captured.combined()))
            }
            Ok(Some(_)) => {
                if !captured.stderr.trim().is_empty() {
                    warn!(stderr = %captured.stderr.trim_end(), "runtime wrote to stderr");
                }
                Ok(EvaluatedConfigs::from_output(&captured.stdout)?)
            }
        }
    }
}

struct Captured {
    stdout: String,
    stderr: String,
}

impl Captured {
    fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }
}

/// Write the script on its own thread so a full stdout pipe cannot deadlock
/// the child. Dropping the handle closes stdin.
fn feed_stdin(child: &mut Child, script: String) -> Option<JoinHandle<std::io::Result<()>>> {
    let mut stdin = child.stdin.take()?;
    Some(thread::spawn(move || stdin.write_all(script.as_bytes())))
}

/// Forward a pipe's chunks from a detached thread until it closes.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<mpsc::Receiver<Vec<u8>>> {
    let mut pipe = pipe?;
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = [0u8; 8192];
        loop {
            match pipe.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    // The collector stops listening once its deadline passed.
                    if sender.send(buffer[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    debug!(error = %e, "failed to read runtime output");
                    break;
                }
            }
        }
    });
    Some(receiver)
}

/// Output received until the pipe closed or `until` passed.
fn collect_output(output: Option<mpsc::Receiver<Vec<u8>>>, until: Option<Instant>) -> String {
    let Some(receiver) = output else {
        return String::new();
    };
    let mut bytes = Vec::new();
    loop {
        let chunk = match until {
            None => receiver
                .recv()
                .map_err(|_| mpsc::RecvTimeoutError::Disconnected),
            Some(until) => receiver.recv_timeout(until.saturating_duration_since(Instant::now())),
        };
        match chunk {
            Ok(chunk) => bytes.extend_from_slice(&chunk),
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                debug!("runtime output still open, keeping what arrived");
                break;
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `Ok(None)` when the deadline passed and the runtime was killed.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            kill_runtime(child);
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the runtime's process group, falling back to the runtime alone.
#[cfg(unix)]
fn kill_runtime(child: &mut Child) {
    if let Ok(group) = i32::try_from(child.id()) {
        // SAFETY: `kill` only takes integers; a stale group id yields ESRCH.
        if unsafe { libc::kill(-group, libc::SIGKILL) } == 0 {
            return;
        }
        debug!(
            error = %std::io::Error::last_os_error(),
            "failed to kill runtime process group"
        );
    }
    kill_child(child);
}

#[cfg(not(unix))]
fn kill_runtime(child: &mut Child) {
    kill_child(child);
}

fn kill_child(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "failed to kill runtime");
    }
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}
