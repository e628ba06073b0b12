use std::fmt;
use std::io::Read;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{AzError, Result};

/// Upper bound on a single az invocation unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Flags whose value is masked when a command line is displayed, both as the
/// next argument and in the `--flag=value` form
const SECRET_FLAGS: &[&str] = &["--password", "-p"];

/// Captured result of one subprocess invocation.
///
/// `output` and `stderr` are always trimmed, regardless of how the result was
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub output: String,
    pub exit_code: i32,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn new(output: &str, exit_code: i32) -> Self {
        Self {
            output: output.trim().to_string(),
            exit_code,
            stderr: String::new(),
        }
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.trim().to_string();
        self
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A program plus its argument list. Arguments are passed to the child
/// verbatim; nothing is interpreted by a shell.
#[derive(Clone, PartialEq, Eq)]
pub struct AzCommand {
    program: String,
    args: Vec<String>,
}

impl AzCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for AzCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                write!(f, " ***")?;
            } else if let Some((flag, _)) = arg
                .split_once('=')
                .filter(|(flag, _)| SECRET_FLAGS.contains(flag))
            {
                write!(f, " {}=***", flag)?;
            } else if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
            mask_next = SECRET_FLAGS.contains(&arg.as_str());
        }
        Ok(())
    }
}

// Debug goes through Display so secrets never end up in logs or panics
impl fmt::Debug for AzCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AzCommand").field(&self.to_string()).finish()
    }
}

/// Executes commands on behalf of the az wrappers. A non-zero exit status is
/// reported through [`ExecutionResult::exit_code`], not as an error; errors are
/// reserved for failing to run the program at all.
pub trait CommandRunner {
    fn run(&self, command: &AzCommand) -> Result<ExecutionResult>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, command: &AzCommand) -> Result<ExecutionResult> {
        (**self).run(command)
    }
}

/// Runs commands as real child processes.
///
/// stdout and stderr are both piped and captured; stderr is surfaced through
/// [`AzError::Process`] when the command fails. The child runs in its own
/// process group; once the timeout elapses the whole group is killed, whether
/// the child is still running or has exited but left a descendant holding its
/// output pipes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &AzCommand) -> Result<ExecutionResult> {
        debug!(command = %command, "spawning");

        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so a timeout also reaches whatever the child
        // started (the az launcher runs python as a grandchild)
        #[cfg(unix)]
        process.process_group(0);

        let mut child = process.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AzError::ToolMissing {
                program: command.program.clone(),
            },
            _ => AzError::Io {
                command: command.to_string(),
                source: e,
            },
        })?;

        // Drain both pipes while waiting so a chatty child cannot fill a pipe
        // buffer and stall
        let (tx, rx) = mpsc::channel();
        drain(Stream::Stdout, child.stdout.take(), tx.clone());
        drain(Stream::Stderr, child.stderr.take(), tx);

        let started = Instant::now();
        let deadline = started + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        return Err(self.timed_out(command, &mut child));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    kill_tree(&mut child);
                    return Err(AzError::Io {
                        command: command.to_string(),
                        source: e,
                    });
                }
            }
        };

        // The pipes stay open while any process that inherited them is alive,
        // so collecting output is bounded by the same deadline
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        for _ in 0..2 {
            match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok((Stream::Stdout, buf)) => stdout = buf,
                Ok((Stream::Stderr, buf)) => stderr = buf,
                Err(RecvTimeoutError::Timeout) => return Err(self.timed_out(command, &mut child)),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        // Signal termination has no exit code
        let exit_code = status.code().unwrap_or(-1);

        debug!(command = %command, exit_code, elapsed = ?started.elapsed(), "finished");

        Ok(
            ExecutionResult::new(&String::from_utf8_lossy(&stdout), exit_code)
                .with_stderr(&String::from_utf8_lossy(&stderr)),
        )
    }
}

impl SystemRunner {
    fn timed_out(&self, command: &AzCommand, child: &mut Child) -> AzError {
        kill_tree(child);
        warn!(command = %command, timeout = ?self.timeout, "command timed out, killed");
        AzError::Timeout {
            command: command.to_string(),
            after: self.timeout,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn drain<R: Read + Send + 'static>(
    stream: Stream,
    pipe: Option<R>,
    tx: mpsc::Sender<(Stream, Vec<u8>)>,
) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        // Receiver is gone once the call has timed out
        let _ = tx.send((stream, buf));
    });
}

/// Kill the child's whole process group, then the child itself, and reap it.
/// The group outlives the child while any member is still running, so this
/// also works after the child has exited.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let pgid = child.id().to_string();
        let _ = Command::new("sh")
            .args(["-c", r#"kill -KILL -"$1""#, "sh", &pgid])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Outcome of probing for an executable on PATH
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAvailability {
    Available { path: String },
    Missing { program: String },
}

impl ToolAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, ToolAvailability::Available { .. })
    }

    /// Resolved path, or [`AzError::ToolMissing`]
    pub fn into_result(self) -> Result<String> {
        match self {
            ToolAvailability::Available { path } => Ok(path),
            ToolAvailability::Missing { program } => Err(AzError::ToolMissing { program }),
        }
    }
}

/// Look `program` up with `command -v`. Never fails: any problem running the
/// probe is reported as [`ToolAvailability::Missing`].
pub fn tool_availability<R: CommandRunner + ?Sized>(runner: &R, program: &str) -> ToolAvailability {
    // Program name travels as a positional parameter, not spliced into the script
    let probe = AzCommand::new("sh").args(["-c", r#"command -v "$1""#, "sh", program]);

    match runner.run(&probe) {
        Ok(result) if result.success() && !result.output.is_empty() => {
            info!("{} command line tool is installed at {}", program, result.output);
            ToolAvailability::Available {
                path: result.output,
            }
        }
        Ok(result) => {
            warn!(exit_code = result.exit_code, "{} command line tool is not available", program);
            ToolAvailability::Missing {
                program: program.to_string(),
            }
        }
        Err(e) => {
            warn!(error = %e, "{} command line tool is not available", program);
            ToolAvailability::Missing {
                program: program.to_string(),
            }
        }
    }
}
