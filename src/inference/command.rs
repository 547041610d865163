//! Inference through an external command
//!
//! Shells out to a user-configured program (a local model runner, a small
//! curl wrapper, anything). The request goes to the program's stdin as a
//! JSON chat transcript:
//!
//! ```json
//! [{"role": "system", "content": "..."}, {"role": "user", "content": "..."}]
//! ```
//!
//! and whatever the program prints on stdout is the completion. Arguments
//! are passed through `std::process::Command`, never through a shell.

use serde::Serialize;
use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{InferenceError, InferenceService};
use crate::core::config::InferenceConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Inference service backed by an external program
#[derive(Debug, Clone)]
pub struct CommandService {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandService {
    /// Create a service running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(InferenceConfig::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the time the program gets before it is killed
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from the `inference` config section
    pub fn from_config(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let (program, args) = config
            .command
            .as_deref()
            .and_then(|cmd| cmd.split_first())
            .ok_or(InferenceError::NotConfigured)?;
        Ok(Self::new(program.clone(), args.to_vec())
            .with_timeout(Duration::from_secs(config.timeout_secs)))
    }

    /// Format the command for display
    pub fn format_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn request_body(system: &str, user: &str) -> Result<Vec<u8>, InferenceError> {
        let messages = [
            Message {
                role: "system",
                content: system,
            },
            Message {
                role: "user",
                content: user,
            },
        ];
        Ok(serde_json::to_vec(&messages)?)
    }

    /// Wait for the child, killing it once the deadline passes
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, InferenceError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InferenceError::Timeout {
                    secs: self.timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl InferenceService for CommandService {
    fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError> {
        let body = Self::request_body(system, user)?;
        debug!(command = %self.format_command(), bytes = body.len(), "calling inference command");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Pipes are drained on their own threads so a chatty child can't
        // block on a full buffer while we wait on it
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // The program may exit without reading its input
                let _ = stdin.write_all(&body);
            }
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child)?;
        let _ = writer.join();
        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;

        if !status.success() {
            return Err(InferenceError::CommandFailed {
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        let response = String::from_utf8_lossy(&stdout).trim().to_string();
        if response.is_empty() {
            return Err(InferenceError::EmptyResponse);
        }
        debug!(bytes = response.len(), "inference command finished");
        Ok(response)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>, InferenceError> {
    match handle.join() {
        Ok(result) => Ok(result?),
        Err(_) => Err(InferenceError::Io(std::io::Error::other(
            "pipe reader thread panicked",
        ))),
    }
}
