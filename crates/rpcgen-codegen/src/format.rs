//! External source formatter.
//!
//! The generator never formats text itself; it pipes the assembled source
//! through a per-target command (`prettier`, `gofmt`, ...) and reads the
//! result back from stdout.

use crate::config::FormatterCommand;
use crate::error::FormatFailure;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// One formatter invocation.
#[derive(Debug, Clone)]
pub struct Formatter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Formatter {
    /// `None` when the command is empty (formatting disabled).
    pub fn new(command: &FormatterCommand, timeout: Duration) -> Option<Self> {
        let (program, args) = command.command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the formatter over `source`.
    ///
    /// The child is killed if it outlives the timeout, so it is released on
    /// every exit path.
    pub async fn run(&self, source: &str) -> Result<String, FormatFailure> {
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FormatFailure::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FormatFailure::Io("formatter stdin was not captured".into()))?;
        let input = source.as_bytes().to_vec();
        let feed = async move {
            // Write errors are ignored; a formatter that quits early is
            // reported through its exit status.
            let _ = stdin.write_all(&input).await;
            let _ = stdin.shutdown().await;
        };

        let work = async move {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        let output = match tokio::time::timeout(self.timeout, work).await {
            Ok(output) => output.map_err(|e| FormatFailure::Io(e.to_string()))?,
            Err(_) => {
                tracing::warn!(
                    program = %self.program,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "formatter timed out"
                );
                return Err(FormatFailure::TimedOut(self.timeout));
            }
        };

        tracing::debug!(
            program = %self.program,
            elapsed_ms = started.elapsed().as_millis() as u64,
            status = ?output.status.code(),
            "formatter finished"
        );

        if !output.status.success() {
            return Err(FormatFailure::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| FormatFailure::InvalidOutput)
    }
}
