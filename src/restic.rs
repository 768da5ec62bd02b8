//! Invocations of the provisioned restic executable.
//!
//! The repository password always travels in `RESTIC_PASSWORD`, never on the
//! command line where other users could read it from the process list.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::error::ToolError;

pub const PASSWORD_ENV: &str = "RESTIC_PASSWORD";

#[derive(Debug, Clone)]
pub struct Restic {
    path: PathBuf,
}

impl Restic {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command(&self) -> Command {
        Command::new(&self.path)
    }

    fn spawn_error(&self, source: std::io::Error) -> ToolError {
        ToolError::Spawn {
            path: self.path.clone(),
            source,
        }
    }

    fn check(command: &str, status: ExitStatus) -> Result<(), ToolError> {
        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                command: command.to_string(),
                status: status.to_string(),
            })
        }
    }

    /// `restic self-update`, output passed straight through to the terminal
    pub async fn self_update(&self) -> Result<(), ToolError> {
        debug!("Running {} self-update", self.path.display());
        let status = self
            .command()
            .arg("self-update")
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;
        Self::check("self-update", status)
    }

    /// `restic -r <repo> init`
    pub async fn init(&self, repository: &Path, password: &str) -> Result<(), ToolError> {
        debug!("Running {} -r {} init", self.path.display(), repository.display());
        let status = self
            .command()
            .arg("-r")
            .arg(repository)
            .arg("init")
            .env(PASSWORD_ENV, password)
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;
        Self::check("init", status)
    }

    /// First line of `restic version`
    pub async fn version(&self) -> Result<String, ToolError> {
        let output = self
            .command()
            .arg("version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;
        Self::check("version", output.status)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    /// `restic -r <repo> backup <paths...>`, forwarding output line by line as raw bytes
    pub async fn backup(
        &self,
        repository: &Path,
        password: &str,
        paths: &[String],
        out: &mut dyn Write,
    ) -> Result<(), ToolError> {
        debug!(
            "Running {} -r {} backup ({} paths)",
            self.path.display(),
            repository.display(),
            paths.len()
        );
        let mut child = self
            .command()
            .arg("-r")
            .arg(repository)
            .arg("backup")
            .args(paths)
            .env(PASSWORD_ENV, password)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                if let Err(e) = stderr.read_to_end(&mut buf).await {
                    debug!("Failed to read restic stderr: {e}");
                }
                buf
            })
        });

        if let Some(stdout) = child.stdout.take() {
            forward_lines(BufReader::new(stdout), out).await;
        }

        let status = child.wait().await.map_err(|e| self.spawn_error(e))?;

        if let Some(task) = stderr_task
            && let Ok(stderr) = task.await
            && !stderr.is_empty()
        {
            let _ = out.write_all(&stderr);
        }

        Self::check("backup", status)
    }
}

/// Copy `reader` into `out` until EOF.
///
/// The pipe is drained even after `out` stops accepting writes, so the child
/// never dies of a closed pipe.
async fn forward_lines<R: AsyncBufRead + Unpin>(mut reader: R, out: &mut dyn Write) {
    let mut line = Vec::new();
    let mut writable = true;
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                if writable && out.write_all(&line).and_then(|()| out.flush()).is_err() {
                    debug!("Output closed, discarding remaining restic output");
                    writable = false;
                }
            }
            Err(e) => {
                debug!("Failed to read restic output: {e}");
                break;
            }
        }
    }
}
