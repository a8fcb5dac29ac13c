use crate::error::InkstoneError;
use std::{
    path::PathBuf,
    process::Stdio,
    sync::Arc,
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// How much of a failing build's stderr is echoed back to the operator.
const STDERR_TAIL_BYTES: usize = 2048;

/// Runs the static-site build as a subprocess, at most one at a time.
///
/// The runner awaits the child and reports its outcome; a second trigger
/// while a build is in flight fails fast with `BuildBusy` instead of
/// spawning an overlapping process into the same output directory.
#[derive(Clone)]
pub struct BuildRunner {
    command: Arc<Vec<String>>,
    workdir: Arc<PathBuf>,
    timeout: Duration,
    slot: Arc<Mutex<()>>,
}

impl BuildRunner {
    pub fn new(command: Vec<String>, workdir: PathBuf, timeout: Duration) -> Self {
        Self {
            command: Arc::new(command),
            workdir: Arc::new(workdir),
            timeout,
            slot: Arc::new(Mutex::new(())),
        }
    }

    /// Executes the configured build command and waits for it to exit.
    ///
    /// Errors: `BuildBusy` when another build holds the slot, `BuildFailed`
    /// on spawn failure, non-zero exit, or timeout (the child is killed when
    /// the timeout drops it).
    pub async fn run(&self) -> Result<(), InkstoneError> {
        let _slot = self.slot.try_lock().map_err(|_| InkstoneError::BuildBusy)?;

        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| InkstoneError::BuildFailed("build command is empty".to_string()))?;

        info!(command = %self.command.join(" "), workdir = %self.workdir.display(), "starting build");

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .current_dir(self.workdir.as_ref())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                warn!("build timed out");
                InkstoneError::BuildFailed(format!(
                    "build timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                InkstoneError::BuildFailed(format!("failed to spawn `{program}`: {e}"))
            })?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut tail_start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
            while !stderr.is_char_boundary(tail_start) {
                tail_start += 1;
            }
            let tail = stderr[tail_start..].trim();
            return Err(InkstoneError::BuildFailed(format!(
                "build exited with status {code}: {tail}"
            )));
        }

        info!("build finished");
        Ok(())
    }
}
