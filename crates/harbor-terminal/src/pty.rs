//! PTY-backed shell process handle using the `portable-pty` crate.
//!
//! [`ShellProcess`] owns one spawned shell: the PTY master for resizing, a
//! writer for input, the child handle for lifecycle, and a background
//! reader thread that pumps output chunks into an `mpsc` channel. All
//! methods are non-blocking except [`ShellProcess::wait_exit_code`].

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

use harbor_common::ViewportSize;

/// Bytes read from the PTY per reader-thread iteration.
const PTY_READ_CHUNK: usize = 8_192;

/// Environment variables inherited into the shell.
///
/// The parent process may carry OAuth client secrets and API tokens, so the
/// shell environment is rebuilt from this allowlist plus config extras.
const ALLOWED_ENV_VARS: &[&str] = &[
    "HOME",
    "USER",
    "LOGNAME",
    "SHELL",
    "PATH",
    "TERM",
    "LANG",
    "LC_ALL",
    "LC_CTYPE",
    "DISPLAY",
    "WAYLAND_DISPLAY",
    "XDG_RUNTIME_DIR",
    "TMPDIR",
    "TMP",
    "TEMP",
    // Windows-specific
    "USERPROFILE",
    "APPDATA",
    "LOCALAPPDATA",
    "SYSTEMROOT",
    "COMSPEC",
    "HOMEDRIVE",
    "HOMEPATH",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that make session creation fail outright.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("working directory does not exist: {0}")]
    WorkingDirMissing(PathBuf),

    #[error("failed to spawn shell process: {0}")]
    SpawnFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Launch description
// ---------------------------------------------------------------------------

/// Everything needed to spawn a shell: program, args, cwd, environment.
#[derive(Debug, Clone)]
pub struct ShellLaunch {
    pub program: String,
    pub args: Vec<String>,
    pub working_directory: PathBuf,
    /// Extra environment on top of the inherited allowlist.
    pub env: Vec<(String, String)>,
    /// Value for `TERM`.
    pub term: String,
    /// Pass `-l` on Unix for a login shell.
    pub login_shell: bool,
}

impl ShellLaunch {
    /// A launch for the platform default shell in the user's home directory.
    pub fn defaults() -> Self {
        Self {
            program: crate::shell::default_shell(),
            args: Vec::new(),
            working_directory: crate::shell::default_working_dir(),
            env: Vec::new(),
            term: "xterm-256color".into(),
            login_shell: true,
        }
    }

    fn build_command(&self) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(&self.program);

        #[cfg(unix)]
        if self.login_shell {
            cmd.arg("-l");
        }
        for arg in &self.args {
            cmd.arg(arg);
        }

        cmd.cwd(&self.working_directory);

        // Rebuild the environment from the allowlist, then config extras.
        cmd.env_clear();
        for key in ALLOWED_ENV_VARS {
            if let Ok(val) = std::env::var(key) {
                cmd.env(key, val);
            }
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd.env("TERM", &self.term);

        cmd
    }
}

// ---------------------------------------------------------------------------
// ShellProcess
// ---------------------------------------------------------------------------

/// One spawned shell attached to a PTY.
///
/// Output arrives on a channel fed by the `pty-reader` thread; the channel
/// exists before the process can produce anything, so early output (the
/// prompt banner) is never lost. Input and resize are best-effort once the
/// process has exited.
pub struct ShellProcess {
    writer: Box<dyn Write + Send>,
    output_rx: mpsc::Receiver<Vec<u8>>,
    child: Box<dyn Child + Send + Sync>,
    master: Box<dyn MasterPty + Send>,
    size: ViewportSize,
    /// Set once the reader thread hits EOF and the channel is drained.
    eof: bool,
}

impl std::fmt::Debug for ShellProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellProcess")
            .field("size", &self.size)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl ShellProcess {
    /// Spawn `launch` inside a PTY of the given size.
    pub fn spawn(launch: &ShellLaunch, size: ViewportSize) -> Result<Self, SpawnError> {
        if !launch.working_directory.is_dir() {
            return Err(SpawnError::WorkingDirMissing(
                launch.working_directory.clone(),
            ));
        }

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: size.rows(),
                cols: size.cols(),
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SpawnError::SpawnFailed(format!("failed to open PTY: {e}")))?;

        let cmd = launch.build_command();
        let child = pair.slave.spawn_command(cmd).map_err(|e| {
            SpawnError::SpawnFailed(format!("failed to spawn '{}': {e}", launch.program))
        })?;

        // Only the master side is needed from here on.
        drop(pair.slave);

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| SpawnError::SpawnFailed(format!("failed to take PTY writer: {e}")))?;

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| SpawnError::SpawnFailed(format!("failed to clone PTY reader: {e}")))?;

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        thread::Builder::new()
            .name("pty-reader".to_string())
            .spawn(move || {
                let mut buf = [0u8; PTY_READ_CHUNK];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => break, // EOF — shell exited
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break; // receiver dropped
                            }
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "PTY reader error");
                            break;
                        }
                    }
                }
            })
            .map_err(SpawnError::Io)?;

        tracing::info!(program = %launch.program, %size, "shell process spawned");

        Ok(Self {
            writer,
            output_rx: rx,
            child,
            master: pair.master,
            size,
            eof: false,
        })
    }

    /// Write raw bytes (keystrokes) to the shell's input.
    ///
    /// Best-effort: the process may exit between the caller's decision and
    /// this write, so failures are logged and swallowed.
    pub fn write(&mut self, data: &[u8]) {
        let result = self
            .writer
            .write_all(data)
            .and_then(|_| self.writer.flush());
        if let Err(e) = result {
            tracing::debug!(error = %e, "PTY write ignored (process gone)");
        }
    }

    /// Update the PTY window size. No-op once the process has exited.
    pub fn resize(&mut self, size: ViewportSize) {
        if self.eof {
            tracing::debug!(%size, "PTY resize ignored (process exited)");
            return;
        }
        match self.master.resize(PtySize {
            rows: size.rows(),
            cols: size.cols(),
            pixel_width: 0,
            pixel_height: 0,
        }) {
            Ok(()) => self.size = size,
            Err(e) => tracing::debug!(error = %e, "PTY resize failed"),
        }
    }

    /// The most recently applied viewport size.
    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Drain queued output chunks, in emission order, without blocking.
    ///
    /// Chunks are returned exactly as the reader produced them; callers
    /// relay them without splitting or merging. Hitting a disconnected
    /// channel here (reader thread done, everything consumed) marks EOF.
    pub fn drain_chunks(&mut self) -> Vec<Vec<u8>> {
        let mut chunks = Vec::new();
        loop {
            match self.output_rx.try_recv() {
                Ok(chunk) => chunks.push(chunk),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.eof = true;
                    break;
                }
            }
        }
        chunks
    }

    /// Whether all output has been consumed and the process is done.
    pub fn is_finished(&self) -> bool {
        self.eof
    }

    /// Returns `true` while the child process is running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Send a termination signal. Idempotent and fire-and-forget: the
    /// process may already be gone, and this does not wait for it to die.
    pub fn kill(&mut self) {
        if let Err(e) = self.child.kill() {
            tracing::debug!(error = %e, "PTY kill error (may already be dead)");
        }
    }

    /// Block until the child exits and return its exit code.
    pub fn wait_exit_code(&mut self) -> Option<u32> {
        match self.child.wait() {
            Ok(status) => Some(status.exit_code()),
            Err(e) => {
                tracing::debug!(error = %e, "PTY wait error");
                None
            }
        }
    }
}

impl Drop for ShellProcess {
    fn drop(&mut self) {
        // Closing the child ends the PTY pair, which unblocks the reader
        // thread; errors are ignored since the process may already be gone.
        let _ = self.child.kill();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
