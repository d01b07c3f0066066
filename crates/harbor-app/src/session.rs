//! The terminal session bridge.
//!
//! [`SessionBridge`] owns at most one shell process and mediates all
//! traffic between it and the renderer: output chunks flow out through the
//! broadcaster, input and resize flow in from the dispatch layer. The
//! bridge is single-threaded (the drive loop in `main` is the only
//! caller) and none of its operations block.
//!
//! States are `Idle` (no session) and `Active` (one live process),
//! realized as an `Option`: the process handle exists exactly while a
//! session does, and nothing outside this type touches it.

use std::path::PathBuf;

use harbor_common::ViewportSize;
use harbor_config::HarborConfig;
use harbor_terminal::{ShellLaunch, ShellProcess, SpawnError};

use crate::broadcast::Broadcaster;
use crate::protocol::ServerMessage;

/// An active session: the exclusively-owned process handle.
struct Session {
    process: ShellProcess,
}

pub struct SessionBridge {
    session: Option<Session>,
    launch: ShellLaunch,
    /// Size for the next spawn; updated by `terminal_ready` and by resizes
    /// applied while a session is active.
    viewport: ViewportSize,
    sink: Broadcaster,
}

impl SessionBridge {
    pub fn new(launch: ShellLaunch, viewport: ViewportSize, sink: Broadcaster) -> Self {
        Self {
            session: None,
            launch,
            viewport,
            sink,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Record the renderer's viewport for the next spawn.
    pub fn set_viewport(&mut self, size: ViewportSize) {
        self.viewport = size;
    }

    /// Spawn the shell and go Active.
    ///
    /// Calling this while already Active terminates the previous session
    /// first: the renderer sends `terminal_ready` on every (re)load, and a
    /// lingering shell from before the reload must not leak. On failure the
    /// bridge is left Idle.
    pub fn start_session(&mut self) -> Result<(), SpawnError> {
        if self.session.is_some() {
            tracing::info!("replacing active session");
            self.end_session();
        }

        let process = ShellProcess::spawn(&self.launch, self.viewport)?;
        self.session = Some(Session { process });
        tracing::info!(viewport = %self.viewport, "session started");
        Ok(())
    }

    /// Write renderer keystrokes to the shell. No-op while Idle, since
    /// input can legitimately race the end of a session.
    pub fn forward_input(&mut self, data: &[u8]) {
        match self.session.as_mut() {
            Some(session) => session.process.write(data),
            None => tracing::trace!(len = data.len(), "input while idle ignored"),
        }
    }

    /// Apply a viewport change to the shell. No-op while Idle.
    pub fn forward_resize(&mut self, size: ViewportSize) {
        match self.session.as_mut() {
            Some(session) => {
                session.process.resize(size);
                self.viewport = size;
            }
            None => tracing::trace!(%size, "resize while idle ignored"),
        }
    }

    /// Terminate the session and go Idle. Idempotent; fire-and-forget from
    /// the caller's perspective (the kill signal is sent, the reap happens
    /// here so no zombie outlives the bridge).
    pub fn end_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.process.kill();
            let code = session.process.wait_exit_code();
            tracing::info!(?code, "session ended");
        }
    }

    /// Pump the bridge: relay queued output chunks to the sink in emission
    /// order (one message per chunk), then reap the process if it exited on
    /// its own. Called from the drive loop tick.
    pub fn poll(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        for chunk in session.process.drain_chunks() {
            self.sink.send(ServerMessage::TerminalOutput { data: chunk });
        }

        if session.process.is_finished() {
            if let Some(mut session) = self.session.take() {
                let code = session.process.wait_exit_code().unwrap_or(0);
                tracing::info!(code, "shell process exited");
                self.sink.send(ServerMessage::SessionExit { code });
            }
        }
    }

    #[cfg(test)]
    fn session_size(&self) -> Option<ViewportSize> {
        self.session.as_ref().map(|s| s.process.size())
    }
}

/// Build the shell launch from config, falling back to platform defaults
/// for anything unset.
pub fn launch_from_config(config: &HarborConfig) -> ShellLaunch {
    let program = if config.shell.program.is_empty() {
        harbor_terminal::default_shell()
    } else {
        config.shell.program.clone()
    };
    let working_directory = config
        .shell
        .working_directory
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(harbor_terminal::default_working_dir);

    ShellLaunch {
        program,
        args: config.shell.args.clone(),
        working_directory,
        env: config
            .shell
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        term: config.terminal.term.clone(),
        login_shell: config.shell.login_shell,
    }
}

/// Initial viewport from config, falling back to 80x24 on nonsense values
/// (validation already warned about them).
pub fn viewport_from_config(config: &HarborConfig) -> ViewportSize {
    ViewportSize::new(config.terminal.cols, config.terminal.rows).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
