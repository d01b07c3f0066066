//! Shell process management: spawning an interactive shell inside a
//! pseudo-terminal and relaying bytes in and out of it.

pub mod pty;
pub mod shell;

pub use pty::{ShellLaunch, ShellProcess, SpawnError};
pub use shell::{default_shell, default_working_dir};
