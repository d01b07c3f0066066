//! Shell and working-directory detection.

use std::path::PathBuf;

/// Get the user's default shell.
///
/// - Windows: `powershell.exe`
/// - Elsewhere: `$SHELL`, falling back to `/bin/bash`
pub fn default_shell() -> String {
    #[cfg(windows)]
    {
        "powershell.exe".to_string()
    }
    #[cfg(not(windows))]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string())
    }
}

/// Default working directory for a new shell: the user's home directory.
pub fn default_working_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
