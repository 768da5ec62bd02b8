//! Start-at-login registration for the current user.
//!
//! One mechanism per platform: an XDG autostart entry on Linux and other
//! Unix desktops, a LaunchAgent on macOS, a `Run` registry value on Windows.
//! Registration is idempotent; re-running rewrites the same entry.

#[cfg(all(unix, not(target_os = "macos")))]
mod desktop;
#[cfg(target_os = "macos")]
mod launch_agent;
#[cfg(windows)]
mod registry;

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::AutostartError;

/// Name shown to the session manager
pub const ENTRY_NAME: &str = "backup";

/// Where the entry ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    File(PathBuf),
    RegistryValue { key: &'static str, value: &'static str },
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::File(path) => write!(f, "{}", path.display()),
            Registration::RegistryValue { key, value } => write!(f, "{key}\\{value}"),
        }
    }
}

/// Absolute path of the running executable
pub fn current_executable() -> Result<PathBuf, AutostartError> {
    let exe = std::env::current_exe().map_err(AutostartError::Executable)?;
    std::path::absolute(&exe).map_err(AutostartError::Executable)
}

/// Register `exe` to run at login for the current user
pub fn register(exe: &Path) -> Result<Registration, AutostartError> {
    let registration = register_for_platform(exe)?;
    info!("Registered autostart entry at {registration}");
    Ok(registration)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn register_for_platform(exe: &Path) -> Result<Registration, AutostartError> {
    let config_dir = dirs::config_dir().ok_or(AutostartError::MissingDir("user config"))?;
    desktop::install(&config_dir, exe).map(Registration::File)
}

#[cfg(target_os = "macos")]
fn register_for_platform(exe: &Path) -> Result<Registration, AutostartError> {
    let home = dirs::home_dir().ok_or(AutostartError::MissingDir("home"))?;
    launch_agent::install(&home, exe).map(Registration::File)
}

#[cfg(windows)]
fn register_for_platform(exe: &Path) -> Result<Registration, AutostartError> {
    registry::install(exe)
}

/// Write through a sibling temp file so a crash never leaves half an entry
#[cfg_attr(windows, allow(dead_code))]
pub(crate) fn write_file_atomic(path: &Path, content: &[u8]) -> Result<(), AutostartError> {
    let io_error = |source| AutostartError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(content).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
    }
    fs::rename(&temp_path, path).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_existing_content_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("entry.desktop");

        write_file_atomic(&path, b"first").unwrap();
        write_file_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn registration_displays_its_location() {
        let file = Registration::File(PathBuf::from("/tmp/backup.desktop"));
        assert_eq!(file.to_string(), "/tmp/backup.desktop");

        let value = Registration::RegistryValue {
            key: r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run",
            value: "backup",
        };
        assert_eq!(
            value.to_string(),
            r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run\backup"
        );
    }
}
