//! Installation state detection
//!
//! The provisioner only distinguishes two states. A binary that exists but is
//! corrupt counts as present until running it fails.

use std::path::Path;

/// Installation state enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryState {
    /// Nothing at the expected path, download required
    Absent,
    /// Something is there, ask it to update itself
    Present,
}

/// Check whether the restic executable exists at `path`
pub async fn check_binary_state(path: &Path) -> BinaryState {
    match tokio::fs::try_exists(path).await {
        Ok(true) => BinaryState::Present,
        Ok(false) => BinaryState::Absent,
        Err(e) => {
            // Unreadable parent directories surface later as a write failure
            log::warn!("Failed to check {}: {}", path.display(), e);
            BinaryState::Absent
        }
    }
}

/// Default location of the managed binary: `<bin_dir>/restic[.exe]`
pub fn executable_path(bin_dir: &Path, executable_name: &str) -> std::path::PathBuf {
    bin_dir.join(executable_name)
}
