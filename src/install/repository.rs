//! Repository initialization
//!
//! A restic repository is considered initialized once its `config` marker
//! exists. Anything else is handed to `restic init`.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::InitError;
use crate::restic::Restic;

/// File restic writes into a repository on successful `init`
pub const MARKER_FILE: &str = "config";

/// What `ensure_repository` had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    AlreadyInitialized,
    Initialized,
}

/// Expand a leading `~` to the user's home directory
pub fn expand_user(path: &str) -> PathBuf {
    expand_user_in(path, dirs::home_dir().as_deref())
}

pub(crate) fn expand_user_in(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Whether the marker file exists inside `repository`
pub fn is_initialized(repository: &Path) -> bool {
    repository.join(MARKER_FILE).is_file()
}

/// Initialize `repository` unless it already carries the marker file
pub async fn ensure_repository(
    restic: &Restic,
    repository: &str,
    password: &str,
) -> Result<InitOutcome, InitError> {
    let repository = expand_user(repository);

    if is_initialized(&repository) {
        info!("restic repository found at {}", repository.display());
        return Ok(InitOutcome::AlreadyInitialized);
    }

    info!("Initializing restic repository at {}", repository.display());
    restic
        .init(&repository, password)
        .await
        .map_err(|source| InitError::Tool {
            repository: repository.clone(),
            source,
        })?;
    Ok(InitOutcome::Initialized)
}
