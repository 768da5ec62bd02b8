//! restic provisioning
//!
//! Everything needed before a backup can run: a working restic binary at a
//! known path and an initialized repository.
//!
//! # Behavior
//! - binary absent → download the latest release for this platform
//! - binary present → `restic self-update`
//! - repository marker absent → `restic init`

mod detection;
pub mod download;
mod repository;

pub use detection::{BinaryState, check_binary_state, executable_path};
pub use download::{Platform, ProvisionOutcome, Provisioner, TOOL_NAME};
pub use repository::{InitOutcome, MARKER_FILE, ensure_repository, expand_user, is_initialized};
