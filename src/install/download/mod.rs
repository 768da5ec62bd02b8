//! GitHub release download and archive extraction
//!
//! This module handles downloading the platform-specific restic archive from
//! GitHub releases and extracting the executable.
//!
//! ## Module Organization
//!
//! - `platform` - Platform detection and archive format selection
//! - `github` - GitHub API interaction for release discovery
//! - `extract` - bzip2 stream and zip container extraction
//! - `core` - Present/absent state machine and download orchestration

mod core;
mod extract;
mod github;
mod platform;

// Re-export public API
pub use core::{ProvisionOutcome, Provisioner, TOOL_NAME};
pub use extract::extract;
pub use github::{
    GitHubAsset, GitHubRelease, RESTIC_LATEST_RELEASE_URL, ReleaseResolver, ResolvedAsset,
    asset_name, select_asset,
};
pub use platform::{ArchiveFormat, Platform};
