//! Binary download and provisioning orchestration

use std::path::Path;
use std::sync::Arc;

use log::info;

use super::extract::extract;
use super::github::ReleaseResolver;
use super::platform::Platform;
use crate::error::ProvisionError;
use crate::http::HttpClient;
use crate::install::detection::{BinaryState, check_binary_state};
use crate::restic::Restic;

pub const TOOL_NAME: &str = "restic";

/// What `Provisioner::ensure` had to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Binary was missing and the latest release was installed
    Downloaded { version: String },
    /// Binary was present and `self-update` succeeded
    Updated,
}

/// Makes sure a working restic binary exists at a path.
///
/// No retries: every failure is returned to the caller, which treats it as
/// fatal.
pub struct Provisioner {
    http: Arc<dyn HttpClient>,
    resolver: ReleaseResolver,
    platform: Platform,
}

impl Provisioner {
    pub fn new(http: Arc<dyn HttpClient>, platform: Platform) -> Self {
        Self {
            resolver: ReleaseResolver::new(Arc::clone(&http)),
            http,
            platform,
        }
    }

    pub fn with_release_url(mut self, url: impl Into<String>) -> Self {
        self.resolver = self.resolver.with_url(url);
        self
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Absent → download latest release; Present → `restic self-update`
    pub async fn ensure(&self, executable: &Path) -> Result<ProvisionOutcome, ProvisionError> {
        match check_binary_state(executable).await {
            BinaryState::Absent => {
                info!("{} not found, downloading latest release...", TOOL_NAME);
                let version = self.download(executable).await?;
                info!("{} {} downloaded to {}", TOOL_NAME, version, executable.display());
                Ok(ProvisionOutcome::Downloaded { version })
            }
            BinaryState::Present => {
                info!("{} found, performing self-update...", TOOL_NAME);
                Restic::new(executable).self_update().await?;
                Ok(ProvisionOutcome::Updated)
            }
        }
    }

    /// Download the platform asset and extract it to `executable`
    async fn download(&self, executable: &Path) -> Result<String, ProvisionError> {
        let asset = self.resolver.latest_asset(&self.platform).await?;
        info!("Downloading {} ({})", asset.name, asset.url);

        let archive = self
            .http
            .get(&asset.url)
            .await
            .map_err(|source| ProvisionError::Download {
                url: asset.url.clone(),
                source,
            })?;

        let format = self.platform.archive_format();
        let entry = self.platform.executable_name(TOOL_NAME);
        let destination = executable.to_path_buf();

        // Wrap CPU-bound decompression in spawn_blocking
        tokio::task::spawn_blocking(move || extract(&archive, format, &entry, &destination))
            .await??;

        Ok(asset.version)
    }
}
