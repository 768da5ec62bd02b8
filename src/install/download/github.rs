//! GitHub release API interaction

use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use super::platform::Platform;
use crate::error::ReleaseError;
use crate::http::HttpClient;

pub const RESTIC_LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/restic/restic/releases/latest";

/// GitHub release metadata from API
#[derive(Deserialize, Debug)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

/// GitHub release asset metadata
#[derive(Deserialize, Debug)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// The asset picked for this platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub version: String,
    pub name: String,
    pub url: String,
}

/// Expected asset file name: `{tool}_{version}_{os}_{arch}{ext}`
pub fn asset_name(tool: &str, version: &str, platform: &Platform) -> String {
    format!(
        "{}_{}_{}_{}{}",
        tool,
        version,
        platform.os,
        platform.arch,
        platform.archive_format().extension()
    )
}

/// Picks the restic asset for a platform out of the latest release.
pub struct ReleaseResolver {
    http: Arc<dyn HttpClient>,
    url: String,
    tool: String,
}

impl ReleaseResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            url: RESTIC_LATEST_RELEASE_URL.to_string(),
            tool: "restic".to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Fetch latest release metadata
    pub async fn latest_release(&self) -> Result<GitHubRelease, ReleaseError> {
        let body = self.http.get(&self.url).await?;
        serde_json::from_slice(&body).map_err(|source| ReleaseError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    /// Resolve the version and download URL for `platform`
    pub async fn latest_asset(&self, platform: &Platform) -> Result<ResolvedAsset, ReleaseError> {
        let release = self.latest_release().await?;
        select_asset(&self.tool, &release, platform)
    }
}

/// First asset whose name matches exactly wins
pub fn select_asset(
    tool: &str,
    release: &GitHubRelease,
    platform: &Platform,
) -> Result<ResolvedAsset, ReleaseError> {
    let version = release
        .tag_name
        .strip_prefix('v')
        .unwrap_or(&release.tag_name);
    let wanted = asset_name(tool, version, platform);
    debug!("Looking for asset {} in release {}", wanted, release.tag_name);

    release
        .assets
        .iter()
        .find(|a| a.name == wanted)
        .map(|a| ResolvedAsset {
            version: version.to_string(),
            name: a.name.clone(),
            url: a.browser_download_url.clone(),
        })
        .ok_or_else(|| ReleaseError::NotFound {
            asset: wanted,
            tag: release.tag_name.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::http::MockHttpClient;

    fn release_json(tag: &str, assets: &[(&str, &str)]) -> Vec<u8> {
        let assets: Vec<_> = assets
            .iter()
            .map(|(n, u)| serde_json::json!({"name": n, "browser_download_url": u, "size": 1}))
            .collect();
        serde_json::to_vec(&serde_json::json!({"tag_name": tag, "assets": assets})).unwrap()
    }

    #[test]
    fn builds_asset_names_per_platform() {
        let linux = Platform::new("linux", "amd64");
        let windows = Platform::new("windows", "amd64");
        assert_eq!(asset_name("restic", "1.0.0", &linux), "restic_1.0.0_linux_amd64.bz2");
        assert_eq!(asset_name("restic", "1.0.0", &windows), "restic_1.0.0_windows_amd64.zip");
    }

    #[tokio::test]
    async fn selects_exact_match_and_strips_prefix() {
        let mut http = MockHttpClient::new();
        let body = release_json(
            "v1.0.0",
            &[
                ("restic_1.0.0_linux_amd64.bz2.sig", "https://dl/sig"),
                ("restic_1.0.0_darwin_arm64.bz2", "https://dl/darwin"),
                ("restic_1.0.0_linux_amd64.bz2", "https://dl/linux"),
                ("restic_1.0.0_linux_amd64.bz2", "https://dl/duplicate"),
            ],
        );
        http.expect_get()
            .withf(|url| url == RESTIC_LATEST_RELEASE_URL)
            .times(1)
            .returning(move |_| Ok(body.clone()));

        let resolver = ReleaseResolver::new(Arc::new(http));
        let asset = resolver
            .latest_asset(&Platform::new("linux", "amd64"))
            .await
            .unwrap();

        assert_eq!(asset.version, "1.0.0");
        assert_eq!(asset.name, "restic_1.0.0_linux_amd64.bz2");
        assert_eq!(asset.url, "https://dl/linux");
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        let mut http = MockHttpClient::new();
        let body = release_json("v1.0.0", &[("restic_1.0.0_linux_amd64.bz2", "https://dl/linux")]);
        http.expect_get().returning(move |_| Ok(body.clone()));

        let resolver = ReleaseResolver::new(Arc::new(http));
        let err = resolver
            .latest_asset(&Platform::new("windows", "amd64"))
            .await
            .unwrap_err();

        match err {
            ReleaseError::NotFound { asset, tag } => {
                assert_eq!(asset, "restic_1.0.0_windows_amd64.zip");
                assert_eq!(tag, "v1.0.0");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_metadata_is_decode_error() {
        let mut http = MockHttpClient::new();
        http.expect_get().returning(|_| Ok(b"<html>rate limited</html>".to_vec()));

        let resolver = ReleaseResolver::new(Arc::new(http));
        let err = resolver
            .latest_asset(&Platform::new("linux", "amd64"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Decode { .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let mut http = MockHttpClient::new();
        http.expect_get().returning(|url| {
            Err(NetworkError::Status {
                url: url.to_string(),
                status: 403,
            })
        });

        let resolver = ReleaseResolver::new(Arc::new(http));
        let err = resolver
            .latest_asset(&Platform::new("linux", "amd64"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Network(NetworkError::Status { status: 403, .. })));
    }
}
