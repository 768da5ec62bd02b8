//! Health report: a read-only snapshot of everything a run depends on.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::config::{Config, mask};
use crate::error::RemoteConfigError;
use crate::install::{expand_user, is_initialized};
use crate::restic::Restic;

/// Size of one backup path on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStats {
    pub files: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHealth {
    pub path: String,
    /// `None` when the path does not exist
    pub stats: Option<PathStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub restic_version: Result<String, String>,
    pub repository: PathBuf,
    pub repository_initialized: bool,
    pub masked_password: String,
    pub paths: Vec<PathHealth>,
    pub pushover_configured: bool,
    pub email_configured: bool,
    /// Pretty-printed remote document, or why it could not be fetched
    pub remote_document: Result<String, String>,
}

/// Count regular files and their total size below `path`
pub fn path_stats(path: &Path) -> Option<PathStats> {
    if !path.exists() {
        return None;
    }
    let mut stats = PathStats { files: 0, bytes: 0 };
    for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() {
            stats.files += 1;
            stats.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    Some(stats)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

impl HealthReport {
    /// `remote` is the document already fetched while resolving `config`
    pub async fn gather(
        restic: &Restic,
        config: &Config,
        remote: &Result<Map<String, Value>, RemoteConfigError>,
    ) -> Self {
        let restic_version = restic.version().await.map_err(|e| e.to_string());

        let repository = expand_user(&config.repository);
        let repository_initialized = is_initialized(&repository);

        let paths = config.paths.clone();
        let paths = tokio::task::spawn_blocking(move || {
            paths
                .into_iter()
                .map(|path| PathHealth {
                    stats: path_stats(Path::new(&path)),
                    path,
                })
                .collect::<Vec<_>>()
        })
        .await
        .unwrap_or_default();

        let remote_document = match remote {
            Ok(map) => serde_json::to_string_pretty(map).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        Self {
            restic_version,
            repository,
            repository_initialized,
            masked_password: mask(&config.password),
            paths,
            pushover_configured: config.notifications.pushover.is_configured(),
            email_configured: config.notifications.email.is_configured(),
            remote_document,
        }
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        lines.push(match &self.restic_version {
            Ok(version) => format!("restic version: {version}"),
            Err(e) => format!("restic version: unavailable ({e})"),
        });
        lines.push(format!(
            "repository: {} (initialized: {})",
            self.repository.display(),
            yes_no(self.repository_initialized)
        ));
        lines.push(format!("password: {}", self.masked_password));

        lines.push("paths:".to_string());
        for entry in &self.paths {
            lines.push(match entry.stats {
                Some(stats) => format!(" - {}: {} files, {} bytes", entry.path, stats.files, stats.bytes),
                None => format!(" - {}: missing", entry.path),
            });
        }

        lines.push(format!("pushover configured: {}", yes_no(self.pushover_configured)));
        lines.push(format!("email configured: {}", yes_no(self.email_configured)));

        lines.push(match &self.remote_document {
            Ok(document) => format!("remote configuration:\n{document}"),
            Err(e) => format!("remote configuration: unavailable ({e})"),
        });

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    fn report() -> HealthReport {
        HealthReport {
            restic_version: Ok("restic 0.9.6".into()),
            repository: PathBuf::from("/srv/repo"),
            repository_initialized: true,
            masked_password: "te***********".into(),
            paths: vec![
                PathHealth {
                    path: "/data".into(),
                    stats: Some(PathStats { files: 3, bytes: 42 }),
                },
                PathHealth {
                    path: "/gone".into(),
                    stats: None,
                },
            ],
            pushover_configured: false,
            email_configured: true,
            remote_document: Err("connection refused".into()),
        }
    }

    #[test]
    fn render_lists_every_section() {
        let text = report().render();

        assert!(text.contains("restic version: restic 0.9.6\n"));
        assert!(text.contains("repository: /srv/repo (initialized: yes)\n"));
        assert!(text.contains("password: te***********\n"));
        assert!(text.contains(" - /data: 3 files, 42 bytes\n"));
        assert!(text.contains(" - /gone: missing\n"));
        assert!(text.contains("pushover configured: no\n"));
        assert!(text.contains("email configured: yes\n"));
        assert!(text.contains("remote configuration: unavailable (connection refused)"));
    }

    #[test]
    fn stats_walk_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
        std::fs::write(dir.path().join("sub").join("b.txt"), "hello").unwrap();

        assert_eq!(path_stats(dir.path()), Some(PathStats { files: 2, bytes: 7 }));
        assert_eq!(path_stats(&dir.path().join("absent")), None);
    }

    #[tokio::test]
    async fn missing_restic_is_reported_not_fatal() {
        let remote = Err(RemoteConfigError::Network(NetworkError::Status {
            url: "https://paste/raw".into(),
            status: 404,
        }));
        let config = Config::defaults_for_home(None);

        let report = HealthReport::gather(&Restic::new("/nonexistent/restic"), &config, &remote).await;

        assert!(report.restic_version.is_err());
        assert!(report.remote_document.is_err());
        assert!(report.render().contains("restic version: unavailable"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn gather_collects_version_paths_and_remote_document() {
        use crate::restic::testing::fake_restic;

        let dir = tempfile::tempdir().unwrap();
        let restic = Restic::new(fake_restic(dir.path(), "echo restic 0.9.6"));
        let data = dir.path().join("data");
        std::fs::create_dir(&data).unwrap();
        std::fs::write(data.join("f.txt"), "hi").unwrap();

        let mut config = Config::defaults_for_home(None);
        config.paths = vec![data.to_string_lossy().into_owned()];

        let mut document = Map::new();
        document.insert("a".to_string(), Value::String("b".to_string()));

        let text = HealthReport::gather(&restic, &config, &Ok(document))
            .await
            .render();

        assert!(text.contains("restic version: restic 0.9.6"));
        assert!(text.contains("pushover configured: no"));
        assert!(text.contains("email configured: no"));
        assert!(text.contains("\"a\": \"b\""));
        assert!(text.contains(&format!(" - {}: 1 files, 2 bytes", data.display())));
    }
}
