//! Local configuration cache file
//!
//! Snapshot of repository, password and paths. Older files carry no
//! `version` key and are read as version 1; unknown keys are ignored.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Config;
use crate::error::CacheError;

pub const CACHE_FILE: &str = "config.json";
pub const SCHEMA_VERSION: u32 = 1;

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedConfig {
    #[serde(default = "schema_version")]
    pub version: u32,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

impl From<&Config> for CachedConfig {
    fn from(config: &Config) -> Self {
        Self {
            version: SCHEMA_VERSION,
            repo: config.repository.clone(),
            password: config.password.clone(),
            paths: config.paths.clone(),
        }
    }
}

impl CachedConfig {
    /// Override `config` with every non-empty field of the cache
    pub fn apply_to(&self, config: &mut Config) {
        if !self.repo.is_empty() {
            config.repository.clone_from(&self.repo);
        }
        if !self.password.is_empty() {
            config.password.clone_from(&self.password);
        }
        if !self.paths.is_empty() {
            config.paths.clone_from(&self.paths);
        }
    }
}

/// `Ok(None)` when the file does not exist
pub fn read_cache(path: &Path) -> Result<Option<CachedConfig>, CacheError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|source| CacheError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Plain write, not atomic: concurrent runs race and the last writer wins
pub fn write_cache(path: &Path, config: &Config) -> Result<(), CacheError> {
    let io_error = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let json = serde_json::to_string_pretty(&CachedConfig::from(config)).map_err(|source| {
        CacheError::Decode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, json).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_cache(&dir.path().join("config.json")).unwrap(), None);
    }

    #[test]
    fn legacy_file_without_version_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"repo":"filerepo","password":"filepass","paths":["/x"],"pushover-token":"old"}"#,
        )
        .unwrap();

        let cached = read_cache(&path).unwrap().unwrap();
        assert_eq!(cached.version, 1);
        assert_eq!(cached.repo, "filerepo");
        assert_eq!(cached.paths, vec!["/x"]);
    }

    #[test]
    fn empty_fields_do_not_clobber() {
        let mut config = Config::defaults_for_home(None);
        config.repository = "resolved".into();
        let cached = CachedConfig {
            version: 1,
            repo: String::new(),
            password: "filepass".into(),
            paths: vec![],
        };

        cached.apply_to(&mut config);

        assert_eq!(config.repository, "resolved");
        assert_eq!(config.password, "filepass");
        assert_eq!(config.paths, Config::defaults_for_home(None).paths);
    }

    #[test]
    fn written_file_holds_only_the_persisted_subset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::defaults_for_home(None);
        config.notifications.pushover.token = "secret-token".into();

        write_cache(&path, &config).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("secret-token"));
        assert!(raw.contains("\"version\": 1"));
        assert_eq!(read_cache(&path).unwrap(), Some(CachedConfig::from(&config)));
    }
}
