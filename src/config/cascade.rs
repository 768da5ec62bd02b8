//! Configuration cascade
//!
//! defaults → environment → remote document → local cache file, highest
//! last. No source can fail the cascade: every error is logged and the next
//! source proceeds with what has been resolved so far.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use serde_json::{Map, Value};

use super::cache::{CACHE_FILE, read_cache, write_cache};
use super::env::{EnvSource, PASSWORD_VAR, ProcessEnv, REPOSITORY_VAR};
use super::remote::{REMOTE_CONFIG_URL, RemoteDocument, fetch_remote_document};
use super::{Config, mask};
use crate::error::RemoteConfigError;
use crate::http::HttpClient;

/// Which of the two environment variables were present
#[derive(Debug, Default, Clone, Copy)]
struct EnvFlags {
    repository: bool,
    password: bool,
}

impl EnvFlags {
    fn both(self) -> bool {
        self.repository && self.password
    }
}

pub struct ConfigResolver {
    http: Arc<dyn HttpClient>,
    env: Box<dyn EnvSource>,
    remote_url: String,
    cache_path: PathBuf,
    defaults: Config,
}

impl ConfigResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            env: Box::new(ProcessEnv),
            remote_url: REMOTE_CONFIG_URL.to_string(),
            cache_path: PathBuf::from(CACHE_FILE),
            defaults: Config::embedded_default(),
        }
    }

    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = url.into();
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_defaults(mut self, defaults: Config) -> Self {
        self.defaults = defaults;
        self
    }

    /// Merge every source into the effective configuration
    pub async fn resolve(&self) -> Config {
        let (mut config, env_flags) = self.apply_env();
        if env_flags.both() {
            info!("Repository and password set in environment, skipping remote configuration");
        } else {
            let document = self.fetch_remote().await;
            self.apply_remote(&mut config, env_flags, document.as_ref());
        }
        self.finish(config)
    }

    /// Like [`resolve`](Self::resolve), but always fetches the remote document
    /// and hands it back so callers can show it without a second request
    pub async fn resolve_with_document(
        &self,
    ) -> (Config, Result<Map<String, Value>, RemoteConfigError>) {
        let (mut config, env_flags) = self.apply_env();
        let document = self.fetch_remote().await;
        if !env_flags.both() {
            self.apply_remote(&mut config, env_flags, document.as_ref());
        }
        (self.finish(config), document)
    }

    fn apply_env(&self) -> (Config, EnvFlags) {
        let mut config = self.defaults.clone();
        let mut flags = EnvFlags::default();

        if let Some(repository) = self.env.var(REPOSITORY_VAR) {
            info!("Using repository from {REPOSITORY_VAR}");
            config.repository = repository;
            flags.repository = true;
        }
        if let Some(password) = self.env.var(PASSWORD_VAR) {
            info!("Using password from {PASSWORD_VAR}");
            config.password = password;
            flags.password = true;
        }
        (config, flags)
    }

    async fn fetch_remote(&self) -> Result<Map<String, Value>, RemoteConfigError> {
        let document = fetch_remote_document(self.http.as_ref(), &self.remote_url).await;
        match &document {
            Ok(_) => info!("Remote configuration fetched from {}", self.remote_url),
            Err(e) => warn!("Failed to fetch remote configuration: {e}"),
        }
        document
    }

    fn apply_remote(
        &self,
        config: &mut Config,
        env_flags: EnvFlags,
        document: Result<&Map<String, Value>, &RemoteConfigError>,
    ) {
        if let Ok(map) = document {
            RemoteDocument::from_map(map).apply(config, env_flags.repository, env_flags.password);
        }
    }

    fn finish(&self, mut config: Config) -> Config {
        self.apply_cache(&mut config);
        info!(
            "Resolved configuration: repository={} password={} paths={}",
            config.repository,
            mask(&config.password),
            config.paths.len()
        );
        config
    }

    fn apply_cache(&self, config: &mut Config) {
        match read_cache(&self.cache_path) {
            Ok(Some(cached)) => {
                info!("Applying cached configuration from {}", self.cache_path.display());
                cached.apply_to(config);
            }
            Ok(None) => match write_cache(&self.cache_path, config) {
                Ok(()) => info!("Wrote configuration cache to {}", self.cache_path.display()),
                // Best-effort: the run proceeds without a cache
                Err(e) => warn!("Failed to write configuration cache: {e}"),
            },
            // Leave an unreadable file alone rather than overwrite it
            Err(e) => warn!("Ignoring configuration cache: {e}"),
        }
    }
}
