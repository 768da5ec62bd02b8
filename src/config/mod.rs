//! Operating configuration and the cascade that resolves it.
//!
//! Sources in increasing precedence: embedded defaults, environment, remote
//! document, local cache file. See [`ConfigResolver`].

mod cache;
mod cascade;
mod env;
mod remote;

use std::fmt;
use std::path::Path;

pub use cache::{CACHE_FILE, CachedConfig, SCHEMA_VERSION, read_cache, write_cache};
pub use cascade::ConfigResolver;
pub use env::{EnvSource, PASSWORD_VAR, ProcessEnv, REPOSITORY_VAR};
pub use remote::{REMOTE_CONFIG_URL, RemoteDocument, fetch_remote_document};

const DEFAULT_REPOSITORY: &str = "~/tmp/test-backup";
const DEFAULT_PASSWORD: &str = "test password";
const DEFAULT_PATH_DIRS: &[&str] = &["Documents", "Pictures", "Desktop"];

/// Pushover push-notification credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PushoverCredentials {
    pub token: String,
    pub user: String,
}

impl PushoverCredentials {
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.user.is_empty()
    }
}

/// SMTP credentials and envelope
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EmailCredentials {
    /// `host` or `host:port`
    pub server: String,
    pub user: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl EmailCredentials {
    pub fn is_configured(&self) -> bool {
        [&self.server, &self.user, &self.password, &self.from, &self.to]
            .iter()
            .all(|f| !f.is_empty())
    }
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Notifications {
    pub pushover: PushoverCredentials,
    pub email: EmailCredentials,
}

/// The resolved operating parameters. Built once per process.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Path or backend URI, possibly `~/`-relative
    pub repository: String,
    pub password: String,
    pub paths: Vec<String>,
    pub notifications: Notifications,
}

impl Config {
    /// Built-in configuration used when no other source is available
    pub fn embedded_default() -> Self {
        Self::defaults_for_home(dirs::home_dir().as_deref())
    }

    pub(crate) fn defaults_for_home(home: Option<&Path>) -> Self {
        let home = home.unwrap_or(Path::new(""));
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            paths: DEFAULT_PATH_DIRS
                .iter()
                .map(|d| home.join(d).to_string_lossy().into_owned())
                .collect(),
            notifications: Notifications::default(),
        }
    }
}

/// Show only enough of a secret to tell two apart
pub fn mask(secret: &str) -> String {
    match secret.chars().count() {
        0 => String::new(),
        n if n <= 4 => "*".repeat(n),
        n => {
            let head: String = secret.chars().take(2).collect();
            format!("{head}{}", "*".repeat(n - 2))
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("repository", &self.repository)
            .field("password", &mask(&self.password))
            .field("paths", &self.paths)
            .field("notifications", &self.notifications)
            .finish()
    }
}

impl fmt::Debug for PushoverCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushoverCredentials")
            .field("token", &mask(&self.token))
            .field("user", &self.user)
            .finish()
    }
}

impl fmt::Debug for EmailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailCredentials")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &mask(&self.password))
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}
