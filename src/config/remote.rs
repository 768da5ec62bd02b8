//! Remote configuration document
//!
//! A small JSON object fetched over HTTP. Every field is optional and type
//! checked on its own: a field with the wrong type is skipped, the rest of the
//! document still applies.

use log::debug;
use serde_json::{Map, Value};

use super::Config;
use crate::error::RemoteConfigError;
use crate::http::HttpClient;

pub const REMOTE_CONFIG_URL: &str = "https://pastebin.com/raw/example";

/// The fields this crate understands, each `None` when absent or mistyped
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemoteDocument {
    pub repository: Option<String>,
    pub password: Option<String>,
    pub paths: Option<Vec<String>>,
    pub pushover_token: Option<String>,
    pub pushover_user: Option<String>,
    pub email_server: Option<String>,
    pub email_user: Option<String>,
    pub email_password: Option<String>,
    pub email_from: Option<String>,
    pub email_to: Option<String>,
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        other => {
            debug!("Ignoring remote field {key}: expected string, got {other}");
            None
        }
    }
}

fn paths_field(map: &Map<String, Value>) -> Option<Vec<String>> {
    let Value::Array(items) = map.get("paths")? else {
        debug!("Ignoring remote field paths: expected array");
        return None;
    };
    let paths: Vec<String> = items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    // An array with no usable entries must not wipe the configured paths
    (!paths.is_empty()).then_some(paths)
}

impl RemoteDocument {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            repository: string_field(map, "restic-repo"),
            password: string_field(map, "restic-repo-password"),
            paths: paths_field(map),
            pushover_token: string_field(map, "pushover-token"),
            pushover_user: string_field(map, "pushover-user"),
            email_server: string_field(map, "email-server"),
            email_user: string_field(map, "email-user"),
            email_password: string_field(map, "email-password"),
            email_from: string_field(map, "email-from"),
            email_to: string_field(map, "email-to"),
        }
    }

    /// Apply onto `config`. Repository and password are skipped when the
    /// matching environment variable was set.
    pub fn apply(&self, config: &mut Config, repository_from_env: bool, password_from_env: bool) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                target.clone_from(v);
            }
        }

        if !repository_from_env {
            set(&mut config.repository, &self.repository);
        }
        if !password_from_env {
            set(&mut config.password, &self.password);
        }
        if let Some(paths) = &self.paths {
            config.paths.clone_from(paths);
        }

        let pushover = &mut config.notifications.pushover;
        set(&mut pushover.token, &self.pushover_token);
        set(&mut pushover.user, &self.pushover_user);

        let email = &mut config.notifications.email;
        set(&mut email.server, &self.email_server);
        set(&mut email.user, &self.email_user);
        set(&mut email.password, &self.email_password);
        set(&mut email.from, &self.email_from);
        set(&mut email.to, &self.email_to);
    }
}

/// Fetch the raw document; must be a JSON object
pub async fn fetch_remote_document(
    http: &dyn HttpClient,
    url: &str,
) -> Result<Map<String, Value>, RemoteConfigError> {
    let body = http.get(url).await?;
    let value: Value = serde_json::from_slice(&body).map_err(|source| RemoteConfigError::Decode {
        url: url.to_string(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RemoteConfigError::NotAnObject {
            url: url.to_string(),
        }),
    }
}
