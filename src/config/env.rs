//! Environment variable source

use std::collections::HashMap;

pub const REPOSITORY_VAR: &str = "RESTIC-REPO";
pub const PASSWORD_VAR: &str = "RESTIC-REPO-PASSWORD";

/// Lookup of environment variables.
///
/// `Some("")` means the variable is set but empty, which still counts as set.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
