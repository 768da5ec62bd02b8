//! Error taxonomy for provisioning, initialization and the thin I/O shims.
//!
//! Configuration sources never surface errors to callers; the cascade logs
//! them and moves on. Everything else here is propagated to `main`, which
//! decides what is fatal.

use std::path::PathBuf;

use thiserror::Error;

/// Transport-level failure talking to a remote endpoint.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Failure resolving the latest release asset.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("malformed release metadata from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("asset {asset} not found in release {tag}")]
    NotFound { asset: String, tag: String },
}

/// Failure turning an archive into an executable on disk.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decompress archive stream: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("failed to read zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("entry {entry} not found in archive (contains: {available})")]
    EntryNotFound { entry: String, available: String },
}

/// The restic binary could not be made ready.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("unsupported platform: {os} {arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: NetworkError,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Failure invoking the restic executable.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`restic {command}` exited with {status}")]
    Failed { command: String, status: String },
}

/// The repository could not be confirmed initialized.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to initialize repository {}: {source}", repository.display())]
    Tool {
        repository: PathBuf,
        #[source]
        source: ToolError,
    },
}

/// Failure during the confirmed backup run.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("no paths configured for backup")]
    NoPaths,

    #[error("failed to talk to the user: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("restic backup failed: {0}")]
    Tool(#[from] ToolError),
}

/// Failure delivering a notification on one channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("invalid mail address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("smtp delivery through {server} failed: {reason}")]
    Smtp { server: String, reason: String },
}

/// Failure registering the program to start at login.
#[derive(Debug, Error)]
pub enum AutostartError {
    #[error("could not determine the current executable: {0}")]
    Executable(#[source] std::io::Error),

    #[error("could not determine the {0} directory")]
    MissingDir(&'static str),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to generate launch agent: {0}")]
    Plist(String),

    #[error("`reg add` failed: {0}")]
    Registry(String),
}

/// Failure reading or writing the local configuration cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cache file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure fetching the remote configuration document.
#[derive(Debug, Error)]
pub enum RemoteConfigError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("malformed configuration document from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration document from {url} is not a JSON object")]
    NotAnObject { url: String },
}
