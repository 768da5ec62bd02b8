//! resticup: provisions restic, resolves where and what to back up, and runs
//! the backup.

pub mod autostart;
pub mod backup;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod install;
pub mod notify;
pub mod restic;
