//! Confirmed backup run
//!
//! Shows what will be backed up, asks once, then hands over to
//! `restic backup`.

use std::io::{BufRead, Write};

use log::info;

use crate::config::Config;
use crate::error::BackupError;
use crate::install::expand_user;
use crate::restic::Restic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    /// The user declined; restic was not started
    Aborted,
    Completed,
}

/// Whether the answer to the prompt means "go ahead"
pub fn is_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Prompt on `output`, read the answer from `input`, and run the backup.
///
/// With `assume_yes` the prompt is skipped.
pub async fn run_backup(
    restic: &Restic,
    config: &Config,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    assume_yes: bool,
) -> Result<BackupOutcome, BackupError> {
    if config.paths.is_empty() {
        return Err(BackupError::NoPaths);
    }

    writeln!(output, "paths to backup:").map_err(BackupError::Prompt)?;
    for path in &config.paths {
        writeln!(output, " - {path}").map_err(BackupError::Prompt)?;
    }

    if !assume_yes {
        write!(output, "proceed with backup? [y/N]: ").map_err(BackupError::Prompt)?;
        output.flush().map_err(BackupError::Prompt)?;

        let mut answer = String::new();
        input.read_line(&mut answer).map_err(BackupError::Prompt)?;
        if !is_confirmation(&answer) {
            writeln!(output, "backup aborted").map_err(BackupError::Prompt)?;
            info!("Backup aborted by user");
            return Ok(BackupOutcome::Aborted);
        }
    }

    let repository = expand_user(&config.repository);
    info!("Starting backup of {} paths to {}", config.paths.len(), repository.display());
    restic
        .backup(&repository, &config.password, &config.paths, output)
        .await?;

    writeln!(output, "backup completed").map_err(BackupError::Prompt)?;
    Ok(BackupOutcome::Completed)
}
