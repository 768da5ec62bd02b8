use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "restic provisioning and backup runner")]
pub struct Args {
    /// Sub‑commands (run, health, etc.)
    #[command(subcommand)]
    pub sub: Option<Cmd>,

    /// Directory holding the restic executable
    #[arg(long, global = true, default_value = "bin")]
    pub bin_dir: PathBuf,

    /// Local configuration cache file
    #[arg(long, global = true, default_value = resticup::config::CACHE_FILE)]
    pub config_file: PathBuf,

    /// URL of the remote configuration document
    #[arg(long, global = true, default_value = resticup::config::REMOTE_CONFIG_URL)]
    pub config_url: String,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Cmd {
    /// Provision restic, confirm and back up (default if no sub‑command)
    Run {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        /// Do not register to start at login
        #[arg(long)]
        no_autostart: bool,
    },
    /// Print a diagnostic report and exit
    Health,
    /// Register to start at login and exit
    Autostart,
    /// Print the resolved configuration with secrets masked
    Config,
}

impl Default for Cmd {
    fn default() -> Self {
        Cmd::Run {
            yes: false,
            no_autostart: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_uses_defaults() {
        let args = Args::try_parse_from(["resticup"]).unwrap();

        assert_eq!(args.sub.unwrap_or_default(), Cmd::default());
        assert_eq!(args.bin_dir, PathBuf::from("bin"));
        assert_eq!(args.config_file, PathBuf::from("config.json"));
        assert_eq!(args.config_url, "https://pastebin.com/raw/example");
    }

    #[test]
    fn run_flags_and_global_options() {
        let args = Args::try_parse_from([
            "resticup",
            "run",
            "--yes",
            "--no-autostart",
            "--bin-dir",
            "/opt/restic",
        ])
        .unwrap();

        assert_eq!(
            args.sub,
            Some(Cmd::Run {
                yes: true,
                no_autostart: true
            })
        );
        assert_eq!(args.bin_dir, PathBuf::from("/opt/restic"));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["resticup", "restore"]).is_err());
    }
}
