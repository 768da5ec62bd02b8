mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use resticup::autostart;
use resticup::backup::{BackupOutcome, run_backup};
use resticup::config::{Config, ConfigResolver, mask};
use resticup::health::HealthReport;
use resticup::http::{HttpClient, ReqwestClient};
use resticup::install::{Platform, Provisioner, TOOL_NAME, ensure_repository, executable_path};
use resticup::notify::{Notifier, SmtpMailer};
use resticup::restic::Restic;

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(real_main()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<()> {
    let args = cli::Args::parse();
    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestClient::new().context("Failed to build HTTP client")?);
    let resolver = ConfigResolver::new(Arc::clone(&http))
        .with_remote_url(&args.config_url)
        .with_cache_path(&args.config_file);

    match args.sub.unwrap_or_default() {
        cli::Cmd::Run { yes, no_autostart } => {
            if !no_autostart {
                register_autostart();
            }
            run(http, &resolver, &args.bin_dir, yes).await
        }
        cli::Cmd::Health => {
            let restic = Restic::new(restic_path(&args.bin_dir)?);
            let (config, document) = resolver.resolve_with_document().await;
            let report = HealthReport::gather(&restic, &config, &document).await;
            print!("{}", report.render());
            Ok(())
        }
        cli::Cmd::Autostart => {
            let exe = autostart::current_executable()?;
            let registration = autostart::register(&exe)?;
            println!("autostart registered: {registration}");
            Ok(())
        }
        cli::Cmd::Config => {
            let config = resolver.resolve().await;
            println!("{config:#?}");
            Ok(())
        }
    }
}

fn restic_path(bin_dir: &Path) -> Result<PathBuf> {
    let platform = Platform::detect()?;
    Ok(executable_path(bin_dir, &platform.executable_name(TOOL_NAME)))
}

/// Failure here never stops a backup
fn register_autostart() {
    match autostart::current_executable().and_then(|exe| autostart::register(&exe)) {
        Ok(registration) => info!("Autostart entry: {registration}"),
        Err(e) => warn!("auto-start: {e}"),
    }
}

async fn run(http: Arc<dyn HttpClient>, resolver: &ConfigResolver, bin_dir: &Path, assume_yes: bool) -> Result<()> {
    let platform = Platform::detect()?;
    let exe = executable_path(bin_dir, &platform.executable_name(TOOL_NAME));
    let outcome = Provisioner::new(Arc::clone(&http), platform)
        .ensure(&exe)
        .await
        .context("Failed to provision restic")?;
    info!("Provisioning finished: {outcome:?}");

    let config = resolver.resolve().await;
    println!("repository: {}", config.repository);
    println!("password: {}", mask(&config.password));

    let restic = Restic::new(&exe);
    ensure_repository(&restic, &config.repository, &config.password)
        .await
        .context("Failed to ensure repository")?;

    let notifier = Notifier::new(http, Arc::new(SmtpMailer));
    let result = {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        run_backup(&restic, &config, &mut stdin.lock(), &mut stdout.lock(), assume_yes).await
    };

    match result {
        Ok(BackupOutcome::Aborted) => Ok(()),
        Ok(BackupOutcome::Completed) => {
            let body = summary(&config, "completed successfully");
            notifier.notify(&config.notifications, "backup completed", &body).await;
            Ok(())
        }
        Err(e) => {
            let body = summary(&config, &format!("failed: {e}"));
            notifier.notify(&config.notifications, "backup failed", &body).await;
            Err(e.into())
        }
    }
}

fn summary(config: &Config, result: &str) -> String {
    format!(
        "Backup of {} paths to {} {result}.",
        config.paths.len(),
        config.repository
    )
}
