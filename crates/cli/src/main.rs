//! medialib CLI
//!
//! Operational tool for the media library: uploads library files to an
//! S3-compatible object store and records the resulting locators, and
//! prints library statistics.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medialib_core::{
    load_config, validate_config, Config, Library, RemoteConfig, S3RemoteStore, SyncConfig,
    SyncEngine, SyncError, SyncOptions, SyncReport,
};

#[derive(Parser)]
#[command(name = "medialib")]
#[command(about = "Sync a local media library to remote object storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Remote store identity. Required unless supplied via --config.
#[derive(Args, Clone)]
struct RemoteArgs {
    /// Storage account id (determines endpoint and default public domain)
    #[arg(long)]
    account_id: Option<String>,

    /// Access key id
    #[arg(long)]
    access_key_id: Option<String>,

    /// Secret access key
    #[arg(long)]
    secret_access_key: Option<String>,

    /// Bucket name
    #[arg(long)]
    bucket: Option<String>,

    /// Custom public domain for generated locators
    #[arg(long)]
    public_domain: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload library files to the remote store and record locators
    Sync {
        /// TOML config file with [remote] and [sync] sections; flags
        /// override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        remote: RemoteArgs,

        /// Library file to sync (default: library.json)
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Where to write the updated library (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Concurrent upload workers (default: 4)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Re-sync entries that already have a remote locator
        #[arg(long)]
        force: bool,

        /// Skip the remote existence pre-check and upload unconditionally
        #[arg(long)]
        no_check_remote: bool,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print library statistics
    Stats {
        /// Library file
        #[arg(short, long, default_value = "library.json")]
        library: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Sync {
            config,
            remote,
            library,
            output,
            workers,
            force,
            no_check_remote,
            json,
        } => {
            let config = resolve_config(config, remote, library, output, workers)?;
            validate_config(&config).context("Configuration validation failed")?;
            run_sync(config, force, no_check_remote, json).await
        }
        Commands::Stats { library } => {
            run_stats(&library);
            Ok(0)
        }
    }
}

/// Merge config file (if any) and CLI flags; flags win.
fn resolve_config(
    config_path: Option<PathBuf>,
    remote: RemoteArgs,
    library: Option<PathBuf>,
    output: Option<PathBuf>,
    workers: Option<usize>,
) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => load_config(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let missing = |flag: &str| format!("missing --{} (or provide --config)", flag);
            Config {
                remote: RemoteConfig {
                    account_id: remote.account_id.clone().context(missing("account-id"))?,
                    access_key_id: remote
                        .access_key_id
                        .clone()
                        .context(missing("access-key-id"))?,
                    secret_access_key: remote
                        .secret_access_key
                        .clone()
                        .context(missing("secret-access-key"))?,
                    bucket: remote.bucket.clone().context(missing("bucket"))?,
                    public_domain: None,
                    region: "auto".to_string(),
                    timeout_secs: 300,
                },
                sync: SyncConfig::default(),
            }
        }
    };

    if let Some(account_id) = remote.account_id {
        config.remote.account_id = account_id;
    }
    if let Some(access_key_id) = remote.access_key_id {
        config.remote.access_key_id = access_key_id;
    }
    if let Some(secret_access_key) = remote.secret_access_key {
        config.remote.secret_access_key = secret_access_key;
    }
    if let Some(bucket) = remote.bucket {
        config.remote.bucket = bucket;
    }
    if let Some(public_domain) = remote.public_domain {
        config.remote.public_domain = Some(public_domain);
    }
    if let Some(library) = library {
        config.sync.library_path = library;
    }
    if let Some(output) = output {
        config.sync.output_path = Some(output);
    }
    if let Some(workers) = workers {
        config.sync.workers = workers;
    }

    Ok(config)
}

async fn run_sync(config: Config, force: bool, no_check_remote: bool, json: bool) -> Result<i32> {
    let options = SyncOptions {
        workers: config.sync.workers,
        skip_existing: config.sync.skip_existing && !force,
        check_remote_exists: config.sync.check_remote_exists && !no_check_remote,
        output_path: config.sync.output_path.clone(),
    };
    let library_path = config.sync.library_path.clone();

    let remote = Arc::new(S3RemoteStore::new(config.remote));
    let engine = SyncEngine::new(remote, options);

    let report = match engine.run(&library_path).await {
        Ok(report) => report,
        Err(SyncError::LibraryNotFound(path)) => {
            bail!("Library file not found: {}", path.display());
        }
        Err(e) => return Err(e).context("Sync run failed"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.is_clean() { 0 } else { 1 })
}

fn print_report(report: &SyncReport) {
    println!("{}", "=".repeat(60));
    println!("SYNC SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Total videos:        {}", report.total);
    println!("Skipped (in lib):    {}", report.skipped);
    println!("Already on remote:   {}", report.already_remote);
    println!("Newly uploaded:      {}", report.uploaded);
    println!("Failed:              {}", report.failed());
    println!("Library updated:     {}", report.output_path.display());

    if !report.failures.is_empty() {
        println!("\nErrors:");
        for failure in &report.failures {
            println!("  - {}: {}", failure.title, failure.reason);
        }
    }
}

fn run_stats(library_path: &PathBuf) {
    let library = Library::open(library_path);
    let stats = library.stats();

    println!("Library:          {}", stats.library_path.display());
    println!("Total videos:     {}", stats.total_videos);
    println!(
        "Total duration:   {}s ({} hours)",
        stats.total_duration_seconds, stats.total_duration_hours
    );
    println!("Unique authors:   {}", stats.unique_authors);
    if let Some(last_sync) = library.last_sync() {
        println!("Last remote sync: {}", last_sync.to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::parse_from([
            "medialib",
            "sync",
            "--account-id",
            "acct",
            "--access-key-id",
            "key",
            "--secret-access-key",
            "secret",
            "--bucket",
            "videos",
            "--workers",
            "8",
            "--force",
        ]);

        let Commands::Sync {
            remote,
            workers,
            force,
            no_check_remote,
            ..
        } = cli.command
        else {
            panic!("expected sync subcommand");
        };
        assert_eq!(remote.bucket.as_deref(), Some("videos"));
        assert_eq!(workers, Some(8));
        assert!(force);
        assert!(!no_check_remote);
    }

    #[test]
    fn test_resolve_config_from_flags() {
        let remote = RemoteArgs {
            account_id: Some("acct".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            bucket: Some("videos".to_string()),
            public_domain: None,
        };
        let config = resolve_config(
            None,
            remote,
            Some(PathBuf::from("lib.json")),
            None,
            Some(2),
        )
        .unwrap();

        assert_eq!(config.remote.bucket, "videos");
        assert_eq!(config.sync.workers, 2);
        assert_eq!(config.sync.library_path, PathBuf::from("lib.json"));
        assert!(config.sync.skip_existing);
    }

    #[test]
    fn test_resolve_config_missing_credentials() {
        let remote = RemoteArgs {
            account_id: Some("acct".to_string()),
            access_key_id: None,
            secret_access_key: None,
            bucket: None,
            public_domain: None,
        };
        assert!(resolve_config(None, remote, None, None, None).is_err());
    }
}
