//! speechbridge CLI
//!
//! Operator tooling: inspect how a session configuration translates into
//! engine settings, and pre-fetch the model files it references.

#![allow(clippy::print_stdout)]

mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use application::services::{AssetProvisioner, ConfigTranslator, TranslatedConfig};
use clap::{Parser, Subcommand};
use domain::entities::SessionConfig;
use domain::value_objects::Credentials;
use infrastructure::{
    AppConfig, FsModelCache, HttpModelDownloader, StaticNetworkMonitor, TelemetryConfig,
    init_telemetry,
};
use report::{OutputFormat, ProvisionReport, TranslationReport};
use tracing::info;

/// speechbridge CLI
#[derive(Parser)]
#[command(name = "speechbridge-cli")]
#[command(author, version, about = "Speech session configuration and model tooling", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Application config file (default: ./speechbridge.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Engine client credentials; falls back to the `[credentials]` config section
#[derive(clap::Args)]
struct CredentialArgs {
    /// Engine client id
    #[arg(long, env = "SPEECHBRIDGE_CLIENT_ID")]
    client_id: Option<String>,

    /// Engine client secret
    #[arg(long, env = "SPEECHBRIDGE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a session configuration and print the engine settings
    ///
    /// Example: speechbridge-cli translate session.json --format toml
    Translate {
        /// Session configuration (JSON)
        session: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Download the model files a session configuration references
    ///
    /// Files already in the cache are reused unless --refresh is given.
    /// Example: speechbridge-cli provision session.json --cache-dir ./models
    Provision {
        /// Session configuration (JSON)
        session: PathBuf,

        /// Model cache directory (overrides assets.cache_dir)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Permit downloads over a cellular connection
        #[arg(long)]
        allow_cellular: bool,

        /// Download again even if a cached copy exists
        #[arg(long)]
        refresh: bool,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Print the effective application configuration
    ShowConfig,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Log settings: `-v` flags override the configured filter
fn telemetry_config(verbose: u8, app: &AppConfig) -> TelemetryConfig {
    TelemetryConfig {
        log_filter: log_filter_from_verbosity(verbose)
            .map_or_else(|| app.telemetry.log_filter.clone(), str::to_string),
        json: app.telemetry.json,
    }
}

/// Credentials from flags or environment, else from the application config
fn resolve_credentials(args: CredentialArgs, app: &AppConfig) -> anyhow::Result<Credentials> {
    match (args.client_id, args.client_secret) {
        (Some(client_id), Some(client_secret)) => Ok(Credentials::new(client_id, client_secret)?),
        (None, None) => app
            .credentials
            .to_credentials()
            .context("No engine credentials: pass --client-id/--client-secret or set SPEECHBRIDGE_CLIENT_ID/SPEECHBRIDGE_CLIENT_SECRET"),
        _ => anyhow::bail!("--client-id and --client-secret must be given together"),
    }
}

fn read_session_config(path: &Path) -> anyhow::Result<SessionConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    SessionConfig::from_json(&raw).with_context(|| format!("Invalid session config {}", path.display()))
}

fn translate_file(
    path: &Path,
    credentials: CredentialArgs,
    app: &AppConfig,
) -> anyhow::Result<TranslatedConfig> {
    let session = read_session_config(path)?;
    let credentials = resolve_credentials(credentials, app)?;
    Ok(ConfigTranslator::new().translate(credentials, &session)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    app.validate()?;

    // Logs go to stderr, command output to stdout
    init_telemetry(&telemetry_config(cli.verbose, &app))?;

    match cli.command {
        Commands::Translate {
            session,
            format,
            credentials,
        } => {
            let translated = translate_file(&session, credentials, &app)?;
            println!("{}", TranslationReport::new(&translated).render(format)?);
        },

        Commands::Provision {
            session,
            cache_dir,
            allow_cellular,
            refresh,
            credentials,
        } => {
            let translated = translate_file(&session, credentials, &app)?;
            if translated.asset_requests.is_empty() {
                println!("No model assets referenced by {}", session.display());
                return Ok(());
            }

            let cache_dir = cache_dir.unwrap_or_else(|| app.assets.cache_dir.clone());
            let provisioner = AssetProvisioner::new(
                Arc::new(FsModelCache::new(&cache_dir)),
                Arc::new(HttpModelDownloader::from_config(&app.assets)?),
                Arc::new(StaticNetworkMonitor::new(app.assets.connectivity)),
            );

            let mut policy = translated.network_policy;
            policy.allow_cellular |= allow_cellular;
            policy.force_refresh |= refresh;

            info!(
                count = translated.asset_requests.len(),
                cache_dir = %cache_dir.display(),
                "Provisioning models"
            );
            let assets = provisioner
                .provision_all(translated.asset_requests, policy)
                .await?;

            let report = ProvisionReport::new(cache_dir, &assets);
            println!("{}", serde_json::to_string_pretty(&report)?);
        },

        Commands::ShowConfig => {
            println!("{}", toml::to_string_pretty(&app)?);
        },
    }

    Ok(())
}
