//! blog-photo-uploader - upload photos to S3 through a presign API.
//!
//! Authentication uses an Amazon Cognito user pool. The ID token is cached in
//! the config file and refreshed automatically when it expires.

mod setup;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use photo_uploader_core::config::{self, CONFIG_PATH_ENV};
use photo_uploader_core::upload::upload_file;
use photo_uploader_core::utils::describe_token;
use photo_uploader_core::{
    ApiClient, CognitoAuthenticator, CredentialError, CredentialManager, CredentialStore,
    HttpTransfer, TokenSource,
};

#[derive(Parser)]
#[command(
    name = "blog-photo-uploader",
    version,
    about = "CLI tool for uploading photos to S3",
    long_about = "blog-photo-uploader uploads photos to S3. It uses Amazon Cognito for \
                  authentication and pre-signed URLs for the upload itself."
)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate with Amazon Cognito and create the config file
    Auth {
        /// Recreate the config even if one already exists
        #[arg(long)]
        force: bool,
    },
    /// Upload a photo to S3
    Upload {
        /// Path to the file to upload
        #[arg(short, long)]
        file: PathBuf,
        /// S3 key for the uploaded file
        #[arg(short, long)]
        key: String,
        /// Lifetime of the pre-signed URL in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        expires_in: Option<u64>,
    },
    /// Show the stored configuration and cached token state
    Status,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let path = config::config_path(cli.config)
        .ok_or_else(|| anyhow!("Could not find config directory; pass --config"))?;
    debug!(path = %path.display(), "Using config file");
    let store = CredentialStore::new(path);

    match cli.command {
        Command::Auth { force } => auth(store, force).await,
        Command::Upload {
            file,
            key,
            expires_in,
        } => upload(store, file, key, expires_in).await,
        Command::Status => status(&store),
    }
}

async fn auth(store: CredentialStore, force: bool) -> Result<()> {
    if store.exists() && !force {
        println!("Configuration file already exists at {}.", store.path().display());
        println!("Run `blog-photo-uploader auth --force` to recreate it.");
        return Ok(());
    }

    println!("{}", setup_banner(&store));
    let record = setup::prompt_record()?;

    let manager = CredentialManager::new(store, CognitoAuthenticator::from_env()?);
    println!("\nAuthenticating...");
    manager.bootstrap(record).await?;

    println!("Configuration saved successfully.");
    Ok(())
}

async fn upload(
    store: CredentialStore,
    file: PathBuf,
    key: String,
    expires_in: Option<u64>,
) -> Result<()> {
    let manager = CredentialManager::new(store, CognitoAuthenticator::from_env()?);
    let (record, source) = manager.resolve_valid_record_with_source().await?;
    if source == TokenSource::Refreshed {
        eprintln!("ID token refreshed");
    }

    let mut authorizer = ApiClient::new()?;
    if let Some(secs) = expires_in {
        authorizer = authorizer.with_expiration(secs);
    }
    let transfer = HttpTransfer::new()?;

    let outcome = upload_file(&record, &authorizer, &transfer, &file, &key).await?;
    debug!(presigned_url = %outcome.presigned_url, "Pre-signed URL used for upload");

    println!("Successfully uploaded file to S3");
    println!("{}", outcome.access_url);
    Ok(())
}

fn status(store: &CredentialStore) -> Result<()> {
    let record = store.load()?;
    let token_state = describe_token(&record.id_token, Utc::now());

    println!("Config:       {}", store.path().display());
    println!("Username:     {}", record.username);
    println!("API endpoint: {}", record.api_endpoint);
    println!(
        "CloudFront:   {}",
        record.cloudfront_domain.as_deref().unwrap_or("(not set)")
    );
    println!("ID token:     {}", token_state);
    Ok(())
}

fn setup_banner(store: &CredentialStore) -> String {
    if store.exists() {
        format!("Recreating configuration at {}.", store.path().display())
    } else {
        "Config file not found. Let's create one interactively.".to_string()
    }
}

/// Full error chain, plus a hint when the provider rejected the stored credentials.
fn render_error(err: &anyhow::Error) -> String {
    let mut out = format!("Error: {:#}", err);
    let rejected = err
        .downcast_ref::<CredentialError>()
        .and_then(CredentialError::auth_error)
        .is_some_and(|e| e.is_rejected());
    if rejected {
        out.push_str(
            "\nCheck the username and password, or run `blog-photo-uploader auth --force` to re-enter them.",
        );
    }
    out
}
