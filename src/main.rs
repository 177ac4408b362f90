use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use homebus_bridge::{
    AudioClient, BridgeConfig, Dispatcher, FileTokenStore, OAuthClient, Orchestrator, TokenProvider,
    AUDIO_INTEGRATION,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "homebus-bridge", version, about = "Drive a cloud multi-room audio platform from bus messages")]
struct Cli {
    #[command(flatten)]
    config: BridgeConfig,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read newline-delimited JSON messages from stdin and dispatch them (default)
    Serve,
    /// Print the URL that grants this bridge access to the platform
    AuthorizeUrl,
    /// Exchange the code from the OAuth callback and store the credential
    Authorize {
        #[arg(long)]
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("homebus_bridge=info".parse()?))
        .init();

    let config = cli.config;
    let http = reqwest::Client::new();
    let oauth = Arc::new(OAuthClient::new(config.oauth()?, http.clone()));

    if let Some(Command::AuthorizeUrl) = cli.command {
        let (url, state) = oauth.authorize_url()?;
        println!("{}", url);
        tracing::info!("Authorization state {}", state);
        return Ok(());
    }

    let store = Arc::new(FileTokenStore::new(&config.token_dir, config.encryption_key()?));
    let tokens = Arc::new(TokenProvider::new(AUDIO_INTEGRATION, oauth.clone(), store));

    if let Some(Command::Authorize { code }) = &cli.command {
        let credential = oauth
            .exchange_code(code)
            .await
            .context("authorization code exchange failed")?;
        tokens.store(credential).await?;
        println!("Credential stored in {}", config.token_dir.display());
        return Ok(());
    }

    let api = Arc::new(AudioClient::new(http, config.api_url.clone(), tokens));
    let orchestrator = Arc::new(Orchestrator::new(api, config.household_id.clone(), config.control_players));

    let mut dispatcher = Dispatcher::new();
    dispatcher.register(orchestrator);

    serve(Arc::new(dispatcher)).await
}

/// Dispatch each stdin line on its own task; wait for all of them at EOF
async fn serve(dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    tracing::info!("Waiting for messages on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = Vec::new();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let dispatcher = dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            dispatcher.handle(line.as_bytes()).await;
        }));
    }

    for result in futures_util::future::join_all(tasks).await {
        if let Err(e) = result {
            tracing::error!("Message task failed: {}", e);
        }
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}
