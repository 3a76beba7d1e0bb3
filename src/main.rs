//! Chatline - terminal client for a conversational chat service

mod cli;

use chatline::client::ChatClient;
use chatline::config::{parse_base_url, ClientConfig};
use chatline::diagnostics::TracingSink;
use chatline::session_id::SessionId;
use chatline::transport::{HttpTransport, LoggingTransport};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chatline=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    // stdout belongs to the conversation
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    // Configuration: environment first, flags override
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.base_url = parse_base_url(url)?;
    }
    if let Some(limit) = cli.history_limit {
        config = config.with_history_limit(limit);
    }
    let http = HttpTransport::new(&config)?;
    tracing::info!(base_url = %http.base_url(), "Using chat service");
    let transport = Arc::new(LoggingTransport::new(http));
    let diagnostics = Arc::new(TracingSink);

    match cli.command.unwrap_or(Command::Chat { session: None }) {
        Command::Chat { session } => {
            let client = match session {
                Some(id) => {
                    ChatClient::resume(
                        SessionId::from(id),
                        transport,
                        diagnostics,
                        config.history_limit,
                    )
                    .await?
                }
                None => ChatClient::start(transport, diagnostics, config.history_limit).await?,
            };
            cli::run_chat(client).await?;
        }
        Command::Health => cli::run_health(&transport).await?,
        Command::History { session_id, limit } => {
            cli::run_history(
                &transport,
                &SessionId::from(session_id),
                limit.unwrap_or(config.history_limit),
            )
            .await?;
        }
    }

    Ok(())
}
