//! Command-line surface: argument parsing and the interactive chat loop

use async_trait::async_trait;
use chatline::client::{ChatClient, ConfirmAction, Confirmation};
use chatline::diagnostics::DiagnosticSink;
use chatline::history::expand_records;
use chatline::runtime::{RuntimeError, SessionHandle, SessionUpdate, SessionView};
use chatline::session_id::SessionId;
use chatline::state_machine::RequestState;
use chatline::transcript::{Sender, TranscriptEntry};
use chatline::transport::{ChatTransport, HealthStatus, TransportError};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// CLI arguments for chatline
#[derive(Parser)]
#[command(name = "chatline")]
#[command(about = "Terminal client for a conversational chat service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Chat service base URL (overrides `CHATLINE_API_URL`)
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Number of stored turns to load for a session
    #[arg(long, value_name = "N", global = true)]
    pub history_limit: Option<usize>,

    /// Write logs as JSON
    #[arg(long, env = "CHATLINE_LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive chat (default)
    Chat {
        /// Continue an existing session instead of starting a new one
        #[arg(long, value_name = "SESSION_ID")]
        session: Option<String>,
    },
    /// Check that the chat service is up
    Health,
    /// Print the stored turns of a session
    History {
        session_id: String,
        /// Overrides `--history-limit`
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Service reported status {0:?}")]
    Unhealthy(String),
}

type Input = Arc<Mutex<Lines<BufReader<Stdin>>>>;

// ============================================================================
// Confirmation
// ============================================================================

/// Asks on stdout, reads the answer from the shared stdin reader
struct StdinConfirm {
    input: Input,
}

#[async_trait]
impl Confirmation for StdinConfirm {
    async fn confirm(&self, action: ConfirmAction) -> bool {
        let mut out = std::io::stdout();
        let _ = write!(out, "{} [y/N] ", action.prompt());
        let _ = out.flush();

        match self.input.lock().await.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn print_entry(entry: &TranscriptEntry) {
    let label = match entry.sender() {
        Sender::User => "You",
        Sender::Assistant => "Assistant",
    };
    let at = entry.timestamp().with_timezone(&chrono::Local);
    println!("[{}] {label}: {}", at.format("%H:%M"), entry.text());
}

/// Header lines; the welcome hint only makes sense for a session with no past
fn banner(session_id: &SessionId, resumed: bool) -> Vec<String> {
    let mut lines = vec![format!("AI Chat Assistant  (session {session_id})")];
    if !resumed {
        lines.push("Start a conversation by typing a message below.".to_string());
    }
    lines.push("Commands: /clear  /new  /dismiss  /health  /help  /quit".to_string());
    lines
}

fn print_banner(session_id: &SessionId, resumed: bool) {
    for line in banner(session_id, resumed) {
        println!("{line}");
    }
}

fn print_help() {
    println!("/clear    clear this chat (asks first)");
    println!("/new      start a new session (asks first)");
    println!("/dismiss  hide the error message");
    println!("/health   check the chat service");
    println!("/quit     leave");
}

pub fn print_health(health: &HealthStatus) {
    match &health.timestamp {
        Some(ts) => println!("Service status: {} ({ts})", health.status),
        None => println!("Service status: {}", health.status),
    }
}

/// Tracks what has already been written so each view change prints only
/// what is new
#[derive(Default)]
struct ViewPrinter {
    printed: usize,
    busy: bool,
    error: Option<String>,
}

impl ViewPrinter {
    fn render(&mut self, view: &SessionView) {
        if view.entries.len() < self.printed {
            println!("-- chat cleared --");
            self.printed = 0;
        }
        for entry in view.entries.iter().skip(self.printed) {
            print_entry(entry);
        }
        self.printed = view.entries.len();

        if view.request() == RequestState::Sending && !self.busy {
            println!("  ...");
        }
        self.busy = view.is_busy();

        if view.error() != self.error.as_deref() {
            if let Some(error) = view.error() {
                println!("! {error}  (/dismiss to hide)");
            }
            self.error = view.error().map(str::to_string);
        }
    }
}

fn spawn_printer(session: &SessionHandle) -> JoinHandle<()> {
    let mut views = session.watch();
    let mut updates = session.subscribe();
    tokio::spawn(async move {
        let mut printer = ViewPrinter::default();
        loop {
            let view = views.borrow_and_update().clone();
            printer.render(&view);

            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                update = updates.recv() => match update {
                    Ok(SessionUpdate::Rejected { reason }) => println!("  ({reason})"),
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}

// ============================================================================
// Commands
// ============================================================================

/// Line-oriented chat until `/quit` or end of input
pub async fn run_chat<T, D>(mut client: ChatClient<T, D>) -> Result<(), CliError>
where
    T: ChatTransport + 'static,
    D: DiagnosticSink + 'static,
{
    let input: Input = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let confirm = StdinConfirm {
        input: input.clone(),
    };

    print_banner(client.session_id(), client.is_resumed());
    let mut printer = spawn_printer(client.session());

    loop {
        let line = input.lock().await.next_line().await?;
        let Some(line) = line else { break };

        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/dismiss" => client.dismiss_error().await?,
            "/clear" => {
                client.request_clear(&confirm).await?;
            }
            "/new" => {
                if client.request_new_session(&confirm).await? {
                    printer.abort();
                    print_banner(client.session_id(), client.is_resumed());
                    printer = spawn_printer(client.session());
                }
            }
            "/health" => match client.health().await {
                Ok(health) => print_health(&health),
                Err(e) => println!("! Health check failed: {e}"),
            },
            text => client.submit(text).await?,
        }
    }

    printer.abort();
    Ok(())
}

pub async fn run_health<T: ChatTransport>(transport: &T) -> Result<(), CliError> {
    let health = transport.health_check().await?;
    print_health(&health);
    if health.is_healthy() {
        Ok(())
    } else {
        Err(CliError::Unhealthy(health.status))
    }
}

/// Print a session's stored turns. A failed fetch is an error here, unlike
/// in the chat view.
pub async fn run_history<T: ChatTransport>(
    transport: &T,
    session_id: &SessionId,
    limit: usize,
) -> Result<(), CliError> {
    let records = transport.fetch_history(session_id, limit).await?;
    let entries = expand_records(records);
    if entries.is_empty() {
        println!("No stored turns for {session_id}");
    }
    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}
