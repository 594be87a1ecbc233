//! Issue Desk CLI - Migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! issuedesk migrate
//!
//! # Try the extractor on some text
//! issuedesk parse "order id: 42 flow: checkout error: payment timeout"
//!
//! # Sign a request body for curl testing
//! issuedesk sign --secret "$SLACK_SIGNING_SECRET" --body '{"challenge":"abc"}'
//!
//! # Show the report stored for an order
//! issuedesk show 42
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "issuedesk")]
#[command(author, version, about = "Issue Desk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Extract report fields from text
    Parse {
        /// Report text
        text: String,

        /// Entity spans as JSON (`[{"text": ..., "label": ...}]`)
        #[arg(long)]
        spans: Option<String>,
    },
    /// Compute a `v0=` request signature
    Sign {
        /// Signing secret
        #[arg(short, long, env = "SLACK_SIGNING_SECRET", hide_env_values = true)]
        secret: String,

        /// Request timestamp in Unix seconds (default: now)
        #[arg(short, long)]
        timestamp: Option<String>,

        /// Raw request body
        #[arg(short, long)]
        body: String,
    },
    /// Show the stored report for an order
    Show {
        /// Order id
        order_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Parse { text, spans } => commands::parse::run(&text, spans.as_deref())?,
        Commands::Sign {
            secret,
            timestamp,
            body,
        } => commands::sign::run(&secret, timestamp.as_deref(), &body)?,
        Commands::Show { order_id } => commands::show::run(&order_id).await?,
    }
    Ok(())
}
