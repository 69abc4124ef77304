use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use slotd::cli::{self, ApiClient, BookArgs, OutputFormat};
use slotd::DEFAULT_SERVER_URL;

#[derive(Parser)]
#[command(name = "slotd")]
#[command(about = "Find and book free meeting slots on a Google Calendar", version)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Server URL for client commands
    #[arg(long, global = true, env = slotd::SERVER_URL_ENV, default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List dates open for booking
    Dates,
    /// List slots for a date
    Slots {
        /// Date (e.g., "2026-03-02", "tomorrow")
        #[arg(long)]
        date: String,
    },
    /// Book a slot
    Book {
        /// Your name
        #[arg(long)]
        name: String,
        /// Your email; the invite goes here
        #[arg(long)]
        email: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Note for the meeting description
        #[arg(long)]
        message: Option<String>,
        /// Slot start (e.g., "2026-03-02T10:00:00Z")
        #[arg(long)]
        start: String,
        /// Slot end
        #[arg(long)]
        end: String,
    },
    /// Cancel a booking
    Cancel {
        /// Calendar event ID returned when booking
        #[arg(long)]
        event: String,
    },
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Schedule config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("slotd=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Dates => {
            let client = ApiClient::new(&cli.server)?;
            cli::run_dates(&client, format).await?;
        }
        Commands::Slots { date } => {
            let client = ApiClient::new(&cli.server)?;
            cli::run_slots(&client, &date, format).await?;
        }
        Commands::Book {
            name,
            email,
            company,
            phone,
            message,
            start,
            end,
        } => {
            let client = ApiClient::new(&cli.server)?;
            let args = BookArgs {
                name: &name,
                email: &email,
                company: company.as_deref(),
                phone: phone.as_deref(),
                message: message.as_deref(),
                start: &start,
                end: &end,
            };
            cli::run_book(&client, args, format).await?;
        }
        Commands::Cancel { event } => {
            let client = ApiClient::new(&cli.server)?;
            cli::run_cancel(&client, &event, format).await?;
        }
        Commands::Serve { port, config } => {
            let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
            slotd::server::run_server(addr, config.as_deref()).await?;
        }
    }

    Ok(())
}
