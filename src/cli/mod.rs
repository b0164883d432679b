use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::core::config::storage_paths;

pub mod auth;
pub mod init;
pub mod serve;
pub mod slots;

#[derive(Subcommand)]
enum Command {
    /// Initialize the credential database
    Init {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8080")]
        port: String,
    },
    /// Perform OAuth authentication and store the refresh token
    Auth {
        /// Account being authorized, prompted for when omitted
        #[arg(long)]
        email: Option<String>,
    },
    /// Find open slots for a free-text request
    Slots {
        #[arg(long)]
        query: String,
        /// Only use this account's calendars
        #[arg(long)]
        email: Option<String>,
        /// Earliest start of day as HH:MM
        #[arg(long)]
        start_time: Option<String>,
        /// Latest end of day as HH:MM
        #[arg(long)]
        end_time: Option<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    let (_, db_path) = storage_paths();

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            init::run(&db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Auth { email }) => {
            auth::run(email).await?;
        }
        Some(Command::Slots {
            query,
            email,
            start_time,
            end_time,
        }) => {
            slots::run(query, email, start_time, end_time).await?;
        }
        None => {}
    }

    Ok(())
}
