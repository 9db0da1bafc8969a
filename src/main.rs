//! Google Drive MCP Server
//!
//! A Model Context Protocol (MCP) server that uploads local files to
//! Google Drive.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use gdrive_mcp_server::config::{self, ClientCredentials, Config};
use gdrive_mcp_server::drive::auth::{ConsentFlow, RefreshTokenAuthenticator};
use gdrive_mcp_server::drive::client::DriveClient;
use gdrive_mcp_server::error::Result;
use gdrive_mcp_server::mcp::server::McpServer;
use gdrive_mcp_server::mcp::tools::ToolHandler;

/// Google Drive MCP Server
#[derive(Parser)]
#[command(name = "gdrive-mcp-server")]
#[command(author, version, about = "Google Drive MCP Server - upload local files to Google Drive over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize Drive access in a browser and print a refresh token
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Auth) => {
            let credentials = ClientCredentials::from_env().unwrap_or_else(|e| fail(e));
            let port = config::oauth_callback_port()?;
            ConsentFlow::new(credentials, port).run().await?;
        }
        None => {
            let config = Config::from_env().unwrap_or_else(|e| fail(e));
            run_server(config).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    tracing::debug!(?config, "Loaded configuration");

    let authenticator = RefreshTokenAuthenticator::new(&config).await?;
    let drive_client = Arc::new(DriveClient::new(Arc::new(authenticator)));

    let mut server = McpServer::new(ToolHandler::new(drive_client));
    tracing::info!("Google Drive MCP server running on stdio");
    server.run_stdio().await
}

fn fail(err: impl std::fmt::Display) -> ! {
    tracing::error!(error = %err, "Startup failed");
    eprintln!("Error: {}", err);
    std::process::exit(1);
}
