use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use refund_desk::backend::build_backend;
use refund_desk::config::Config;
use refund_desk::logging;
use refund_desk::refund::format_currency;
use refund_desk::rest::{self, ApiDoc};

#[derive(Parser)]
#[command(name = "refund-desk")]
#[command(about = "Guided refund requests for festival pass holders")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to listen on (default from config: 7010)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the OpenAPI document as JSON
    Openapi,

    /// Look up a submitted refund request
    Status {
        /// Confirmation number issued at submission
        confirmation: String,
    },

    /// Write the effective configuration to a file
    InitConfig {
        /// Destination (default: ./refund-desk.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let logging_handle = logging::init_logging(&config, cli.debug)?;

    match cli.command {
        Commands::Serve { port } => {
            cmd_serve(config, port, logging_handle.log_file_path.as_deref()).await?;
        }
        Commands::Openapi => cmd_openapi()?,
        Commands::Status { confirmation } => cmd_status(&config, &confirmation).await?,
        Commands::InitConfig { output, force } => cmd_init_config(&config, output, force)?,
    }

    Ok(())
}

async fn cmd_serve(config: Config, port: Option<u16>, log_file: Option<&Path>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    let host = config.server.host.clone();
    let backend = build_backend(&config.backend)?;

    println!("Starting refund desk...");
    println!("  Listen:  {}:{}", host, port);
    println!("  Backend: {}", backend.name());
    if let Some(log_file) = log_file {
        println!("  Logs:    {}", log_file.display());
    }
    println!("  Endpoints:");
    println!("    POST /api/v1/refunds/sessions                 Start a request");
    println!("    GET  /api/v1/refunds/sessions/:id             Session state");
    println!("    POST /api/v1/refunds/sessions/:id/submit      Submit");
    println!("    GET  /api/v1/refunds/status/:confirmation     Request status");
    println!("    GET  /api-docs/openapi.json                   OpenAPI document");
    println!();

    let state = rest::ApiState::new(config, backend);
    rest::serve(state, &host, port).await?;

    Ok(())
}

fn cmd_openapi() -> Result<()> {
    println!("{}", ApiDoc::json()?);
    Ok(())
}

async fn cmd_status(config: &Config, confirmation: &str) -> Result<()> {
    let backend = build_backend(&config.backend)?;
    let result = backend.lookup_status(confirmation.trim()).await?;

    let Some(record) = result.request.filter(|_| result.success) else {
        let reason = result
            .error
            .unwrap_or_else(|| format!("No refund request found for {}", confirmation));
        anyhow::bail!(reason);
    };

    println!("Confirmation: {}", record.confirmation_number);
    println!("Email:        {}", record.email);
    println!("Decision:     {}", record.decision.label());
    println!("Status:       {:?}", record.status);
    println!("Refund:       {}", format_currency(record.refund_amount));
    if let Some(method) = record.payment_method {
        println!("Payout via:   {:?}", method);
    }
    if let Some(submitted_at) = record.submitted_at {
        println!("Submitted:    {}", submitted_at.to_rfc3339());
    }
    if let Some(processed_at) = record.processed_at {
        println!("Processed:    {}", processed_at.to_rfc3339());
    }

    Ok(())
}

fn cmd_init_config(config: &Config, output: Option<PathBuf>, force: bool) -> Result<()> {
    let path = output.unwrap_or_else(Config::local_config_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite",
            path.display()
        );
    }

    config
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote configuration to {}", path.display());
    Ok(())
}
