use anyhow::Context;
use clap::{Parser, Subcommand};

use mehfil_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "mehfil", about = "Content-site backend for mehfil", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Load the layered configuration and print a summary.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => mehfil_app::run().await,
        Command::CheckConfig => {
            let settings = Settings::load().with_context(|| "failed to load mehfil settings")?;
            mehfil_telemetry::init(&settings.telemetry);
            tracing::info!(
                env = ?settings.environment,
                db = %settings.database.endpoint,
                host = %settings.server.host,
                port = settings.server.port,
                "configuration loaded"
            );
            println!(
                "environment: {:?}\nstore: {}\nlisten: {}:{}",
                settings.environment,
                settings.database.endpoint,
                settings.server.host,
                settings.server.port
            );
            Ok(())
        }
    }
}
