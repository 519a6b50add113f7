use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use wastewise::centers::listing_preamble;
use wastewise::chat;
use wastewise::location::LocationInput;
use wastewise::web_server::{self, AppState};
use wastewise::{Assistant, Config};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the web chat UI.
    Start {
        #[arg(long, env = "WASTEWISE_PORT", default_value_t = 9900, help = "Port for the web server.")]
        port: u16,
    },
    /// Chat with the assistant in the terminal.
    Chat,
    /// Look up recycling centers near a location and print them.
    Centers {
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        postcode: String,
    },
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for the provider API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,wastewise=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Both provider keys are required before anything else runs
    let config = Config::from_env().context("Invalid configuration")?;
    let assistant = Assistant::from_config(&config);

    info!("Wastewise starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Start { port } => {
            let state = AppState::new(&config.templates_dir, assistant);
            let static_dir = config.static_dir.clone();
            let mut web_server_handle = tokio::spawn(async move {
                web_server::start_web_server(port, state, &static_dir).await
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, shutting down...");
                    web_server_handle.abort();
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(Ok(())) => info!("Web server task completed."),
                        Ok(Err(e)) => {
                            error!("Web server failed: {:?}", e);
                            return Err(e);
                        }
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }
            info!("Shutdown complete.");
        }
        Commands::Chat => {
            chat::run_terminal_chat(&assistant)
                .await
                .context("Chat session failed")?;
        }
        Commands::Centers { city, state, postcode } => {
            let location = LocationInput::new(city, state, postcode);
            match assistant.finder().lookup(&location).await {
                Ok(listing) => {
                    println!("{}", listing_preamble(&location));
                    println!("{}", listing);
                }
                Err(e) => println!("{}", e.user_message()),
            }
        }
    }

    Ok(())
}
