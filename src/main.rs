//! peerlink command line.
//!
//! ```text
//! peerlink [--config peerlink.toml] serve-single --reply "ok"
//! peerlink [--config peerlink.toml] serve-multi  --reply "ok"
//! peerlink [--config peerlink.toml] send --host 10.0.0.1 --port 7878 --message "hi"
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use peerlink::config::{load_config, PeerlinkConfig};
use peerlink::observability::{logging, metrics};
use peerlink::{Client, Endpoint, MultiClientServer, Runner, SingleClientServer};

#[derive(Parser)]
#[command(name = "peerlink")]
#[command(about = "Accept expected peers and exchange raw bytes with them", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one client: read its message, then answer
    ServeSingle {
        #[arg(short, long, default_value = "ok")]
        reply: String,
    },
    /// Serve every configured client slot: read from all, then answer all
    ServeMulti {
        #[arg(short, long, default_value = "ok")]
        reply: String,
    },
    /// Send a message to a server and print its answer
    Send {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value_t = 7878)]
        port: u16,
        #[arg(short, long)]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PeerlinkConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("peerlink v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    match cli.command {
        Commands::ServeSingle { reply } => {
            let server = SingleClientServer::bind(&config).await?;
            let mut runner: Runner<_, (), ()> = Runner::new(server);
            let received = runner.run_read_first_raw(reply.as_bytes()).await?;
            println!("{}", String::from_utf8_lossy(&received));
            runner.into_endpoint().stop();
        }
        Commands::ServeMulti { reply } => {
            let mut server = MultiClientServer::bind(&config).await?;
            server.connect().await?;
            tracing::info!(
                connected = server.tracker().occupied_count(),
                capacity = server.tracker().capacity(),
                "Clients connected"
            );
            for (index, data) in server.read().await? {
                println!("[{}] {}", index, String::from_utf8_lossy(&data));
            }
            server.connect().await?;
            server.write(reply.as_bytes()).await?;
            server.stop();
        }
        Commands::Send { host, port, message } => {
            let client = Client::new(host, port, &config.client);
            let mut runner: Runner<_, (), ()> = Runner::new(client);
            let answer = runner.run_write_first_raw(message.as_bytes()).await?;
            println!("{}", String::from_utf8_lossy(&answer));
        }
    }

    tracing::info!("Done");
    Ok(())
}
