use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use tokio::net::TcpListener;

use netbridge::{
    Config, DeviceRegistry, Orchestrator, PlatformRegistry, SshExecutor, ToolDispatcher, server,
};

/// Network device tool server over SSH.
#[derive(Parser, Debug)]
#[command(name = "netbridge", version, about)]
struct Args {
    /// Configuration file (YAML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inventory file, overrides the configuration.
    #[arg(short, long)]
    inventory: Option<PathBuf>,

    /// Listen address, overrides the configuration.
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides the configuration.
    #[arg(short, long)]
    port: Option<u16>,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(inventory) = args.inventory {
        config.inventory = inventory;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let registry = DeviceRegistry::load(&config.inventory)?;
    if registry.is_empty() {
        warn!("inventory {} has no devices", config.inventory.display());
    } else {
        info!(
            "loaded {} devices from {}",
            registry.len(),
            config.inventory.display()
        );
    }

    let executor = SshExecutor::new(
        Arc::new(PlatformRegistry::with_builtins()),
        config.ssh.session_options(),
    );
    let orchestrator = Orchestrator::new(Arc::new(registry), executor, config.commands.clone());
    let dispatcher = Arc::new(ToolDispatcher::new(orchestrator));

    let listener = TcpListener::bind(config.listen_addr()).await?;
    server::serve(listener, dispatcher).await?;
    Ok(())
}
