use clap::Parser;
use std::process;
use tracing::{error, info};
use watch_ssh::cli::Args;
use watch_ssh::config::Config;
use watch_ssh::watcher::SshWatcher;

#[tokio::main]
async fn main() {
    // Initialize logging; stdout is reserved for events and listings
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();

    if args.version {
        println!("{}", Args::version_string());
        process::exit(0);
    }

    // Build configuration from CLI args
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(2);
        }
    };

    let mut watcher = SshWatcher::new(config);

    match watcher.execute(args.command).await {
        Ok(_) => {
            info!("WatchSSH completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("WatchSSH failed: {:#}", e);
            process::exit(1);
        }
    }
}
