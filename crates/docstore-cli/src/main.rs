//! docstore CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use docstore_cli::cli::Cli;
use docstore_cli::commands;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root_dir();
    let options = cli.driver_options();

    if let Err(e) = commands::execute(options, cli.command, &root) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
