//! MemberHub CLI entry point.

use clap::Parser;

mod commands;
mod logging;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logging = cli
        .load_config()
        .map(|config| config.logging)
        .unwrap_or_default();
    logging::init_logging(&logging);

    if let Err(e) = cli.execute().await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
