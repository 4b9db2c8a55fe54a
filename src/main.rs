mod auth;
mod cli;
mod cml;
mod config;
mod error;
mod output;
mod report;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use env_logger::{Env, Target};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stdout)
        .init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting cmlreport");
    cli.execute().await?;

    Ok(())
}
