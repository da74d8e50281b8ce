use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log::error;
use rouilleftp::config::Config;
use rouilleftp::core_cli::Cli;
use rouilleftp::core_client::FtpClient;
use rouilleftp::core_log::logger::init_logger;
use rouilleftp::runner;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_logger(args.verbose);

    match execute(args).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output.green());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: Cli) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load configuration file: {}", path.display()))?,
        None => Config::default(),
    };
    args.apply_to(&mut config.client)
        .context("Invalid connection arguments")?;

    let client = FtpClient::from_config(&config.client).context("Invalid client configuration")?;
    runner::run(&client, &args.command, config.client.transfer_mode).await
}
