use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use devbridge_cli::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	match run(cli).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("Error: {err:#}");
			ExitCode::FAILURE
		}
	}
}

async fn run(cli: Cli) -> anyhow::Result<()> {
	let name = cli.command.name();
	commands::dispatch(cli)
		.await
		.with_context(|| format!("{name} failed"))
}
