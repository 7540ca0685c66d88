//! Command implementations and dispatch.

pub mod decode;
pub mod sanitize;

use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let format = cli.format;
	match cli.command {
		Commands::Sanitize(args) => sanitize::run(args, format).await,
		Commands::Decode(args) => decode::run(args, format).await,
	}
}

/// Reads a whole input file, or stdin for `None` and `-`.
pub async fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
	match path {
		Some(path) if path != Path::new("-") => {
			tracing::debug!(path = %path.display(), "Reading input file");
			tokio::fs::read(path).await.map_err(|source| CliError::Read {
				what: path.display().to_string(),
				source,
			})
		}
		_ => {
			let mut bytes = Vec::new();
			tokio::io::stdin()
				.read_to_end(&mut bytes)
				.await
				.map_err(|source| CliError::Read {
					what: "stdin".to_string(),
					source,
				})?;
			Ok(bytes)
		}
	}
}
