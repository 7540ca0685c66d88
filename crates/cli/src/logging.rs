use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the stderr subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init_logging(verbosity: u8) {
	// 0 = errors only, runtime protocol chatter off
	// 1 (-v) = info for the CLI, warn for the runtime
	// 2+ (-vv) = debug for everything
	let filter = match verbosity {
		0 => "error,devbridge_runtime=off",
		1 => "info,devbridge_runtime=warn",
		_ => "debug",
	};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_ansi(std::io::stderr().is_terminal())
		.with_target(verbosity > 1)
		.compact()
		.init();
}
