use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("line {line}: invalid wire message: {source}")]
	InvalidMessage {
		line: usize,
		#[source]
		source: serde_json::Error,
	},

	#[error("malformed frame in capture: {0}")]
	MalformedFrame(#[source] devbridge_runtime::Error),

	#[error("input is not valid JSON: {0}")]
	InvalidInput(#[source] serde_json::Error),

	#[error("failed to read {what}: {source}")]
	Read {
		what: String,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Config(#[from] devbridge_runtime::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}
