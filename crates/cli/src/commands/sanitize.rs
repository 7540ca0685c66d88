//! `devbridge sanitize`: run a JSON document through the sanitizer.

use devbridge_protocol::{EventPayload, Message, Path};
use devbridge_runtime::{BridgeConfig, HostValue, Sanitized, Sanitizer};
use serde::Serialize;
use serde_json::Value;

use super::read_input;
use crate::cli::SanitizeArgs;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat, TextRecord, display_path};

/// Sanitizer output as printed by the command.
#[derive(Debug, Serialize)]
pub struct SanitizeReport {
	pub data: Value,
	pub cleaned: Vec<Path>,
}

impl TextRecord for SanitizeReport {
	fn text_lines(&self) -> Vec<String> {
		let mut lines = vec![self.data.to_string()];
		lines.extend(
			self.cleaned
				.iter()
				.map(|path| format!("cleaned: {}", display_path(path))),
		);
		lines
	}
}

pub async fn run(args: SanitizeArgs, format: OutputFormat) -> Result<()> {
	let config = load_config(&args).await?;
	let input = read_input(args.input.as_deref()).await?;
	let document: Value = serde_json::from_slice(&input).map_err(CliError::InvalidInput)?;

	let Sanitized { value, cleaned } =
		Sanitizer::new(config.limits).sanitize(&HostValue::from(document));
	tracing::info!(cleaned = cleaned.len(), "Sanitized document");

	match args.event {
		Some(evt) => {
			// Always a single compact line so it can be piped into `decode`.
			let message = Message::Event(EventPayload::new(evt, value, cleaned));
			println!("{}", serde_json::to_string(&message)?);
		}
		None => {
			output::print_records(&[SanitizeReport { data: value, cleaned }], format)?;
		}
	}
	Ok(())
}

async fn load_config(args: &SanitizeArgs) -> Result<BridgeConfig> {
	let mut config = match &args.config {
		Some(path) => {
			let raw = tokio::fs::read_to_string(path)
				.await
				.map_err(|source| CliError::Read {
					what: path.display().to_string(),
					source,
				})?;
			BridgeConfig::from_json_str(&raw)?
		}
		None => BridgeConfig::default(),
	};
	if let Some(max_depth) = args.max_depth {
		config.limits.max_depth = max_depth;
	}
	if let Some(max_string_len) = args.max_string_len {
		config.limits.max_string_len = max_string_len;
	}
	tracing::debug!(?config, "Effective configuration");
	Ok(config)
}

#[cfg(test)]
mod tests {
	use devbridge_protocol::path;
	use serde_json::json;

	use super::*;

	fn args() -> SanitizeArgs {
		SanitizeArgs {
			input: None,
			config: None,
			max_depth: None,
			max_string_len: None,
			event: None,
		}
	}

	#[tokio::test]
	async fn test_flags_override_defaults() {
		let config = load_config(&SanitizeArgs {
			max_depth: Some(0),
			..args()
		})
		.await
		.unwrap();
		assert_eq!(config.limits.max_depth, 0);
		assert_eq!(config.limits.max_string_len, 500);
	}

	#[tokio::test]
	async fn test_missing_config_file_is_read_error() {
		let err = load_config(&SanitizeArgs {
			config: Some("/nonexistent/devbridge.json".into()),
			..args()
		})
		.await
		.unwrap_err();
		assert!(matches!(err, CliError::Read { .. }));
	}

	#[test]
	fn test_report_text_lists_cleaned_paths() {
		let report = SanitizeReport {
			data: json!({"a": {"b": {"type": "object", "name": "Object"}}}),
			cleaned: vec![path!["a", "b"], vec![]],
		};
		let lines = report.text_lines();
		assert_eq!(lines.len(), 3);
		assert_eq!(lines[1], "cleaned: a.b");
		assert_eq!(lines[2], "cleaned: <root>");
	}
}
