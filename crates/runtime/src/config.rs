//! Bridge configuration.
//!
//! Every field has a default matching the protocol's fixed constants, so an
//! empty JSON object (or [`BridgeConfig::default`]) yields stock behavior.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sanitize::SanitizeLimits;

/// Adaptive flush scheduling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
	/// Flush cost assumed before the first flush is measured, in milliseconds.
	pub initial_flush_cost_ms: u64,
	/// Multiplier applied to the last flush cost to get the next delay.
	pub delay_factor: u32,
}

impl Default for BatchConfig {
	fn default() -> Self {
		Self {
			initial_flush_cost_ms: 5,
			delay_factor: 5,
		}
	}
}

impl BatchConfig {
	pub fn initial_flush_cost(&self) -> Duration {
		Duration::from_millis(self.initial_flush_cost_ms)
	}
}

/// Full configuration of a [`Bridge`](crate::Bridge).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
	/// Sanitizer size guards.
	pub limits: SanitizeLimits,
	/// Event batching.
	pub batch: BatchConfig,
}

impl BridgeConfig {
	/// Parses a JSON document; missing fields keep their defaults.
	pub fn from_json_str(s: &str) -> Result<Self> {
		Ok(serde_json::from_str(s)?)
	}

	pub fn with_limits(mut self, limits: SanitizeLimits) -> Self {
		self.limits = limits;
		self
	}

	pub fn with_batch(mut self, batch: BatchConfig) -> Self {
		self.batch = batch;
		self
	}
}
