//! Error types for the bridge runtime.
//!
//! The protocol itself never fails loudly: unknown roots, dangling callbacks
//! and unknown message types are ignored. These errors cover the few places
//! where a caller can act on a failure: attaching, transport I/O, and awaiting
//! an inspect response.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the bridge runtime.
#[derive(Debug, Error)]
pub enum Error {
	/// The bridge already owns a transport.
	#[error("Bridge is already attached to a transport")]
	AlreadyAttached,

	/// The response channel was dropped before a reply arrived.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// Transport-level error (broken prefix, short body, oversized frame).
	#[error("Transport error: {0}")]
	TransportError(String),

	/// A frame arrived whose body is not JSON.
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if the failure means the peer is gone.
	pub fn is_disconnect(&self) -> bool {
		matches!(self, Error::ChannelClosed | Error::TransportError(_))
	}
}
