//! In-process transport joining two bridges with channels.

use serde_json::Value;
use tokio::sync::mpsc;

use super::{BoxFuture, Transport, TransportParts, TransportReceiver};
use crate::error::{Error, Result};

/// Factory for connected in-memory transport pairs.
pub struct MemoryTransport;

impl MemoryTransport {
	/// Returns two connected ends; whatever one end sends, the other receives.
	pub fn pair() -> (TransportParts, TransportParts) {
		let (left_tx, left_rx) = mpsc::unbounded_channel();
		let (right_tx, right_rx) = mpsc::unbounded_channel();

		let left = TransportParts {
			sender: Box::new(MemoryTransportSender { peer: right_tx }),
			receiver: Box::new(MemoryTransportReceiver),
			message_rx: left_rx,
		};
		let right = TransportParts {
			sender: Box::new(MemoryTransportSender { peer: left_tx }),
			receiver: Box::new(MemoryTransportReceiver),
			message_rx: right_rx,
		};
		(left, right)
	}
}

/// Sending end that delivers straight into the peer's inbound channel.
pub struct MemoryTransportSender {
	peer: mpsc::UnboundedSender<Value>,
}

impl Transport for MemoryTransportSender {
	fn send(&mut self, message: Value) -> BoxFuture<'_, Result<()>> {
		let result = self.peer.send(message).map_err(|_| Error::ChannelClosed);
		Box::pin(async move { result })
	}
}

/// Messages are pushed by the peer's sender, so there is nothing to read.
pub struct MemoryTransportReceiver;

impl TransportReceiver for MemoryTransportReceiver {
	fn run(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
		Box::pin(async { Ok(()) })
	}
}
