//! Transports carrying bridge messages between the two endpoints.
//!
//! A transport is split into a sending half, driven by the bridge's writer
//! task, and a receiving half whose `run` loop pushes every inbound JSON value
//! into an unbounded channel the bridge dispatches from.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;

mod memory;
mod pipe;

pub use memory::{MemoryTransport, MemoryTransportReceiver, MemoryTransportSender};
pub use pipe::{
	MAX_FRAME_LEN, PipeTransport, PipeTransportReceiver, PipeTransportSender, decode_frame, read_frame,
};

/// Boxed future returned by the transport traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sending half of a transport.
pub trait Transport: Send {
	/// Writes one message to the peer.
	fn send(&mut self, message: Value) -> BoxFuture<'_, Result<()>>;
}

/// Receiving half of a transport.
pub trait TransportReceiver: Send {
	/// Reads messages until the peer goes away or the inbound channel closes.
	fn run(self: Box<Self>) -> BoxFuture<'static, Result<()>>;
}

/// Everything a [`Bridge`](crate::Bridge) needs to talk over a transport.
pub struct TransportParts {
	pub sender: Box<dyn Transport>,
	pub receiver: Box<dyn TransportReceiver>,
	pub message_rx: mpsc::UnboundedReceiver<Value>,
}

#[cfg(test)]
mod tests;
