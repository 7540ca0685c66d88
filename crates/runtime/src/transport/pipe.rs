//! Length-prefixed JSON over a pair of byte streams.
//!
//! Each frame is a 4-byte little-endian length followed by that many bytes of
//! UTF-8 JSON. A frame whose body is not JSON is skipped; a broken prefix or a
//! short body ends the stream.

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use super::{BoxFuture, Transport, TransportParts, TransportReceiver};
use crate::error::{Error, Result};

/// Largest frame body the reader accepts.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Reads one frame body.
///
/// Returns `Ok(None)` when the stream ends cleanly on a frame boundary.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
	R: AsyncRead + Unpin,
{
	let mut len_buf = [0u8; 4];
	let mut filled = 0;
	while filled < len_buf.len() {
		let n = reader
			.read(&mut len_buf[filled..])
			.await
			.map_err(|e| Error::TransportError(format!("Failed to read length prefix: {e}")))?;
		if n == 0 {
			if filled == 0 {
				return Ok(None);
			}
			return Err(Error::TransportError(format!(
				"Failed to read length prefix: stream ended after {filled} of 4 bytes"
			)));
		}
		filled += n;
	}

	let length = u32::from_le_bytes(len_buf) as usize;
	if length > MAX_FRAME_LEN {
		return Err(Error::TransportError(format!(
			"Frame too large: {length} bytes (limit {MAX_FRAME_LEN})"
		)));
	}

	let mut body = vec![0u8; length];
	reader
		.read_exact(&mut body)
		.await
		.map_err(|e| Error::TransportError(format!("Failed to read message body: {e}")))?;
	Ok(Some(body))
}

/// Parses a frame body read by [`read_frame`].
pub fn decode_frame(body: &[u8]) -> Result<Value> {
	serde_json::from_slice(body)
		.map_err(|e| Error::ProtocolError(format!("Malformed frame body: {e}")))
}

/// Transport over any async writer/reader pair (stdio, sockets, duplex pipes).
pub struct PipeTransport<W, R> {
	sender: PipeTransportSender<W>,
	receiver: PipeTransportReceiver<R>,
}

impl<W, R> PipeTransport<W, R>
where
	W: AsyncWrite + Unpin + Send + 'static,
	R: AsyncRead + Unpin + Send + 'static,
{
	/// Creates the transport and the channel inbound messages are pushed to.
	pub fn new(writer: W, reader: R) -> (Self, mpsc::UnboundedReceiver<Value>) {
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		let transport = Self {
			sender: PipeTransportSender { writer },
			receiver: PipeTransportReceiver { reader, message_tx },
		};
		(transport, message_rx)
	}

	pub fn into_parts(self) -> (PipeTransportSender<W>, PipeTransportReceiver<R>) {
		(self.sender, self.receiver)
	}

	pub fn into_transport_parts(self, message_rx: mpsc::UnboundedReceiver<Value>) -> TransportParts {
		TransportParts {
			sender: Box::new(self.sender),
			receiver: Box::new(self.receiver),
			message_rx,
		}
	}

	/// Runs the read loop in place.
	pub async fn run(&mut self) -> Result<()> {
		self.receiver.read_loop().await
	}
}

/// Writing half of a [`PipeTransport`].
pub struct PipeTransportSender<W> {
	writer: W,
}

impl<W> PipeTransportSender<W>
where
	W: AsyncWrite + Unpin + Send,
{
	async fn write_frame(&mut self, message: &Value) -> Result<()> {
		let bytes = serde_json::to_vec(message)?;
		let length = u32::try_from(bytes.len()).map_err(|_| {
			Error::TransportError(format!("Message too large: {} bytes", bytes.len()))
		})?;

		self.writer.write_all(&length.to_le_bytes()).await?;
		self.writer.write_all(&bytes).await?;
		self.writer.flush().await?;
		Ok(())
	}
}

impl<W> Transport for PipeTransportSender<W>
where
	W: AsyncWrite + Unpin + Send,
{
	fn send(&mut self, message: Value) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { self.write_frame(&message).await })
	}
}

/// Reading half of a [`PipeTransport`].
pub struct PipeTransportReceiver<R> {
	reader: R,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl<R> PipeTransportReceiver<R>
where
	R: AsyncRead + Unpin + Send,
{
	async fn read_loop(&mut self) -> Result<()> {
		loop {
			let Some(body) = read_frame(&mut self.reader).await? else {
				tracing::debug!("Pipe closed by peer");
				return Ok(());
			};

			let message = match decode_frame(&body) {
				Ok(message) => message,
				Err(e) => {
					tracing::debug!(len = body.len(), "Skipping frame: {}", e);
					continue;
				}
			};
			if self.message_tx.send(message).is_err() {
				tracing::debug!("Inbound channel closed; stopping pipe reader");
				return Ok(());
			}
		}
	}
}

impl<R> TransportReceiver for PipeTransportReceiver<R>
where
	R: AsyncRead + Unpin + Send + 'static,
{
	fn run(mut self: Box<Self>) -> BoxFuture<'static, Result<()>> {
		Box::pin(async move { self.read_loop().await })
	}
}
