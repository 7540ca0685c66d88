use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use super::*;

async fn write_frame(stream: &mut DuplexStream, message: &Value) {
	let bytes = serde_json::to_vec(message).unwrap();
	stream.write_all(&(bytes.len() as u32).to_le_bytes()).await.unwrap();
	stream.write_all(&bytes).await.unwrap();
	stream.flush().await.unwrap();
}

#[tokio::test]
async fn test_send_writes_length_prefixed_frame() {
	// One pipe per direction: the transport writes into `out`, reads from `inbound`.
	let (mut out_read, out_write) = tokio::io::duplex(1024);
	let (inbound_read, _inbound_write) = tokio::io::duplex(1024);

	let (transport, _rx) = PipeTransport::new(out_write, inbound_read);
	let (mut sender, _receiver) = transport.into_parts();

	let message = json!({"type": "event", "evt": "mount", "data": {"id": "n1"}, "cleaned": []});
	sender.send(message.clone()).await.unwrap();

	let mut len_buf = [0u8; 4];
	out_read.read_exact(&mut len_buf).await.unwrap();
	let length = u32::from_le_bytes(len_buf) as usize;
	assert_eq!(length, serde_json::to_vec(&message).unwrap().len());

	let mut body = vec![0u8; length];
	out_read.read_exact(&mut body).await.unwrap();
	let received: Value = serde_json::from_slice(&body).unwrap();
	assert_eq!(received, message);
}

#[tokio::test]
async fn test_multiple_messages_in_sequence() {
	let (_out_read, out_write) = tokio::io::duplex(4096);
	let (inbound_read, mut inbound_write) = tokio::io::duplex(4096);

	let (mut transport, mut rx) = PipeTransport::new(out_write, inbound_read);
	let read_task = tokio::spawn(async move { transport.run().await });

	let messages = vec![
		json!({"type": "inspect", "id": "a", "path": [], "callback": 0}),
		json!({"type": "callback", "id": 0, "args": [{}, [], null, []]}),
		json!({"type": "many-events", "events": []}),
	];
	for message in &messages {
		write_frame(&mut inbound_write, message).await;
	}

	for expected in &messages {
		let received = rx.recv().await.unwrap();
		assert_eq!(&received, expected);
	}

	drop(inbound_write);
	drop(rx);
	let _ = read_task.await;
}

#[tokio::test]
async fn test_large_message() {
	let (_out_read, out_write) = tokio::io::duplex(1024 * 1024);
	let (inbound_read, mut inbound_write) = tokio::io::duplex(1024 * 1024);

	let (mut transport, mut rx) = PipeTransport::new(out_write, inbound_read);
	let read_task = tokio::spawn(async move { transport.run().await });

	let message = json!({"type": "event", "evt": "log", "data": "x".repeat(100_000)});
	write_frame(&mut inbound_write, &message).await;

	let received = rx.recv().await.unwrap();
	assert_eq!(received, message);

	drop(inbound_write);
	drop(rx);
	let _ = read_task.await;
}

#[tokio::test]
async fn test_malformed_length_prefix() {
	let (_out_read, out_write) = tokio::io::duplex(1024);
	let (inbound_read, mut inbound_write) = tokio::io::duplex(1024);

	let (mut transport, _rx) = PipeTransport::new(out_write, inbound_read);

	// Two bytes of a four-byte prefix, then EOF.
	inbound_write.write_all(&[0x01, 0x02]).await.unwrap();
	inbound_write.flush().await.unwrap();
	drop(inbound_write);

	let result = transport.run().await;
	assert!(result.is_err());
	assert!(
		result
			.unwrap_err()
			.to_string()
			.contains("Failed to read length prefix")
	);
}

#[tokio::test]
async fn test_invalid_json_body_is_skipped() {
	let (_out_read, out_write) = tokio::io::duplex(1024);
	let (inbound_read, mut inbound_write) = tokio::io::duplex(1024);

	let (mut transport, mut rx) = PipeTransport::new(out_write, inbound_read);
	let read_task = tokio::spawn(async move { transport.run().await });

	inbound_write.write_all(&3u32.to_le_bytes()).await.unwrap();
	inbound_write.write_all(b"{{{").await.unwrap();
	let tick = json!({"type": "event", "evt": "tick", "data": 1, "cleaned": []});
	write_frame(&mut inbound_write, &tick).await;

	assert_eq!(rx.recv().await.unwrap(), tick);

	drop(inbound_write);
	assert!(read_task.await.unwrap().is_ok());
	assert!(rx.recv().await.is_none());
}

#[test]
fn test_decode_frame_reports_protocol_error() {
	assert!(matches!(decode_frame(b"{{{"), Err(crate::Error::ProtocolError(_))));
	assert_eq!(decode_frame(b"[1]").unwrap(), json!([1]));
}

#[tokio::test]
async fn test_oversized_frame_is_rejected() {
	let mut input = std::io::Cursor::new(u32::MAX.to_le_bytes().to_vec());
	let err = read_frame(&mut input).await.unwrap_err();
	assert!(err.to_string().contains("Frame too large"));
}

#[tokio::test]
async fn test_read_frame_tells_clean_end_from_truncation() {
	let mut empty = std::io::Cursor::new(Vec::new());
	assert!(read_frame(&mut empty).await.unwrap().is_none());

	let mut short_body = 10u32.to_le_bytes().to_vec();
	short_body.extend(b"{}");
	let err = read_frame(&mut std::io::Cursor::new(short_body)).await.unwrap_err();
	assert!(err.to_string().contains("Failed to read message body"));
}

#[tokio::test]
async fn test_peer_close_between_frames_ends_cleanly() {
	let (_out_read, out_write) = tokio::io::duplex(1024);
	let (inbound_read, inbound_write) = tokio::io::duplex(1024);

	let (transport, message_rx) = PipeTransport::new(out_write, inbound_read);
	let parts = transport.into_transport_parts(message_rx);
	drop(inbound_write);

	assert!(parts.receiver.run().await.is_ok());
}

#[tokio::test]
async fn test_peer_close_mid_frame_is_a_disconnect() {
	let (_out_read, out_write) = tokio::io::duplex(1024);
	let (inbound_read, mut inbound_write) = tokio::io::duplex(1024);

	let (transport, message_rx) = PipeTransport::new(out_write, inbound_read);
	let parts = transport.into_transport_parts(message_rx);
	inbound_write.write_all(&8u32.to_le_bytes()).await.unwrap();
	inbound_write.write_all(b"{").await.unwrap();
	drop(inbound_write);

	assert!(parts.receiver.run().await.unwrap_err().is_disconnect());
}

#[tokio::test]
async fn test_dropped_inbound_channel_stops_reader() {
	let (_out_read, out_write) = tokio::io::duplex(1024);
	let (inbound_read, mut inbound_write) = tokio::io::duplex(1024);

	let (mut transport, rx) = PipeTransport::new(out_write, inbound_read);
	drop(rx);

	write_frame(&mut inbound_write, &json!({"type": "event", "evt": "late"})).await;
	assert!(transport.run().await.is_ok());
}

#[tokio::test]
async fn test_memory_pair_delivers_both_ways() {
	let (left, right) = MemoryTransport::pair();
	let TransportParts {
		sender: mut left_sender,
		receiver: left_receiver,
		message_rx: mut left_rx,
	} = left;
	let TransportParts {
		sender: mut right_sender,
		message_rx: mut right_rx,
		..
	} = right;

	left_sender.send(json!({"from": "left"})).await.unwrap();
	right_sender.send(json!({"from": "right"})).await.unwrap();

	assert_eq!(right_rx.recv().await.unwrap(), json!({"from": "left"}));
	assert_eq!(left_rx.recv().await.unwrap(), json!({"from": "right"}));
	assert!(left_receiver.run().await.is_ok());
}

#[tokio::test]
async fn test_memory_send_to_closed_peer_fails() {
	let (left, right) = MemoryTransport::pair();
	let mut sender = left.sender;
	drop(right);

	let err = sender.send(json!({})).await.unwrap_err();
	assert!(matches!(err, crate::Error::ChannelClosed));
}
