//! The bridge endpoint.
//!
//! A [`Bridge`] owns both directions of the protocol for one side of a
//! transport:
//!
//! - outgoing events are sanitized, and their roots registered for later
//!   inspection whenever something had to be replaced;
//! - `inspect` requests from the peer are answered from the registry;
//! - `inspect` requests made locally are correlated with the peer's
//!   `callback` through the [`CallbackRegistry`];
//! - incoming events are hydrated and fanned out to subscribers.
//!
//! # Tasks
//!
//! [`Bridge::attach`] spawns a reader (the transport's receive loop), a
//! single writer draining the outbound queue so messages leave in the order
//! they were posted, and a dispatch loop feeding [`Bridge::handle_message`].
//! Messages posted before `attach` wait in the outbound queue. Spawned tasks
//! only hold weak references to the bridge.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use devbridge_protocol::{EventPayload, Message, Path, hydrate};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::batcher::EventBatcher;
use crate::callbacks::CallbackRegistry;
use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::inspect::InspectionService;
use crate::registry::InspectableRegistry;
use crate::sanitize::{Sanitized, Sanitizer};
use crate::transport::TransportParts;
use crate::value::HostValue;

/// Handle returned by [`Bridge::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// One endpoint of the object-graph bridge.
pub struct Bridge {
	config: BridgeConfig,
	sanitizer: Sanitizer,
	inspection: InspectionService,
	inspectables: InspectableRegistry,
	callbacks: CallbackRegistry,
	batcher: EventBatcher,
	listeners: Mutex<HashMap<String, IndexMap<HandlerId, Listener>>>,
	last_handler_id: AtomicU64,
	outbound_tx: mpsc::UnboundedSender<Value>,
	/// Taken by `attach` to start the writer task.
	outbound_rx: Mutex<Option<mpsc::UnboundedReceiver<Value>>>,
	tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Bridge {
	pub fn new(config: BridgeConfig) -> Arc<Self> {
		let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
		let sanitizer = Sanitizer::new(config.limits);

		Arc::new(Self {
			config,
			sanitizer,
			inspection: InspectionService::new(sanitizer),
			inspectables: InspectableRegistry::new(),
			callbacks: CallbackRegistry::new(),
			batcher: EventBatcher::new(&config.batch),
			listeners: Mutex::new(HashMap::new()),
			last_handler_id: AtomicU64::new(0),
			outbound_tx,
			outbound_rx: Mutex::new(Some(outbound_rx)),
			tasks: Mutex::new(Vec::new()),
		})
	}

	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	/// Roots the peer can currently inspect.
	pub fn inspectables(&self) -> &InspectableRegistry {
		&self.inspectables
	}

	/// Number of local `inspect` calls still waiting for the peer.
	pub fn pending_inspections(&self) -> usize {
		self.callbacks.len()
	}

	pub fn is_attached(&self) -> bool {
		self.outbound_rx.lock().is_none()
	}

	/// Connects the bridge to a transport and starts its tasks.
	///
	/// Must be called from within a Tokio runtime. A bridge attaches once;
	/// later calls return [`Error::AlreadyAttached`].
	pub fn attach(self: &Arc<Self>, parts: TransportParts) -> Result<()> {
		let Some(mut outbound_rx) = self.outbound_rx.lock().take() else {
			return Err(Error::AlreadyAttached);
		};
		let TransportParts {
			mut sender,
			receiver,
			mut message_rx,
		} = parts;

		let reader = tokio::spawn(async move {
			if let Err(e) = receiver.run().await {
				tracing::error!("Transport read error: {}", e);
			}
		});

		// Detached: it stops on its own once the bridge drops the outbound sender.
		tokio::spawn(async move {
			while let Some(message) = outbound_rx.recv().await {
				if let Err(e) = sender.send(message).await {
					tracing::error!("Transport write error: {}", e);
					break;
				}
			}
		});

		let bridge = Arc::downgrade(self);
		let dispatch = tokio::spawn(async move {
			while let Some(value) = message_rx.recv().await {
				let Some(bridge) = bridge.upgrade() else {
					break;
				};
				bridge.handle_message(value);
			}
			tracing::debug!("Inbound channel closed; dispatch loop finished");
		});

		self.tasks.lock().extend([reader, dispatch]);
		tracing::debug!("Bridge attached");
		Ok(())
	}

	/// Asks the peer for the value at `path` under root `id`.
	///
	/// `callback` receives the hydrated own fields, with one prototype level
	/// under `__proto__` when the peer sent one. It runs on the dispatch task
	/// and never runs if the peer does not answer.
	pub fn inspect<F>(&self, id: &str, path: Path, callback: F)
	where
		F: FnOnce(Value) + Send + 'static,
	{
		let callback_id = self
			.callbacks
			.register(move |args| callback(args.into_hydrated()));
		tracing::debug!(id, callback = callback_id, "Sending inspect request");
		self.post(&Message::Inspect {
			id: id.to_string(),
			path,
			callback: callback_id,
		});
	}

	/// Awaitable form of [`inspect`](Self::inspect).
	pub async fn inspect_value(&self, id: &str, path: Path) -> Result<Value> {
		let (tx, rx) = oneshot::channel();
		self.inspect(id, path, move |value| {
			let _ = tx.send(value);
		});
		rx.await.map_err(|_| Error::ChannelClosed)
	}

	/// Queues an event for the next batched flush.
	///
	/// The first event after a flush schedules the next one; outside a Tokio
	/// runtime the batch is flushed immediately.
	pub fn send(self: &Arc<Self>, evt: &str, data: impl Into<HostValue>) {
		let Some(delay) = self.batcher.push(evt.to_string(), data.into()) else {
			return;
		};

		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				let bridge: Weak<Self> = Arc::downgrade(self);
				let timer = handle.spawn(async move {
					tokio::time::sleep(delay).await;
					if let Some(bridge) = bridge.upgrade() {
						bridge.flush_batch();
					}
				});
				self.batcher.set_timer(timer);
			}
			Err(_) => {
				tracing::debug!("No Tokio runtime; flushing event batch immediately");
				self.flush_batch();
			}
		}
	}

	/// Flushes buffered events now, cancelling the scheduled flush.
	///
	/// Returns the number of events sent.
	pub fn flush(&self) -> usize {
		self.batcher.cancel_timer();
		self.flush_batch()
	}

	/// Sends one `event` message right away, bypassing the batch.
	pub fn send_one(&self, evt: &str, data: impl Into<HostValue>) {
		let start = Instant::now();
		let payload = self.prepare_event(evt.to_string(), &data.into());
		self.post(&Message::Event(payload));
		tracing::trace!(evt, elapsed = ?start.elapsed(), "Sent single event");
	}

	/// Drops the root registered under `id`. Returns whether one existed.
	pub fn forget(&self, id: &str) -> bool {
		let removed = self.inspectables.forget(id);
		tracing::debug!(id, removed, "Forgot inspectable root");
		removed
	}

	/// Subscribes `listener` to incoming events named `evt`.
	///
	/// Listeners for one event run in subscription order with the hydrated
	/// payload.
	pub fn on<F>(&self, evt: &str, listener: F) -> HandlerId
	where
		F: Fn(&Value) + Send + Sync + 'static,
	{
		let id = HandlerId(self.last_handler_id.fetch_add(1, Ordering::SeqCst));
		self.listeners
			.lock()
			.entry(evt.to_string())
			.or_default()
			.insert(id, Arc::new(listener));
		id
	}

	/// Removes a listener. Returns whether it was subscribed.
	pub fn off(&self, id: HandlerId) -> bool {
		let mut listeners = self.listeners.lock();
		let Some(evt) = listeners
			.iter_mut()
			.find_map(|(evt, handlers)| handlers.shift_remove(&id).map(|_| evt.clone()))
		else {
			return false;
		};
		if listeners.get(&evt).is_some_and(IndexMap::is_empty) {
			listeners.remove(&evt);
		}
		true
	}

	/// Dispatches one inbound wire message.
	///
	/// Malformed messages and unknown types are logged and dropped.
	pub fn handle_message(&self, raw: Value) {
		let kind = raw
			.get("type")
			.and_then(Value::as_str)
			.map(str::to_owned);
		let message = match serde_json::from_value::<Message>(raw) {
			Ok(message) => message,
			Err(e) => {
				tracing::debug!(?kind, "Failed to parse message (ignored): {}", e);
				return;
			}
		};

		match message {
			Message::Inspect { id, path, callback } => {
				let args = self.inspection.resolve(&self.inspectables, &id, &path);
				self.post(&Message::Callback { id: callback, args });
			}
			Message::Callback { id, args } => {
				self.callbacks.resolve(id, args);
			}
			Message::Event(payload) => self.emit(payload),
			Message::ManyEvents { events } => {
				for payload in events {
					self.emit(payload);
				}
			}
			Message::Unknown => {
				tracing::debug!(?kind, "Unknown message type (forward-compatible, ignored)");
			}
		}
	}

	fn flush_batch(&self) -> usize {
		let report = self.batcher.flush_with(|events| {
			let events = events
				.into_iter()
				.map(|event| self.prepare_event(event.name, &event.value))
				.collect();
			self.post(&Message::ManyEvents { events });
		});
		if report.events > 0 {
			tracing::debug!(
				events = report.events,
				elapsed = ?report.elapsed,
				next_delay = ?self.batcher.next_delay(),
				"Flushed event batch"
			);
		}
		report.events
	}

	/// Sanitizes an outgoing event, registering its root when anything was
	/// replaced so the peer can inspect it.
	fn prepare_event(&self, evt: String, value: &HostValue) -> EventPayload {
		let Sanitized { value: data, cleaned } = self.sanitizer.sanitize(value);
		if !cleaned.is_empty() {
			match value.root_id() {
				Some(id) => self.inspectables.insert(&id, value.clone()),
				None => tracing::debug!(evt, "Payload has replaced values but no id; not inspectable"),
			}
		}
		EventPayload::new(evt, data, cleaned)
	}

	fn emit(&self, payload: EventPayload) {
		let EventPayload {
			evt,
			mut data,
			cleaned,
		} = payload;
		if let Some(cleaned) = &cleaned {
			hydrate(&mut data, cleaned);
		}

		// Snapshot so listeners may subscribe or unsubscribe while running.
		let listeners: Vec<Listener> = self
			.listeners
			.lock()
			.get(&evt)
			.map(|handlers| handlers.values().cloned().collect())
			.unwrap_or_default();
		if listeners.is_empty() {
			tracing::trace!(evt, "Event without listeners");
			return;
		}
		for listener in listeners {
			listener(&data);
		}
	}

	fn post(&self, message: &Message) {
		let value = match serde_json::to_value(message) {
			Ok(value) => value,
			Err(e) => {
				tracing::error!(kind = message.kind(), "Failed to serialize message: {}", e);
				return;
			}
		};
		if self.outbound_tx.send(value).is_err() {
			tracing::error!(kind = message.kind(), "Failed to queue message: outbound channel closed");
		}
	}
}

impl fmt::Debug for Bridge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Bridge")
			.field("config", &self.config)
			.field("attached", &self.is_attached())
			.field("inspectables", &self.inspectables.len())
			.field("pending_inspections", &self.callbacks.len())
			.field("buffered_events", &self.batcher.len())
			.finish()
	}
}

impl Drop for Bridge {
	fn drop(&mut self) {
		self.batcher.cancel_timer();
		for task in self.tasks.get_mut().drain(..) {
			task.abort();
		}
	}
}
