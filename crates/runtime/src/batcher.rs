//! Adaptive batching of outgoing events.
//!
//! The batcher is a two-state machine. In the idle state the first `push`
//! clears any stale buffer, moves to pending-flush and asks the caller to
//! schedule a flush after `delay_factor x last flush cost`. Later pushes only
//! append. A flush drains the whole buffer in arrival order, hands it to the
//! caller's sink, and records how long that took as the new flush cost.
//!
//! Flushes are serialized by a dedicated lock, so a batch that started
//! buffering while another was being flushed is never sent ahead of it.

use std::mem;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::BatchConfig;
use crate::value::HostValue;

/// An event waiting for the next flush.
#[derive(Debug, Clone)]
pub struct BufferedEvent {
	pub name: String,
	pub value: HostValue,
}

/// Result of one flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
	pub events: usize,
	pub elapsed: Duration,
}

struct BatchState {
	buffer: Vec<BufferedEvent>,
	pending: bool,
	timer: Option<JoinHandle<()>>,
	last_flush_cost: Duration,
}

/// Event buffer with a self-tuning flush delay.
pub struct EventBatcher {
	state: Mutex<BatchState>,
	flushing: Mutex<()>,
	delay_factor: u32,
}

impl EventBatcher {
	pub fn new(config: &BatchConfig) -> Self {
		Self {
			state: Mutex::new(BatchState {
				buffer: Vec::new(),
				pending: false,
				timer: None,
				last_flush_cost: config.initial_flush_cost(),
			}),
			flushing: Mutex::new(()),
			delay_factor: config.delay_factor,
		}
	}

	/// Appends an event.
	///
	/// Returns the delay after which the caller must flush when this push
	/// moved the batcher from idle to pending-flush, `None` otherwise.
	pub fn push(&self, name: String, value: HostValue) -> Option<Duration> {
		let mut state = self.state.lock();
		let schedule = if state.pending {
			None
		} else {
			state.buffer.clear();
			state.pending = true;
			Some(state.last_flush_cost * self.delay_factor)
		};
		state.buffer.push(BufferedEvent { name, value });
		schedule
	}

	/// Keeps the handle of the timer task that will flush the pending batch.
	pub fn set_timer(&self, timer: JoinHandle<()>) {
		let mut state = self.state.lock();
		if state.pending {
			state.timer = Some(timer);
		}
	}

	/// Aborts the scheduled flush timer, if any.
	pub fn cancel_timer(&self) {
		if let Some(timer) = self.state.lock().timer.take() {
			timer.abort();
		}
	}

	/// Drains the buffer into `sink` and returns to idle.
	///
	/// An empty buffer is not handed to `sink` and leaves the flush cost
	/// unchanged.
	pub fn flush_with<F>(&self, sink: F) -> FlushReport
	where
		F: FnOnce(Vec<BufferedEvent>),
	{
		let _flushing = self.flushing.lock();
		let events = {
			let mut state = self.state.lock();
			state.pending = false;
			state.timer = None;
			mem::take(&mut state.buffer)
		};
		if events.is_empty() {
			return FlushReport {
				events: 0,
				elapsed: Duration::ZERO,
			};
		}

		let count = events.len();
		let start = Instant::now();
		sink(events);
		let elapsed = start.elapsed();
		self.state.lock().last_flush_cost = elapsed;

		FlushReport {
			events: count,
			elapsed,
		}
	}

	/// Delay the next idle-to-pending transition will request.
	pub fn next_delay(&self) -> Duration {
		self.state.lock().last_flush_cost * self.delay_factor
	}

	pub fn last_flush_cost(&self) -> Duration {
		self.state.lock().last_flush_cost
	}

	pub fn is_pending(&self) -> bool {
		self.state.lock().pending
	}

	/// Number of buffered events.
	pub fn len(&self) -> usize {
		self.state.lock().buffer.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.lock().buffer.is_empty()
	}
}
