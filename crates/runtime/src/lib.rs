//! devbridge runtime - sanitizing, inspection, batching and dispatch
//!
//! This crate implements one endpoint of the object-graph bridge:
//!
//! - **Sanitizer**: turns a host value into a transport-safe JSON copy,
//!   replacing functions, class instances and over-deep containers with
//!   descriptors and recording where it did so
//! - **Registries**: roots the peer may inspect, and local inspect requests
//!   awaiting a response
//! - **Batcher**: coalesces events into `many-events` messages on an
//!   adaptive delay
//! - **Bridge**: ties the above to a [`Transport`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Bridge                       │
//! │  send ──► EventBatcher ──┐   │
//! │  send_one ───────────────┤   │
//! │            Sanitizer ◄───┘   │
//! │  inspect ─► CallbackRegistry │
//! │  peer inspect ─► Inspection  │
//! │                  Service ◄── InspectableRegistry
//! └──────────────┬───────────────┘
//!                │ JSON messages
//!          ┌─────▼─────┐
//!          │ Transport │  pipe / in-memory
//!          └───────────┘
//! ```

pub mod batcher;
pub mod bridge;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod inspect;
pub mod registry;
pub mod sanitize;
pub mod transport;
pub mod value;

pub use batcher::{BufferedEvent, EventBatcher, FlushReport};
pub use bridge::{Bridge, HandlerId};
pub use callbacks::CallbackRegistry;
pub use config::{BatchConfig, BridgeConfig};
pub use error::{Error, Result};
pub use inspect::InspectionService;
pub use registry::InspectableRegistry;
pub use sanitize::{SanitizeLimits, Sanitized, Sanitizer, sanitize};
pub use transport::{
	MAX_FRAME_LEN, MemoryTransport, MemoryTransportReceiver, MemoryTransportSender, PipeTransport,
	PipeTransportReceiver, PipeTransportSender, Transport, TransportParts, TransportReceiver,
	decode_frame, read_frame,
};
pub use value::{HostNode, HostObject, HostValue, Shape};
