//! Wire types for the devbridge protocol.
//!
//! This crate holds everything both endpoints must agree on:
//!
//! - [`Path`] / [`PathSegment`] - locations inside nested values
//! - [`Descriptor`] / [`Placeholder`] - stand-ins for replaced subtrees
//! - [`Message`] - the tagged union carried by the transport
//! - [`hydrate`] - receiving-side placeholder substitution

pub mod descriptor;
pub mod hydrate;
pub mod message;
pub mod path;

pub use descriptor::{
	ContainerKind, Descriptor, DescriptorKind, ELLIPSIS, FRAGMENT_PLACEHOLDER, PROTO_KEY,
	Placeholder,
};
pub use hydrate::hydrate;
pub use message::{CallbackArgs, CallbackId, EventPayload, Message};
pub use path::{Path, PathSegment, get_in, get_in_mut};
