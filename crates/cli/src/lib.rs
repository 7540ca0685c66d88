//! devbridge command-line tooling.
//!
//! Offline helpers over the bridge core: `sanitize` shows what an outgoing
//! payload looks like on the wire, `decode` replays a wire capture into what
//! the receiving side delivers to subscribers.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod styles;
