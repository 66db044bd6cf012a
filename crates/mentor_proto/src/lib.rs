//! Wire protocol for the mentor panel.
//!
//! The controller and the surface never share state; everything crosses the
//! message channel as a serialized value keyed by a `command` discriminator.
//! This crate owns both directions of that taxonomy plus the codec that turns
//! raw frames back into typed messages.

#![warn(missing_docs)]

pub mod codec;
pub mod types;

pub use codec::{CodecError, Message, Result, decode, encode};
pub use types::{
	ChatMessage, ErrorFinding, FindingCode, InboundMessage, OutboundMessage, PersistedState, ResponseMode, Tab,
};
