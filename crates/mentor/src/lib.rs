//! Mentor panel core.
//!
//! A single-instance companion panel embedded in the editor: a chat surface
//! plus a learning journal that reacts to live diagnostics. This crate owns the
//! panel lifecycle and the message protocol; rendering and reply generation
//! live elsewhere.
//!
//! * [`PanelController`]: singleton surface ownership and message routing
//! * [`channel`]: duplex, ordered-per-direction, at-most-once message channel
//! * [`DiagnosticsAdapter`]: host diagnostics as 1-based findings plus change events
//! * [`ReplyService`]: asynchronous assistant replies, with a stub implementation
//! * [`HeadlessSurface`]: reference surface used by terminal frontends and tests

#![warn(missing_docs)]

pub mod channel;
pub mod commands;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod reply;
pub mod surface;
pub mod task;

pub use commands::{ActionOutcome, MentorAction};
pub use config::MentorConfig;
pub use controller::{ExplainOutcome, PanelController, ShowOutcome};
pub use diagnostics::{DiagnosticsAdapter, DiagnosticsEvent, DiagnosticsListener, DocumentId};
pub use error::{MentorError, Result};
pub use host::{Host, Placement, SurfacePort, SurfaceSpec, SurfaceView};
pub use reply::{ReplyService, StubReplyService};
pub use surface::{HeadlessSurface, SurfaceState};
pub use xeno_mentor_proto as proto;
