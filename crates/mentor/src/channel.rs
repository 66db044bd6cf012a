//! Duplex message channel between the controller and the surface.
//!
//! Each direction is an independent ordered stream of serialized frames.
//! Delivery is at-most-once with no acknowledgement; there is no causal
//! ordering between the two directions. Once either side closes the channel,
//! sends on both directions return `false` and receivers yield `None`.

use std::marker::PhantomData;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use xeno_mentor_proto::{InboundMessage, Message, OutboundMessage, codec};

use crate::error::MentorError;

/// Sending half of one direction.
pub struct Outlet<M> {
	tx: mpsc::UnboundedSender<String>,
	closed: CancellationToken,
	_message: PhantomData<fn(M)>,
}

impl<M> Clone for Outlet<M> {
	fn clone(&self) -> Self {
		Self {
			tx: self.tx.clone(),
			closed: self.closed.clone(),
			_message: PhantomData,
		}
	}
}

impl<M: Message> Outlet<M> {
	/// Encodes and enqueues `message`. Returns `false` if it was dropped.
	pub fn send(&self, message: &M) -> bool {
		let command = message.command();
		match codec::encode(message).map_err(MentorError::from) {
			Ok(frame) => self.enqueue(command, frame),
			Err(err) => {
				tracing::warn!(command, error = %err, "mentor.channel.encode_failed");
				false
			}
		}
	}

	/// Enqueues an already-serialized frame, as received from a real UI surface.
	///
	/// The frame is validated by the receiving side, not here.
	pub fn send_raw(&self, frame: impl Into<String>) -> bool {
		self.enqueue("<raw>", frame.into())
	}

	/// True once the channel is closed or the receiving side is gone.
	pub fn is_closed(&self) -> bool {
		self.closed.is_cancelled() || self.tx.is_closed()
	}

	fn enqueue(&self, command: &str, frame: String) -> bool {
		if self.closed.is_cancelled() {
			tracing::trace!(command, "mentor.channel.send_after_close");
			return false;
		}
		if self.tx.send(frame).is_err() {
			tracing::trace!(command, "mentor.channel.receiver_gone");
			return false;
		}
		true
	}
}

/// Receiving half of one direction.
pub struct Inlet<M> {
	rx: mpsc::UnboundedReceiver<String>,
	closed: CancellationToken,
	_message: PhantomData<fn() -> M>,
}

impl<M: Message> Inlet<M> {
	/// Waits for the next decodable message.
	///
	/// Frames with unknown discriminators and malformed frames are skipped.
	/// Returns `None` once the channel is closed or every sender is gone.
	/// Cancel-safe.
	pub async fn recv(&mut self) -> Option<M> {
		loop {
			let frame = tokio::select! {
				biased;
				_ = self.closed.cancelled() => return None,
				frame = self.rx.recv() => frame?,
			};
			if let Some(message) = decode_frame(&frame) {
				return Some(message);
			}
		}
	}

	/// Returns the next already-queued message, if any.
	pub fn try_recv(&mut self) -> Option<M> {
		if self.closed.is_cancelled() {
			return None;
		}
		loop {
			match self.rx.try_recv() {
				Ok(frame) => {
					if let Some(message) = decode_frame(&frame) {
						return Some(message);
					}
				}
				Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
			}
		}
	}
}

fn decode_frame<M: Message>(frame: &str) -> Option<M> {
	match codec::decode::<M>(frame) {
		Ok(Some(message)) => Some(message),
		Ok(None) => {
			tracing::trace!(frame, "mentor.channel.unknown_command");
			None
		}
		Err(err) => {
			tracing::debug!(error = %err, "mentor.channel.malformed_frame");
			None
		}
	}
}

/// Closes both directions of a channel.
#[derive(Clone)]
pub struct ChannelCloser {
	closed: CancellationToken,
}

impl ChannelCloser {
	/// Closes the channel. Idempotent.
	pub fn close(&self) {
		self.closed.cancel();
	}

	/// True once [`Self::close`] has been called by either side.
	pub fn is_closed(&self) -> bool {
		self.closed.is_cancelled()
	}
}

/// One side of a duplex channel: sends `Tx`, receives `Rx`.
pub struct Endpoint<Tx, Rx> {
	outlet: Outlet<Tx>,
	inlet: Inlet<Rx>,
	closer: ChannelCloser,
}

impl<Tx: Message, Rx: Message> Endpoint<Tx, Rx> {
	/// Sending half.
	pub fn outlet(&self) -> &Outlet<Tx> {
		&self.outlet
	}

	/// Receiving half.
	pub fn inlet_mut(&mut self) -> &mut Inlet<Rx> {
		&mut self.inlet
	}

	/// Handle that closes both directions.
	pub fn closer(&self) -> ChannelCloser {
		self.closer.clone()
	}

	/// Splits the endpoint into its parts.
	pub fn into_parts(self) -> (Outlet<Tx>, Inlet<Rx>, ChannelCloser) {
		(self.outlet, self.inlet, self.closer)
	}
}

/// Controller side: sends [`OutboundMessage`], receives [`InboundMessage`].
pub type ControllerEndpoint = Endpoint<OutboundMessage, InboundMessage>;

/// Surface side: sends [`InboundMessage`], receives [`OutboundMessage`].
pub type SurfaceEndpoint = Endpoint<InboundMessage, OutboundMessage>;

/// Creates a connected controller/surface endpoint pair.
pub fn duplex() -> (ControllerEndpoint, SurfaceEndpoint) {
	let closed = CancellationToken::new();
	let (to_surface_tx, to_surface_rx) = mpsc::unbounded_channel();
	let (to_controller_tx, to_controller_rx) = mpsc::unbounded_channel();

	let controller = Endpoint {
		outlet: Outlet {
			tx: to_surface_tx,
			closed: closed.clone(),
			_message: PhantomData,
		},
		inlet: Inlet {
			rx: to_controller_rx,
			closed: closed.clone(),
			_message: PhantomData,
		},
		closer: ChannelCloser { closed: closed.clone() },
	};
	let surface = Endpoint {
		outlet: Outlet {
			tx: to_controller_tx,
			closed: closed.clone(),
			_message: PhantomData,
		},
		inlet: Inlet {
			rx: to_surface_rx,
			closed: closed.clone(),
			_message: PhantomData,
		},
		closer: ChannelCloser { closed },
	};
	(controller, surface)
}
