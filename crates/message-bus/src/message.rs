//! # Messages
//!
//! A [`Message`] is a type tag plus an optional opaque payload. The bus never
//! looks inside the payload; it only routes on the tag.
//!
//! ## Ownership
//!
//! ```text
//! producer ──Message──► bus inbound ──fan-out──► Delivery ──► terminal inbox
//!                                         │
//!                                         └────► Delivery ──► terminal inbox
//! ```
//!
//! Every [`Delivery`] is one counted reference to the same envelope. The
//! payload is cleaned up exactly once, when the last reference goes away.
//! A delivery releases its reference on [`Delivery::release`] or on drop, so
//! a reference can be neither released twice nor leaked.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::queue::Tagged;

/// Tag that matches every message type during fan-out.
pub const WILDCARD: &str = "All";

type Cleanup<P> = Box<dyn FnOnce(P) + Send + Sync>;

/// Shared state behind a message and all of its deliveries.
struct Envelope<P> {
    kind: String,
    payload: Option<P>,
    cleanup: Option<Cleanup<P>>,
    /// Outstanding deliveries.
    refs: AtomicUsize,
}

impl<P> Drop for Envelope<P> {
    fn drop(&mut self) {
        if let (Some(payload), Some(cleanup)) = (self.payload.take(), self.cleanup.take()) {
            cleanup(payload);
        }
    }
}

/// A tagged unit of data posted to the bus.
///
/// Dropping a message that was never delivered destroys it, running the
/// cleanup hook if one was supplied.
pub struct Message<P> {
    envelope: Arc<Envelope<P>>,
}

impl<P> Message<P> {
    /// Create a message carrying `payload`.
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: P) -> Self {
        Self::build(kind.into(), Some(payload), None)
    }

    /// Create a message with no payload.
    #[must_use]
    pub fn signal(kind: impl Into<String>) -> Self {
        Self::build(kind.into(), None, None)
    }

    /// Create a message whose payload is handed to `cleanup` when the last
    /// reference is released.
    #[must_use]
    pub fn with_cleanup<F>(kind: impl Into<String>, payload: P, cleanup: F) -> Self
    where
        F: FnOnce(P) + Send + Sync + 'static,
    {
        Self::build(kind.into(), Some(payload), Some(Box::new(cleanup)))
    }

    fn build(kind: String, payload: Option<P>, cleanup: Option<Cleanup<P>>) -> Self {
        Self {
            envelope: Arc::new(Envelope {
                kind,
                payload,
                cleanup,
                refs: AtomicUsize::new(0),
            }),
        }
    }

    /// The message type tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.envelope.kind
    }

    /// The payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.envelope.payload.as_ref()
    }

    /// Number of deliveries currently holding this message.
    #[must_use]
    pub fn active_refs(&self) -> usize {
        self.envelope.refs.load(Ordering::Acquire)
    }

    /// Hand out one counted reference. Only the bus delivery path calls this.
    pub(crate) fn deliver(&self) -> Delivery<P> {
        self.envelope.refs.fetch_add(1, Ordering::AcqRel);
        Delivery {
            envelope: Arc::clone(&self.envelope),
        }
    }
}

impl<P> fmt::Debug for Message<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("kind", &self.kind())
            .field("has_payload", &self.envelope.payload.is_some())
            .field("active_refs", &self.active_refs())
            .finish()
    }
}

impl<P> Tagged for Message<P> {
    fn tag(&self) -> &str {
        self.kind()
    }
}

/// One terminal's reference to a published message.
///
/// Returned by [`Terminal::get_message`](crate::Terminal::get_message). The
/// consumer must release it exactly once when done with the payload; that is
/// what [`release`](Self::release) and `Drop` both do.
pub struct Delivery<P> {
    envelope: Arc<Envelope<P>>,
}

impl<P> Delivery<P> {
    /// The message type tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.envelope.kind
    }

    /// The shared payload. Recipients only ever get read access.
    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.envelope.payload.as_ref()
    }

    /// Number of deliveries (this one included) still holding the message.
    #[must_use]
    pub fn active_refs(&self) -> usize {
        self.envelope.refs.load(Ordering::Acquire)
    }

    /// Give up this reference. Destroys the message if it was the last one.
    pub fn release(self) {
        drop(self);
    }
}

impl<P> Drop for Delivery<P> {
    fn drop(&mut self) {
        self.envelope.refs.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<P> fmt::Debug for Delivery<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("kind", &self.kind())
            .field("active_refs", &self.active_refs())
            .finish()
    }
}

impl<P> Tagged for Delivery<P> {
    fn tag(&self) -> &str {
        self.kind()
    }
}
