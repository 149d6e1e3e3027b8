//! # Terminal
//!
//! An endpoint on a bus. Producers post through a terminal into the bus
//! inbound queue; consumers read deliveries out of the terminal's own inbox.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::bus::{Bus, BusShared};
use crate::error::PostError;
use crate::message::{Delivery, Message, WILDCARD};
use crate::queue::{BoundedQueue, QueueDump, QueueFull};

/// Unique identity of a terminal within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalId(Uuid);

impl TerminalId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The part of a terminal the bus keeps in its registry.
pub(crate) struct Endpoint<P> {
    id: TerminalId,
    label: Option<String>,
    /// Set once at construction; the bus owns us, not the other way round.
    bus: Weak<BusShared<P>>,
    inbox: Mutex<BoundedQueue<Delivery<P>>>,
    subscriptions: RwLock<HashSet<String>>,
}

impl<P> Endpoint<P> {
    pub(crate) fn id(&self) -> TerminalId {
        self.id
    }

    /// Fan-out matching: exact tag or the wildcard.
    pub(crate) fn matches(&self, kind: &str) -> bool {
        let subscriptions = self.subscriptions.read();
        subscriptions.contains(kind) || subscriptions.contains(WILDCARD)
    }

    pub(crate) fn offer(&self, delivery: Delivery<P>) -> Result<(), QueueFull<Delivery<P>>> {
        self.inbox.lock().push(delivery)
    }

    pub(crate) fn belongs_to(&self, bus: &Arc<BusShared<P>>) -> bool {
        std::ptr::eq(self.bus.as_ptr(), Arc::as_ptr(bus))
    }
}

/// Subscriber/producer endpoint with a private bounded inbox.
///
/// A terminal registers with exactly one bus when it is created and stays
/// registered until it is dropped. Dropping it unregisters it and releases
/// every delivery still waiting in its inbox.
///
/// ## Example
///
/// ```
/// use message_bus::{Bus, Message, Terminal};
///
/// let bus = Bus::new();
/// let hud = Terminal::named(&bus, "hud");
/// hud.subscribe("score");
///
/// hud.post(Message::new("score", 100u32)).unwrap();
/// bus.drain_and_publish();
///
/// let delivery = hud.get_message().unwrap();
/// assert_eq!(delivery.payload(), Some(&100));
/// delivery.release();
/// ```
pub struct Terminal<P> {
    endpoint: Arc<Endpoint<P>>,
}

impl<P> Terminal<P> {
    /// Create a terminal and register it with `bus`.
    #[must_use]
    pub fn new(bus: &Bus<P>) -> Self {
        Self::build(bus, None)
    }

    /// Like [`new`](Self::new), with a label that shows up in logs.
    #[must_use]
    pub fn named(bus: &Bus<P>, label: impl Into<String>) -> Self {
        Self::build(bus, Some(label.into()))
    }

    fn build(bus: &Bus<P>, label: Option<String>) -> Self {
        let shared = bus.shared();
        let endpoint = Arc::new(Endpoint {
            id: TerminalId::new(),
            label,
            bus: Arc::downgrade(shared),
            inbox: Mutex::new(BoundedQueue::new(shared.inbox_capacity())),
            subscriptions: RwLock::new(HashSet::new()),
        });
        let terminal = Self { endpoint };

        // Fresh id, built for this bus: registration cannot fail.
        let _ = bus.register(&terminal);
        terminal
    }

    #[must_use]
    pub fn id(&self) -> TerminalId {
        self.endpoint.id
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.endpoint.label.as_deref()
    }

    /// Put `message` on the bus inbound queue.
    ///
    /// Nothing is delivered until the bus drains. No reference is counted
    /// here; fan-out does all the counting.
    ///
    /// # Errors
    ///
    /// - `PostError::InboundFull` - the inbound queue is at capacity
    /// - `PostError::BusClosed` - the bus has been dropped
    ///
    /// Both carry the message back to the caller.
    pub fn post(&self, message: Message<P>) -> Result<(), PostError<P>> {
        match self.endpoint.bus.upgrade() {
            Some(bus) => bus.enqueue(message),
            None => Err(PostError::BusClosed(message)),
        }
    }

    /// Pop the oldest delivery from this terminal's inbox.
    ///
    /// The caller now holds one reference and must release it (explicitly or
    /// by dropping it) when done with the payload.
    pub fn get_message(&self) -> Option<Delivery<P>> {
        self.endpoint.inbox.lock().pop()
    }

    /// Ask for messages tagged `kind`. Subscribing twice is a no-op.
    pub fn subscribe(&self, kind: impl Into<String>) {
        self.endpoint.subscriptions.write().insert(kind.into());
    }

    /// Stop future deliveries of `kind`. Already queued deliveries stay.
    pub fn unsubscribe(&self, kind: &str) {
        self.endpoint.subscriptions.write().remove(kind);
    }

    /// Exact membership test; `"All"` only matches itself here.
    #[must_use]
    pub fn is_subscribed(&self, kind: &str) -> bool {
        self.endpoint.subscriptions.read().contains(kind)
    }

    /// Current subscriptions, sorted.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.endpoint.subscriptions.read().iter().cloned().collect();
        kinds.sort();
        kinds
    }

    #[must_use]
    pub fn inbox_len(&self) -> usize {
        self.endpoint.inbox.lock().len()
    }

    #[must_use]
    pub fn inbox_capacity(&self) -> usize {
        self.endpoint.inbox.lock().capacity()
    }

    /// Slot listing of this terminal's inbox.
    #[must_use]
    pub fn dump_inbox(&self) -> QueueDump {
        self.endpoint.inbox.lock().dump()
    }

    pub(crate) fn endpoint(&self) -> &Arc<Endpoint<P>> {
        &self.endpoint
    }
}

impl<P> Drop for Terminal<P> {
    fn drop(&mut self) {
        if let Some(bus) = self.endpoint.bus.upgrade() {
            bus.detach(self.endpoint.id);
        }
    }
}

impl<P> fmt::Debug for Terminal<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("id", &self.endpoint.id)
            .field("label", &self.endpoint.label)
            .field("inbox_len", &self.inbox_len())
            .finish()
    }
}
