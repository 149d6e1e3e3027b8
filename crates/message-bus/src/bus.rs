//! # Bus
//!
//! The router. Holds the inbound queue every producer posts into and the
//! registry of terminals, and fans each message out to the terminals whose
//! subscriptions match its type tag.
//!
//! ## Fan-out
//!
//! ```text
//! for each matching terminal:
//!   ├─► refs += 1            (Delivery created)
//!   ├─► push into inbox
//!   │     ├─ Ok   ──► delivered
//!   │     └─ Full ──► refs -= 1 immediately (Delivery released)
//!   └─► next terminal
//! no match at all ──► message destroyed
//! ```
//!
//! The router holds its own claim on the message until the scan is done, so a
//! consumer releasing early on another thread cannot destroy it mid-fan-out.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::config::BusConfig;
use crate::error::{BusError, ConfigError, PostError};
use crate::message::Message;
use crate::metrics::{BusMetrics, MetricsSnapshot};
use crate::queue::{BoundedQueue, QueueDump};
use crate::terminal::{Endpoint, Terminal, TerminalId};

/// Outcome of fanning out one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    /// Terminals whose subscriptions matched.
    pub matched: usize,
    /// References that landed in an inbox.
    pub delivered: usize,
    /// References released because the inbox was full.
    pub dropped: usize,
}

impl FanOut {
    /// True when no terminal wanted the message.
    #[must_use]
    pub fn is_unrouted(&self) -> bool {
        self.matched == 0
    }
}

/// Totals for one [`Bus::drain_and_publish`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Messages popped from the inbound queue.
    pub messages: usize,
    pub delivered: usize,
    pub dropped: usize,
    /// Messages discarded because nobody subscribed.
    pub unrouted: usize,
}

impl DrainReport {
    fn absorb(&mut self, outcome: FanOut) {
        self.messages += 1;
        self.delivered += outcome.delivered;
        self.dropped += outcome.dropped;
        if outcome.is_unrouted() {
            self.unrouted += 1;
        }
    }
}

/// Central router for one messaging domain.
///
/// Cheap to clone; clones share the same inbound queue and registry.
pub struct Bus<P> {
    shared: Arc<BusShared<P>>,
}

pub(crate) struct BusShared<P> {
    config: BusConfig,
    inbound: Mutex<BoundedQueue<Message<P>>>,
    terminals: RwLock<HashMap<TerminalId, Arc<Endpoint<P>>>>,
    metrics: BusMetrics,
}

impl<P> Bus<P> {
    /// Create a bus with default queue sizes.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(BusConfig::default())
    }

    /// Create a bus with custom queue sizes.
    ///
    /// # Errors
    ///
    /// `ConfigError::ZeroCapacity` if either capacity is zero.
    pub fn with_config(config: BusConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: BusConfig) -> Self {
        Self {
            shared: Arc::new(BusShared {
                config,
                inbound: Mutex::new(BoundedQueue::new(config.inbound_capacity)),
                terminals: RwLock::new(HashMap::new()),
                metrics: BusMetrics::new(),
            }),
        }
    }

    /// Add `terminal` to the registry.
    ///
    /// Terminals register themselves on construction, so this only matters
    /// for re-registration. A duplicate is reported and ignored.
    ///
    /// # Errors
    ///
    /// - `BusError::AlreadyRegistered` - the terminal is already a member
    /// - `BusError::ForeignTerminal` - the terminal was built for another bus
    pub fn register(&self, terminal: &Terminal<P>) -> Result<(), BusError> {
        let endpoint = terminal.endpoint();
        if !endpoint.belongs_to(&self.shared) {
            warn!(terminal = %endpoint.id(), "Refusing terminal owned by another bus");
            return Err(BusError::ForeignTerminal { id: endpoint.id() });
        }
        self.shared.attach(Arc::clone(endpoint))
    }

    /// Pop the inbound queue until it is empty, fanning out every message.
    pub fn drain_and_publish(&self) -> DrainReport {
        let mut report = DrainReport::default();
        while let Some(message) = self.shared.pop_inbound() {
            report.absorb(self.shared.fan_out(message));
        }
        if report.messages > 0 {
            debug!(
                messages = report.messages,
                delivered = report.delivered,
                dropped = report.dropped,
                unrouted = report.unrouted,
                "Inbound queue drained"
            );
        }
        report
    }

    /// Fan out `message` directly, skipping the inbound queue.
    pub fn publish(&self, message: Message<P>) -> FanOut {
        self.shared.fan_out(message)
    }

    /// Number of registered terminals.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.shared.terminals.read().len()
    }

    /// Messages waiting in the inbound queue.
    #[must_use]
    pub fn inbound_len(&self) -> usize {
        self.shared.inbound.lock().len()
    }

    /// Slot listing of the inbound queue.
    #[must_use]
    pub fn dump_inbound(&self) -> QueueDump {
        self.shared.inbound.lock().dump()
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Zero every traffic counter. Queued messages are untouched.
    pub fn reset_metrics(&self) {
        self.shared.metrics.reset();
        debug!("Bus metrics reset");
    }

    #[must_use]
    pub fn config(&self) -> BusConfig {
        self.shared.config
    }

    pub(crate) fn shared(&self) -> &Arc<BusShared<P>> {
        &self.shared
    }
}

impl<P> Default for Bus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for Bus<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P> fmt::Debug for Bus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("config", &self.shared.config)
            .field("terminals", &self.terminal_count())
            .field("inbound_len", &self.inbound_len())
            .finish()
    }
}

impl<P> BusShared<P> {
    pub(crate) fn inbox_capacity(&self) -> usize {
        self.config.inbox_capacity
    }

    pub(crate) fn attach(&self, endpoint: Arc<Endpoint<P>>) -> Result<(), BusError> {
        let id = endpoint.id();
        match self.terminals.write().entry(id) {
            Entry::Occupied(_) => {
                warn!(terminal = %id, "Terminal already registered, ignoring");
                Err(BusError::AlreadyRegistered { id })
            }
            Entry::Vacant(slot) => {
                slot.insert(endpoint);
                debug!(terminal = %id, "Terminal registered");
                Ok(())
            }
        }
    }

    pub(crate) fn detach(&self, id: TerminalId) {
        if self.terminals.write().remove(&id).is_some() {
            debug!(terminal = %id, "Terminal unregistered");
        }
    }

    /// Queue a producer's message. No reference is counted here.
    pub(crate) fn enqueue(&self, message: Message<P>) -> Result<(), PostError<P>> {
        self.inbound.lock().push(message).map_err(|full| {
            self.metrics.record_inbound_rejected();
            let message = full.into_inner();
            warn!(kind = message.kind(), "Inbound queue full, post refused");
            PostError::InboundFull(message)
        })
    }

    fn pop_inbound(&self) -> Option<Message<P>> {
        self.inbound.lock().pop()
    }

    fn fan_out(&self, message: Message<P>) -> FanOut {
        let kind = message.kind();

        // Snapshot so registration never waits on inbox pushes.
        let targets: Vec<Arc<Endpoint<P>>> = self
            .terminals
            .read()
            .values()
            .filter(|endpoint| endpoint.matches(kind))
            .cloned()
            .collect();

        let mut outcome = FanOut {
            matched: targets.len(),
            ..FanOut::default()
        };

        for target in &targets {
            match target.offer(message.deliver()) {
                Ok(()) => outcome.delivered += 1,
                Err(full) => {
                    full.into_inner().release();
                    outcome.dropped += 1;
                    trace!(terminal = %target.id(), kind, "Inbox full, delivery released");
                }
            }
        }

        if outcome.is_unrouted() {
            trace!(kind, "No subscribers, message discarded");
        } else {
            debug!(
                kind,
                delivered = outcome.delivered,
                dropped = outcome.dropped,
                "Message published"
            );
        }

        self.metrics.record_fan_out(&outcome);
        outcome
    }
}
