//! # Tick Loop
//!
//! One bus, one producer and three consumers driven a tick at a time:
//!
//! ```text
//! tick N
//!   ├─► producer posts this tick's events    (bus inbound)
//!   ├─► bus.drain_and_publish()              (fan-out to inboxes)
//!   └─► each consumer reads + releases       (recorder only on even ticks)
//! ```
//!
//! The recorder subscribes to everything but only drains every other tick,
//! so its inbox fills up and the bus starts dropping deliveries to it while
//! the other consumers keep receiving theirs.

use message_bus::{Bus, Message, MetricsSnapshot, Terminal, WILDCARD};
use tracing::{debug, info, trace, warn};

use crate::config::RuntimeConfig;

pub const KIND_SCORE: &str = "score";
pub const KIND_EXPLOSION: &str = "explosion";
pub const KIND_ALERT: &str = "alert";

/// Payload carried by demo messages.
#[derive(Debug, Clone, PartialEq)]
pub enum DemoEvent {
    Score { points: u64 },
    Explosion { x: i64, y: i64 },
    Alert(String),
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub posted: usize,
    pub rejected: usize,
    pub delivered: usize,
    pub dropped: usize,
    pub consumed: usize,
}

/// Owns the bus and its terminals for the lifetime of the loop.
pub struct BusRuntime {
    bus: Bus<DemoEvent>,
    producer: Terminal<DemoEvent>,
    hud: Terminal<DemoEvent>,
    audio: Terminal<DemoEvent>,
    recorder: Terminal<DemoEvent>,
    tick: u64,
}

impl BusRuntime {
    pub fn new(config: &RuntimeConfig) -> anyhow::Result<Self> {
        let bus = Bus::with_config(config.bus)?;

        let producer = Terminal::named(&bus, "game");
        let hud = Terminal::named(&bus, "hud");
        hud.subscribe(KIND_SCORE);
        let audio = Terminal::named(&bus, "audio");
        audio.subscribe(KIND_EXPLOSION);
        audio.subscribe(KIND_ALERT);
        let recorder = Terminal::named(&bus, "recorder");
        recorder.subscribe(WILDCARD);

        info!(
            terminals = bus.terminal_count(),
            inbound_capacity = config.bus.inbound_capacity,
            inbox_capacity = config.bus.inbox_capacity,
            "Bus runtime ready"
        );

        Ok(Self {
            bus,
            producer,
            hud,
            audio,
            recorder,
            tick: 0,
        })
    }

    /// Run one update: post, drain, consume.
    pub fn tick(&mut self) -> TickSummary {
        self.tick += 1;
        let mut summary = TickSummary::default();

        for message in events_for_tick(self.tick) {
            match self.producer.post(message) {
                Ok(()) => summary.posted += 1,
                Err(err) => {
                    summary.rejected += 1;
                    let reason = err.to_string();
                    let message = err.into_message();
                    warn!(kind = message.kind(), %reason, "Dropping unposted message");
                }
            }
        }

        let report = self.bus.drain_and_publish();
        summary.delivered = report.delivered;
        summary.dropped = report.dropped;

        summary.consumed += consume(&self.hud);
        summary.consumed += consume(&self.audio);
        if self.tick % 2 == 0 {
            summary.consumed += consume(&self.recorder);
        }

        debug!(tick = self.tick, ?summary, "Tick complete");
        summary
    }

    pub fn ticks_run(&self) -> u64 {
        self.tick
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.bus.metrics()
    }

    pub fn bus(&self) -> &Bus<DemoEvent> {
        &self.bus
    }

    /// Inbox slot listings for every consumer, for diagnostics.
    pub fn dump_inboxes(&self) -> String {
        [&self.hud, &self.audio, &self.recorder]
            .iter()
            .map(|t| format!("[{}]\n{}", t.label().unwrap_or("?"), t.dump_inbox()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Events the producer posts on `tick`.
fn events_for_tick(tick: u64) -> Vec<Message<DemoEvent>> {
    let mut events = vec![Message::new(
        KIND_SCORE,
        DemoEvent::Score {
            points: tick.saturating_mul(10),
        },
    )];
    if tick % 3 == 0 {
        let pos = i64::try_from(tick).unwrap_or(i64::MAX);
        events.push(Message::new(
            KIND_EXPLOSION,
            DemoEvent::Explosion { x: pos, y: -pos },
        ));
    }
    if tick % 5 == 0 {
        events.push(Message::new(
            KIND_ALERT,
            DemoEvent::Alert(format!("checkpoint {tick}")),
        ));
    }
    events
}

/// Read and release everything waiting in `terminal`'s inbox.
fn consume(terminal: &Terminal<DemoEvent>) -> usize {
    let mut consumed = 0;
    while let Some(delivery) = terminal.get_message() {
        trace!(
            terminal = terminal.label().unwrap_or("?"),
            kind = delivery.kind(),
            payload = ?delivery.payload(),
            "Consumed"
        );
        delivery.release();
        consumed += 1;
    }
    consumed
}
