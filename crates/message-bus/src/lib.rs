//! # Message Bus - In-Process Tagged Publish/Subscribe
//!
//! Producers post tagged messages; the bus fans each one out to every
//! terminal subscribed to its tag (or to the wildcard `"All"`).
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   post()    ┌──────────────────┐
//! │  Terminal A  │ ──────────► │   Bus inbound    │
//! └──────────────┘             │ (bounded queue)  │
//!                              └────────┬─────────┘
//!                                       │ drain_and_publish()
//!                     ┌─────────────────┼─────────────────┐
//!                     ▼                 ▼                 ▼
//!              ┌────────────┐    ┌────────────┐    ┌────────────┐
//!              │ inbox B    │    │ inbox C    │    │ inbox D    │
//!              │ "score"    │    │ "All"      │    │ "alert"    │
//!              └────────────┘    └────────────┘    └────────────┘
//!                     │ get_message()
//!                     ▼
//!               Delivery ──► release()
//! ```
//!
//! ## Rules
//!
//! - **Bounded everywhere:** every queue has a fixed capacity; a full queue
//!   drops, it never blocks or grows
//! - **Counted sharing:** each delivery is one reference to the same payload;
//!   the payload is cleaned up once, after the last release
//! - **Per-queue FIFO:** no ordering guarantee across queues
//! - **Caller drives:** nothing runs on its own; the application decides when
//!   to drain the bus and when to consume from terminals
//!
//! ## Example
//!
//! ```
//! use message_bus::{Bus, Message, Terminal, WILDCARD};
//!
//! let bus = Bus::new();
//! let game = Terminal::named(&bus, "game");
//! let hud = Terminal::named(&bus, "hud");
//! let logger = Terminal::named(&bus, "logger");
//! hud.subscribe("score");
//! logger.subscribe(WILDCARD);
//!
//! game.post(Message::new("score", 250u32)).unwrap();
//! let report = bus.drain_and_publish();
//! assert_eq!(report.delivered, 2);
//!
//! let delivery = hud.get_message().unwrap();
//! assert_eq!(delivery.active_refs(), 2);
//! delivery.release();
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod config;
pub mod error;
pub mod message;
pub mod metrics;
pub mod queue;
pub mod terminal;

// Re-export main types
pub use bus::{Bus, DrainReport, FanOut};
pub use config::BusConfig;
pub use error::{BusError, ConfigError, PostError};
pub use message::{Delivery, Message, WILDCARD};
pub use metrics::{BusMetrics, MetricsSnapshot};
pub use queue::{BoundedQueue, DumpSlot, QueueDump, QueueFull, Tagged};
pub use terminal::{Terminal, TerminalId};

/// Default number of slots in the inbound queue and in each terminal inbox.
pub const DEFAULT_QUEUE_CAPACITY: usize = 30;
