//! # Bus Runtime
//!
//! Reference update loop for the message bus.
//!
//! ## Modules
//!
//! - `config/` - Runtime configuration (file + environment)
//! - `runtime/` - The tick loop: post, drain, consume
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, default `info`)
//! 2. Load configuration
//! 3. Build the bus and its terminals
//! 4. Tick until Ctrl+C or the configured tick count
//! 5. Log final metrics

pub mod config;
pub mod runtime;

pub use config::{load_config, load_config_from, RuntimeConfig, RuntimeConfigError};
pub use runtime::{BusRuntime, DemoEvent, TickSummary};
