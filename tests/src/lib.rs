//! # Message Bus Test Suite
//!
//! Unified test crate for behaviour that spans several components.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs    # End-to-end publish/consume walkthroughs
//!     ├── lifecycle.rs    # Reference accounting and payload cleanup
//!     └── concurrency.rs  # Producers and consumers on separate threads
//!
//! tests/benches/
//! └── fan_out_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p bus-tests
//!
//! # By category
//! cargo test -p bus-tests integration::lifecycle::
//!
//! # Benchmarks
//! cargo bench -p bus-tests
//! ```

pub mod integration;
