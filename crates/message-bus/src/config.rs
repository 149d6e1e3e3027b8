//! Bus configuration and validation
//!
//! # Example
//!
//! ```
//! use message_bus::BusConfig;
//!
//! let config = BusConfig::default().with_inbox_capacity(64);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::ConfigError;
use crate::DEFAULT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};

/// Queue sizes for one bus and the terminals registered with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Slots in the bus inbound queue.
    pub inbound_capacity: usize,
    /// Slots in each terminal inbox.
    pub inbox_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: DEFAULT_QUEUE_CAPACITY,
            inbox_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl BusConfig {
    #[must_use]
    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = capacity;
        self
    }

    /// Reject capacities a queue cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inbound_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "inbound_capacity",
            });
        }
        if self.inbox_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "inbox_capacity",
            });
        }
        Ok(())
    }
}
