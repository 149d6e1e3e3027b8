//! Error types for the message bus.
//!
//! Nothing here is fatal. Every failure leaves the bus usable and, where a
//! message could not be handed off, gives it back to the caller.

use std::fmt;

use crate::message::Message;
use crate::terminal::TerminalId;
use thiserror::Error;

/// Errors from terminal registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The terminal is already in this bus's registry.
    #[error("terminal {id} is already registered")]
    AlreadyRegistered { id: TerminalId },

    /// The terminal was constructed against a different bus.
    #[error("terminal {id} belongs to another bus")]
    ForeignTerminal { id: TerminalId },
}

/// A producer's post could not be queued.
///
/// The message was never handed to anyone; take it back with
/// [`into_message`](Self::into_message) to retry, or drop it to discard it.
#[derive(Error)]
pub enum PostError<P> {
    /// The bus inbound queue is at capacity.
    #[error("bus inbound queue is full")]
    InboundFull(Message<P>),

    /// The bus this terminal registered with no longer exists.
    #[error("bus has been dropped")]
    BusClosed(Message<P>),
}

impl<P> PostError<P> {
    /// Recover the message that was not posted.
    pub fn into_message(self) -> Message<P> {
        match self {
            PostError::InboundFull(message) | PostError::BusClosed(message) => message,
        }
    }
}

impl<P> fmt::Debug for PostError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostError::InboundFull(message) => f.debug_tuple("InboundFull").field(message).finish(),
            PostError::BusClosed(message) => f.debug_tuple("BusClosed").field(message).finish(),
        }
    }
}

/// Invalid bus configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A queue capacity was set to zero.
    #[error("{field} must be at least 1")]
    ZeroCapacity { field: &'static str },
}
