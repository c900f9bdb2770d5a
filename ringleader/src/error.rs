//! Error types for driver-facing operations.
//!
//! The ring itself never propagates errors: nodes handle malformed input
//! locally by dropping it (see the node state machine). Errors exist only at
//! the driver boundary, where an operation can target a node that does not
//! exist, race a shutdown, or receive a reply tagged for a different
//! operation.

use thiserror::Error;

use crate::control::ControlReply;
use crate::message::NodeId;

/// Errors that can occur when driving a ring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// The targeted node id is outside the ring.
    #[error("no node {0} in the ring")]
    UnknownNode(NodeId),

    /// The ring has shut down; its channels are closed.
    #[error("ring is shut down")]
    RingClosed,

    /// The control channel yielded a reply tagged for a different operation.
    #[error("expected {expected} reply, got {got:?}")]
    UnexpectedReply {
        /// Which reply the awaiting operation expected.
        expected: &'static str,
        /// The reply that actually arrived.
        got: ControlReply,
    },

    /// The ring configuration cannot be assembled.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for driver operations.
pub type RingResult<T> = Result<T, RingError>;
