//! Ring assembly: N nodes, N channels, one directed cycle.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::control::ControlReply;
use crate::error::{RingError, RingResult};
use crate::message::{Message, NodeId};
use crate::node::Node;

/// Configuration for assembling a ring.
///
/// # Examples
///
/// ```
/// use ringleader::RingConfig;
///
/// let config = RingConfig::new(4);
/// assert_eq!(config.nodes, 4);
/// ```
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Number of ring members. Fixed for the lifetime of the ring.
    pub nodes: usize,
    /// Bound of each node's inbound channel. A full mailbox blocks the
    /// sender; that backpressure is part of the contract, not an error.
    pub mailbox_capacity: usize,
}

impl RingConfig {
    /// Configuration for a ring of `nodes` members with the default mailbox
    /// capacity.
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            nodes: 4,
            mailbox_capacity: 16,
        }
    }
}

/// An assembled ring: inbound senders for every node, the control receiver,
/// and one join handle per node task.
///
/// Channel `i` is node `i`'s inbound and node `i - 1 mod N`'s outbound. The
/// topology is immutable once assembled.
pub(crate) struct Ring {
    pub(crate) inbounds: Vec<mpsc::Sender<Message>>,
    pub(crate) control: mpsc::Receiver<ControlReply>,
    pub(crate) tasks: Vec<JoinHandle<()>>,
}

/// Build the channels, wire the cycle, and spawn one task per node.
///
/// All nodes start active. The control sender is held only by nodes, so the
/// control channel closes exactly when the last node stops.
pub(crate) fn assemble(config: &RingConfig) -> RingResult<Ring> {
    if config.nodes == 0 {
        return Err(RingError::InvalidConfig(
            "ring needs at least one node".into(),
        ));
    }
    if config.mailbox_capacity == 0 {
        return Err(RingError::InvalidConfig(
            "mailbox capacity must be at least 1".into(),
        ));
    }

    let (control_tx, control_rx) = mpsc::channel(config.nodes);

    let mut inbounds = Vec::with_capacity(config.nodes);
    let mut receivers = Vec::with_capacity(config.nodes);
    for _ in 0..config.nodes {
        let (tx, rx) = mpsc::channel(config.mailbox_capacity);
        inbounds.push(tx);
        receivers.push(rx);
    }

    let mut tasks = Vec::with_capacity(config.nodes);
    for (i, inbound) in receivers.into_iter().enumerate() {
        let id = NodeId(i);
        let outbound = inbounds[id.successor(config.nodes).index()].clone();
        let node = Node::new(id, inbound, outbound, control_tx.clone());
        tasks.push(tokio::spawn(node.run()));
    }

    Ok(Ring {
        inbounds,
        control: control_rx,
        tasks,
    })
}
