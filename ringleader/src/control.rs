//! Control-channel replies from nodes to the driver.

use serde::{Deserialize, Serialize};

use crate::message::NodeId;

/// A reply sent by a node on the shared control channel.
///
/// The control channel is the single rendezvous between the ring and its
/// driver: every driver operation that expects an acknowledgment performs
/// exactly one blocking receive on it. Replies are tagged with the operation
/// that produced them so the driver never has to infer meaning from its own
/// bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlReply {
    /// The named node acknowledged a failure directive and is now inactive.
    FailureAck(NodeId),
    /// The named node acknowledged a recovery directive and is now active.
    RecoveryAck(NodeId),
    /// An election round completed and elected the named node.
    LeaderElected(NodeId),
}

impl ControlReply {
    /// The node id carried by this reply.
    pub fn node(&self) -> NodeId {
        match self {
            ControlReply::FailureAck(id)
            | ControlReply::RecoveryAck(id)
            | ControlReply::LeaderElected(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_carries_node_id() {
        assert_eq!(ControlReply::FailureAck(NodeId(2)).node(), NodeId(2));
        assert_eq!(ControlReply::RecoveryAck(NodeId(0)).node(), NodeId(0));
        assert_eq!(ControlReply::LeaderElected(NodeId(3)).node(), NodeId(3));
    }
}
