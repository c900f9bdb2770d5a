//! Per-node state machine and processing loop.
//!
//! Each ring member runs [`Node::run`]: block on the next inbound message,
//! apply [`Node::handle`], then act on the resulting [`Step`]. All election
//! logic is local; the current leader is never shared state, it only emerges
//! from message traffic.
//!
//! An inactive node stays in the topology and relays Election and
//! NewLeaderAnnounce traffic unchanged; it only suppresses its own candidacy.
//! Failed members are deliberately not bypassed at the topology level.

use tokio::sync::mpsc;

use crate::control::ControlReply;
use crate::message::{Message, MessageKind, NodeId};

/// Participation state of a node.
///
/// Inactive nodes relay ring traffic without competing; they still process
/// control directives (Failure, Recovery, Terminate) addressed to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Liveness {
    /// Participates fully in elections.
    Active,
    /// Relay-only; candidacy suppressed.
    Inactive,
}

/// What the processing loop should do after handling one message.
#[derive(Debug, PartialEq)]
pub(crate) enum Step {
    /// Send a message to the successor.
    Forward(Message),
    /// Send a reply on the control channel.
    Report(ControlReply),
    /// Consume the message with no output.
    Consume,
    /// Stop processing permanently.
    Stop,
}

/// One ring member: owned liveness state plus its channel endpoints.
///
/// The inbound receiver is owned and read exclusively by this node; the
/// outbound sender feeds the successor's inbound. Each node processes one
/// message at a time, so its state needs no synchronization.
pub(crate) struct Node {
    id: NodeId,
    liveness: Liveness,
    leader: Option<NodeId>,
    inbound: mpsc::Receiver<Message>,
    outbound: mpsc::Sender<Message>,
    control: mpsc::Sender<ControlReply>,
}

impl Node {
    /// Create a node wired to its ring neighbors and the control channel.
    ///
    /// Nodes start active with no known leader.
    pub(crate) fn new(
        id: NodeId,
        inbound: mpsc::Receiver<Message>,
        outbound: mpsc::Sender<Message>,
        control: mpsc::Sender<ControlReply>,
    ) -> Self {
        Self {
            id,
            liveness: Liveness::Active,
            leader: None,
            inbound,
            outbound,
            control,
        }
    }

    /// Apply the state machine to one inbound message.
    ///
    /// This is the entire election algorithm; [`Node::run`] only performs the
    /// channel I/O that the returned [`Step`] asks for.
    pub(crate) fn handle(&mut self, mut msg: Message) -> Step {
        match msg.kind {
            MessageKind::Election => {
                if self.liveness == Liveness::Inactive {
                    tracing::debug!(node = %self.id, "inactive, relaying election unchanged");
                    return Step::Forward(msg);
                }
                if msg.participants.first() == Some(self.id) {
                    // The ballot came back to its originator: full lap done,
                    // every active member has had its chance to stamp it.
                    let Some(winner) = msg.participants.winner() else {
                        return Step::Consume;
                    };
                    tracing::info!(node = %self.id, %winner, "election complete");
                    return Step::Forward(Message::new_leader(winner));
                }
                if msg.participants.push_unique(self.id) {
                    tracing::debug!(
                        node = %self.id,
                        participants = ?msg.participants.ids(),
                        "joined election"
                    );
                } else {
                    tracing::debug!(node = %self.id, "already a candidate, forwarding");
                }
                Step::Forward(msg)
            }
            MessageKind::Failure => {
                self.liveness = Liveness::Inactive;
                tracing::info!(node = %self.id, "entered failed state");
                Step::Report(ControlReply::FailureAck(self.id))
            }
            MessageKind::Recovery => {
                self.liveness = Liveness::Active;
                tracing::info!(node = %self.id, "recovered");
                Step::Report(ControlReply::RecoveryAck(self.id))
            }
            MessageKind::NewLeaderAnnounce => {
                if self.liveness == Liveness::Inactive {
                    tracing::debug!(node = %self.id, "inactive, relaying announcement unchanged");
                    return Step::Forward(msg);
                }
                let Some(leader) = msg.participants.first() else {
                    tracing::warn!(node = %self.id, "announcement carries no leader id, dropping");
                    return Step::Consume;
                };
                self.leader = Some(leader);
                if leader == self.id {
                    // The announcement finished its own circuit.
                    tracing::info!(node = %self.id, %leader, "announcement completed circuit");
                    Step::Report(ControlReply::LeaderElected(leader))
                } else {
                    tracing::debug!(node = %self.id, %leader, "acknowledged new leader");
                    Step::Forward(msg)
                }
            }
            MessageKind::Terminate => {
                tracing::info!(node = %self.id, "terminating");
                Step::Stop
            }
            MessageKind::Unknown(code) => {
                tracing::warn!(node = %self.id, code, "unrecognized message kind, dropping");
                Step::Consume
            }
        }
    }

    /// Receive-process-forward loop.
    ///
    /// Runs until a Terminate message arrives or every inbound sender is
    /// dropped. Send failures mean the peer endpoint has already terminated;
    /// they are logged and the loop keeps going so a Terminate queued behind
    /// them is still honored.
    pub(crate) async fn run(mut self) {
        while let Some(msg) = self.inbound.recv().await {
            match self.handle(msg) {
                Step::Forward(out) => {
                    if self.outbound.send(out).await.is_err() {
                        tracing::debug!(node = %self.id, "successor mailbox closed, message lost");
                    }
                }
                Step::Report(reply) => {
                    if self.control.send(reply).await.is_err() {
                        tracing::debug!(node = %self.id, "control channel closed, reply lost");
                    }
                }
                Step::Consume => {}
                Step::Stop => break,
            }
        }
        tracing::debug!(node = %self.id, "processing loop finished");
    }

    #[cfg(test)]
    pub(crate) fn liveness(&self) -> Liveness {
        self.liveness
    }

    #[cfg(test)]
    pub(crate) fn leader(&self) -> Option<NodeId> {
        self.leader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Roster;

    /// A node whose channels exist but are never read; handle() alone is
    /// under test here.
    fn detached_node(id: usize) -> Node {
        let (_inbound_tx, inbound_rx) = mpsc::channel(8);
        let (outbound_tx, _outbound_rx) = mpsc::channel(8);
        let (control_tx, _control_rx) = mpsc::channel(8);
        Node::new(NodeId(id), inbound_rx, outbound_tx, control_tx)
    }

    fn failed_node(id: usize) -> Node {
        let mut node = detached_node(id);
        assert_eq!(
            node.handle(Message::failure()),
            Step::Report(ControlReply::FailureAck(NodeId(id)))
        );
        node
    }

    fn ballot(ids: &[usize], capacity: usize) -> Message {
        let mut participants = Roster::with_capacity(capacity);
        for &id in ids {
            assert!(participants.push_unique(NodeId(id)));
        }
        Message {
            kind: MessageKind::Election,
            participants,
        }
    }

    #[test]
    fn test_active_node_joins_election() {
        let mut node = detached_node(2);
        let step = node.handle(ballot(&[1], 4));
        let Step::Forward(out) = step else {
            panic!("expected forward, got {step:?}");
        };
        assert_eq!(out.kind, MessageKind::Election);
        assert_eq!(out.participants.ids(), &[NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_empty_ballot_is_joined_not_rejected() {
        let mut node = detached_node(0);
        let Step::Forward(out) = node.handle(ballot(&[], 4)) else {
            panic!("expected forward");
        };
        assert_eq!(out.participants.ids(), &[NodeId(0)]);
    }

    #[test]
    fn test_no_duplicate_candidacy() {
        let mut node = detached_node(2);
        let Step::Forward(out) = node.handle(ballot(&[1, 2, 3], 4)) else {
            panic!("expected forward");
        };
        assert_eq!(out.participants.ids(), &[NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn test_inactive_node_relays_election_unchanged() {
        let mut node = failed_node(2);
        let msg = ballot(&[1, 3], 4);
        let expected = msg.clone();
        assert_eq!(node.handle(msg), Step::Forward(expected));
    }

    #[test]
    fn test_full_lap_announces_the_maximum_id() {
        let mut node = detached_node(1);
        let Step::Forward(out) = node.handle(ballot(&[1, 2, 3, 0], 4)) else {
            panic!("expected forward");
        };
        assert_eq!(out.kind, MessageKind::NewLeaderAnnounce);
        assert_eq!(out.participants.ids(), &[NodeId(3)]);
    }

    #[test]
    fn test_origin_match_requires_active_node() {
        // A failed originator must relay its own returning ballot instead of
        // completing the round.
        let mut node = failed_node(1);
        let msg = ballot(&[1, 2, 3], 4);
        let expected = msg.clone();
        assert_eq!(node.handle(msg), Step::Forward(expected));
    }

    #[test]
    fn test_failure_is_idempotent_and_acked() {
        let mut node = detached_node(3);
        for _ in 0..2 {
            assert_eq!(
                node.handle(Message::failure()),
                Step::Report(ControlReply::FailureAck(NodeId(3)))
            );
            assert_eq!(node.liveness(), Liveness::Inactive);
        }
    }

    #[test]
    fn test_recovery_restores_candidacy() {
        let mut node = failed_node(2);
        assert_eq!(
            node.handle(Message::recovery()),
            Step::Report(ControlReply::RecoveryAck(NodeId(2)))
        );
        assert_eq!(node.liveness(), Liveness::Active);

        let Step::Forward(out) = node.handle(ballot(&[1], 4)) else {
            panic!("expected forward");
        };
        assert!(out.participants.contains(NodeId(2)));
    }

    #[test]
    fn test_announcement_recorded_and_forwarded() {
        let mut node = detached_node(2);
        let msg = Message::new_leader(NodeId(3));
        let expected = msg.clone();
        assert_eq!(node.handle(msg), Step::Forward(expected));
        assert_eq!(node.leader(), Some(NodeId(3)));
    }

    #[test]
    fn test_announcement_completes_at_the_leader() {
        let mut node = detached_node(3);
        assert_eq!(
            node.handle(Message::new_leader(NodeId(3))),
            Step::Report(ControlReply::LeaderElected(NodeId(3)))
        );
        assert_eq!(node.leader(), Some(NodeId(3)));
    }

    #[test]
    fn test_later_announcement_overwrites_leader_view() {
        let mut node = detached_node(0);
        node.handle(Message::new_leader(NodeId(3)));
        node.handle(Message::new_leader(NodeId(2)));
        assert_eq!(node.leader(), Some(NodeId(2)));
    }

    #[test]
    fn test_inactive_node_relays_announcement_without_recording() {
        let mut node = failed_node(2);
        let msg = Message::new_leader(NodeId(3));
        let expected = msg.clone();
        assert_eq!(node.handle(msg), Step::Forward(expected));
        assert_eq!(node.leader(), None);
    }

    #[test]
    fn test_announcement_without_leader_id_is_dropped() {
        let mut node = detached_node(0);
        let msg = Message {
            kind: MessageKind::NewLeaderAnnounce,
            participants: Roster::with_capacity(0),
        };
        assert_eq!(node.handle(msg), Step::Consume);
        assert_eq!(node.leader(), None);
    }

    #[test]
    fn test_unknown_kind_is_dropped() {
        let mut node = detached_node(0);
        assert_eq!(node.handle(Message::unknown(7)), Step::Consume);
        assert_eq!(node.liveness(), Liveness::Active);
    }

    #[test]
    fn test_terminate_stops_processing() {
        let mut node = detached_node(0);
        assert_eq!(node.handle(Message::terminate()), Step::Stop);
    }

    #[test]
    fn test_terminate_applies_to_inactive_nodes() {
        let mut node = failed_node(0);
        assert_eq!(node.handle(Message::terminate()), Step::Stop);
    }

    #[tokio::test]
    async fn test_run_loop_forwards_and_stops() {
        let (inbound_tx, inbound_rx) = mpsc::channel(8);
        let (outbound_tx, mut outbound_rx) = mpsc::channel(8);
        let (control_tx, _control_rx) = mpsc::channel(8);
        let node = Node::new(NodeId(2), inbound_rx, outbound_tx, control_tx);
        let task = tokio::spawn(node.run());

        inbound_tx
            .send(Message::election(NodeId(1), 4))
            .await
            .expect("send ballot");
        let out = outbound_rx.recv().await.expect("forwarded ballot");
        assert_eq!(out.participants.ids(), &[NodeId(1), NodeId(2)]);

        inbound_tx
            .send(Message::terminate())
            .await
            .expect("send terminate");
        task.await.expect("node task");

        // Messages enqueued after Terminate are never processed.
        assert!(outbound_rx.try_recv().is_err());
    }
}
