//! Driver-facing handle for an assembled ring.
//!
//! The driver sequences a scenario by issuing one operation at a time and
//! blocking on the matching control reply before issuing the next. The
//! engine validates nothing beyond node-id bounds: failing an already-failed
//! node re-acks idempotently, and two interleaved elections are allowed to
//! race through the ring. Sequencing is the driver's job.

use crate::control::ControlReply;
use crate::error::{RingError, RingResult};
use crate::message::{Message, NodeId};
use crate::ring::{self, Ring, RingConfig};

/// Handle for issuing operations against a running ring.
///
/// # Examples
///
/// ```no_run
/// use ringleader::{NodeId, RingConfig, RingDriver, RingResult};
///
/// # async fn demo() -> RingResult<()> {
/// let mut ring = RingDriver::spawn(RingConfig::new(4))?;
/// ring.mark_failed(NodeId(0)).await?;
/// let leader = ring.start_election(NodeId(1), NodeId(1)).await?;
/// assert_eq!(leader, NodeId(3));
/// ring.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct RingDriver {
    ring: Ring,
    size: usize,
}

impl RingDriver {
    /// Assemble a ring from `config` and spawn its node tasks.
    pub fn spawn(config: RingConfig) -> RingResult<Self> {
        let ring = ring::assemble(&config)?;
        Ok(Self {
            ring,
            size: config.nodes,
        })
    }

    /// Number of nodes in the ring.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Start an election originated by node `at` and block until a leader is
    /// reported.
    ///
    /// Origination means node `at` has already stamped `candidate` onto a
    /// fresh ballot and sent it on its outbound, so the seed lands in the
    /// successor's mailbox and the originator only re-reads the ballot after
    /// a full lap. A one-entry ballot therefore never short-circuits into an
    /// immediate self-election on a multi-node ring.
    ///
    /// If every node is inactive the ballot relays forever and this call
    /// never returns; bound it with a timeout when that is a possibility.
    pub async fn start_election(&mut self, at: NodeId, candidate: NodeId) -> RingResult<NodeId> {
        if at.index() >= self.size {
            return Err(RingError::UnknownNode(at));
        }
        tracing::info!(origin = %at, %candidate, "starting election");
        self.send(at.successor(self.size), Message::election(candidate, self.size))
            .await?;
        match self.recv_reply().await? {
            ControlReply::LeaderElected(leader) => Ok(leader),
            other => Err(RingError::UnexpectedReply {
                expected: "leader-elected",
                got: other,
            }),
        }
    }

    /// Mark node `id` as failed and block until it acknowledges.
    pub async fn mark_failed(&mut self, id: NodeId) -> RingResult<()> {
        tracing::info!(node = %id, "injecting failure");
        self.send(id, Message::failure()).await?;
        match self.recv_reply().await? {
            ControlReply::FailureAck(acked) if acked == id => Ok(()),
            other => Err(RingError::UnexpectedReply {
                expected: "failure-ack",
                got: other,
            }),
        }
    }

    /// Mark node `id` as recovered and block until it acknowledges.
    pub async fn mark_recovered(&mut self, id: NodeId) -> RingResult<()> {
        tracing::info!(node = %id, "injecting recovery");
        self.send(id, Message::recovery()).await?;
        match self.recv_reply().await? {
            ControlReply::RecoveryAck(acked) if acked == id => Ok(()),
            other => Err(RingError::UnexpectedReply {
                expected: "recovery-ack",
                got: other,
            }),
        }
    }

    /// Deliver Terminate to every node directly and join all node tasks.
    ///
    /// Terminate is not relayed node-to-node, so shutdown works regardless of
    /// ring liveness. No control reply is consumed. Operations issued after
    /// shutdown fail with [`RingError::RingClosed`].
    pub async fn shutdown(&mut self) -> RingResult<()> {
        tracing::info!("shutting down ring");
        for inbound in &self.ring.inbounds {
            // A node that already stopped has dropped its receiver; that is
            // exactly the state Terminate asks for.
            let _ = inbound.send(Message::terminate()).await;
        }
        for task in self.ring.tasks.drain(..) {
            if task.await.is_err() {
                tracing::error!("node task panicked before joining");
            }
        }
        Ok(())
    }

    /// Deliver an arbitrary message to node `at`'s inbound without awaiting
    /// any reply.
    ///
    /// This is the low-level hook scenarios use for traffic outside the four
    /// sequenced operations, such as seeding an initial leader announcement.
    pub async fn inject(&mut self, at: NodeId, message: Message) -> RingResult<()> {
        self.send(at, message).await
    }

    /// Block for the next control reply.
    ///
    /// Pair with [`RingDriver::inject`] when a scenario expects a reply the
    /// sequenced operations do not consume.
    pub async fn recv_reply(&mut self) -> RingResult<ControlReply> {
        self.ring.control.recv().await.ok_or(RingError::RingClosed)
    }

    async fn send(&self, at: NodeId, message: Message) -> RingResult<()> {
        let inbound = self
            .ring
            .inbounds
            .get(at.index())
            .ok_or(RingError::UnknownNode(at))?;
        inbound.send(message).await.map_err(|_| RingError::RingClosed)
    }
}
