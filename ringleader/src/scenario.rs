//! Scenario layer: scripted fault-injection workloads run against a ring.

use std::time::Duration;

use async_trait::async_trait;

use crate::control::ControlReply;
use crate::driver::RingDriver;
use crate::error::{RingError, RingResult};
use crate::message::{Message, NodeId};
use crate::ring::RingConfig;

/// A fault-injection workload driven against a ring.
///
/// Scenarios own the sequencing: they issue one driver operation at a time
/// and rely on its blocking acknowledgment before moving on.
#[async_trait]
pub trait Scenario {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Drive the ring through the scenario.
    async fn run(&mut self, ring: &mut RingDriver) -> RingResult<()>;
}

/// Assemble a ring, run `scenario` against it, then shut the ring down.
///
/// The ring is shut down whether or not the scenario succeeds; the
/// scenario's error wins if both fail.
pub async fn run_scenario<S>(config: RingConfig, scenario: &mut S) -> RingResult<()>
where
    S: Scenario + ?Sized,
{
    let mut ring = RingDriver::spawn(config)?;
    tracing::info!(
        scenario = scenario.name(),
        nodes = ring.size(),
        "scenario starting"
    );
    let outcome = scenario.run(&mut ring).await;
    let shutdown = ring.shutdown().await;
    if outcome.is_ok() {
        tracing::info!(scenario = scenario.name(), "scenario finished");
    }
    outcome.and(shutdown)
}

/// The canonical failover exercise on a four-node ring.
///
/// Script: announce node 0 as the initial leader, fail node 0, elect from
/// node 1 (expected winner: 3), recover node 0, fail node 3, elect from
/// node 2 (expected winner: 2). Every elected leader is appended to
/// [`ScriptedFailover::leaders`] in order.
#[derive(Debug, Default)]
pub struct ScriptedFailover {
    step_delay: Duration,
    /// Leaders reported over the course of the script, in order.
    pub leaders: Vec<NodeId>,
}

impl ScriptedFailover {
    /// Scenario with no pacing between steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scenario that sleeps `delay` between steps so interleaved logs stay
    /// readable. Pacing is cosmetic; correctness comes from the blocking
    /// acknowledgments alone.
    pub fn with_step_delay(delay: Duration) -> Self {
        Self {
            step_delay: delay,
            ..Self::default()
        }
    }

    async fn pace(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }

    async fn await_leader(&mut self, ring: &mut RingDriver) -> RingResult<NodeId> {
        match ring.recv_reply().await? {
            ControlReply::LeaderElected(leader) => Ok(leader),
            other => Err(RingError::UnexpectedReply {
                expected: "leader-elected",
                got: other,
            }),
        }
    }
}

#[async_trait]
impl Scenario for ScriptedFailover {
    fn name(&self) -> &str {
        "scripted_failover"
    }

    async fn run(&mut self, ring: &mut RingDriver) -> RingResult<()> {
        if ring.size() < 4 {
            return Err(RingError::InvalidConfig(
                "scripted failover needs a ring of at least 4 nodes".into(),
            ));
        }

        // Seed the ring with an initial leader instead of electing one: the
        // announcement starts at node 0's successor and completes once it
        // circles back to node 0 itself.
        let initial = NodeId(0);
        ring.inject(initial.successor(ring.size()), Message::new_leader(initial))
            .await?;
        let leader = self.await_leader(ring).await?;
        tracing::info!(%leader, "initial leader acknowledged");
        self.leaders.push(leader);
        self.pace().await;

        ring.mark_failed(NodeId(0)).await?;
        self.pace().await;

        let leader = ring.start_election(NodeId(1), NodeId(1)).await?;
        tracing::info!(%leader, "new leader after losing node 0");
        self.leaders.push(leader);
        self.pace().await;

        ring.mark_recovered(NodeId(0)).await?;
        self.pace().await;

        ring.mark_failed(NodeId(3)).await?;
        self.pace().await;

        let leader = ring.start_election(NodeId(2), NodeId(2)).await?;
        tracing::info!(%leader, "new leader after losing node 3");
        self.leaders.push(leader);
        self.pace().await;

        Ok(())
    }
}
