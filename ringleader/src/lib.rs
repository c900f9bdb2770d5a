//! # ringleader
//!
//! A simulator for ring-based leader election with injected faults.
//!
//! N nodes are wired into a unidirectional ring of bounded channels. Each
//! node runs an independent task with a small state machine: election
//! ballots accumulate candidate ids as they circulate, and a ballot
//! returning to its originator elects the highest accumulated id. A driver
//! injects failures and recoveries between rounds and observes outcomes on
//! a single control channel.
//!
//! ## Building blocks
//!
//! - [`Message`] / [`MessageKind`] / [`Roster`]: the traffic on ring channels
//! - [`RingConfig`]: ring size and mailbox bounds
//! - [`RingDriver`]: the four sequenced operations (start-election,
//!   mark-failed, mark-recovered, shutdown) plus low-level injection
//! - [`ControlReply`]: tagged acknowledgments from nodes to the driver
//! - [`Scenario`] / [`run_scenario`]: scripted workloads against a ring
//!
//! ## Failure semantics
//!
//! A failed node stays in the topology as a transparent relay for Election
//! and NewLeaderAnnounce traffic; only its own candidacy is suppressed. If
//! every node is failed, an election circulates forever without completing.
//! That livelock is a documented boundary condition, not an error the engine
//! detects.
//!
//! ## Example
//!
//! ```no_run
//! use ringleader::{NodeId, RingConfig, RingDriver, RingResult};
//!
//! # async fn demo() -> RingResult<()> {
//! let mut ring = RingDriver::spawn(RingConfig::new(4))?;
//! let leader = ring.start_election(NodeId(1), NodeId(1)).await?;
//! assert_eq!(leader, NodeId(3));
//! ring.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

mod control;
mod driver;
mod error;
mod message;
mod node;
mod ring;
mod scenario;

pub use control::ControlReply;
pub use driver::RingDriver;
pub use error::{RingError, RingResult};
pub use message::{Message, MessageKind, NodeId, Roster};
pub use ring::RingConfig;
pub use scenario::{Scenario, ScriptedFailover, run_scenario};
