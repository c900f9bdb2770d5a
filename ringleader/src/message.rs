//! Value types flowing over the ring.
//!
//! This module provides the fundamental types exchanged between ring members:
//! - [`NodeId`]: identifier of a ring member
//! - [`MessageKind`]: the message taxonomy, with numeric wire codes
//! - [`Roster`]: fixed-capacity, append-only candidate list
//! - [`Message`]: the unit of traffic on ring channels

use serde::{Deserialize, Serialize};

/// Identifier of a ring member.
///
/// Ids are assigned densely in `[0, N)` at ring assembly and never change
/// afterwards. Elections are won by the highest id among active members.
///
/// # Examples
///
/// ```
/// use ringleader::NodeId;
///
/// let id = NodeId(3);
/// assert_eq!(id.to_string(), "3");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Index of this node in the ring, usable for channel lookup.
    pub const fn index(&self) -> usize {
        self.0
    }

    /// The id of this node's successor in a ring of `size` members.
    pub const fn successor(&self, size: usize) -> NodeId {
        NodeId((self.0 + 1) % size)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a ring message.
///
/// Each known kind maps to a stable numeric code so that externally scripted
/// traffic can be expressed numerically. Codes that do not map to a known
/// kind decode as [`MessageKind::Unknown`] and are dropped by nodes without
/// forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// A circulating election ballot accumulating candidate ids.
    Election,
    /// Control directive marking the receiving node as failed.
    Failure,
    /// Control directive marking the receiving node as recovered.
    Recovery,
    /// Announcement of the winner of a completed election round.
    NewLeaderAnnounce,
    /// Unconditional stop directive for the receiving node.
    Terminate,
    /// A code that does not map to any known kind.
    Unknown(u8),
}

impl MessageKind {
    /// Numeric wire code for this kind.
    pub const fn code(&self) -> u8 {
        match self {
            MessageKind::Election => 1,
            MessageKind::Failure => 2,
            MessageKind::Recovery => 3,
            MessageKind::NewLeaderAnnounce => 5,
            MessageKind::Terminate => 9,
            MessageKind::Unknown(code) => *code,
        }
    }

    /// Decode a numeric wire code.
    ///
    /// Unassigned codes decode to [`MessageKind::Unknown`] rather than an
    /// error; the node state machine logs and drops them.
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => MessageKind::Election,
            2 => MessageKind::Failure,
            3 => MessageKind::Recovery,
            5 => MessageKind::NewLeaderAnnounce,
            9 => MessageKind::Terminate,
            other => MessageKind::Unknown(other),
        }
    }
}

/// Append-only candidate list carried by Election and NewLeaderAnnounce
/// messages.
///
/// The list is bounded by the ring size, which is fixed at assembly, so the
/// backing storage is allocated once and never regrows. Entries are only ever
/// appended, never removed, and duplicates are suppressed: a node id appears
/// at most once no matter how often the ballot passes through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    ids: Vec<NodeId>,
    capacity: usize,
}

impl Roster {
    /// Create an empty roster bounded to `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a roster bounded to `capacity` entries holding a single seed id.
    ///
    /// The first entry of an election roster is its originator.
    pub fn seeded(seed: NodeId, capacity: usize) -> Self {
        let mut roster = Self::with_capacity(capacity.max(1));
        roster.push_unique(seed);
        roster
    }

    /// Append `id` unless it is already present or the roster is full.
    ///
    /// Returns `true` if the id was appended.
    pub fn push_unique(&mut self, id: NodeId) -> bool {
        if self.ids.len() >= self.capacity || self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// First entry, if any. For an election ballot this is the originator;
    /// for a leader announcement it is the elected leader.
    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    /// Highest id present, if any. This is the winner of a completed ballot.
    pub fn winner(&self) -> Option<NodeId> {
        self.ids.iter().max().copied()
    }

    /// The entries in append order.
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the roster holds no entries.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A message flowing between ring members.
///
/// Messages are immutable once sent: a node either forwards a message
/// unchanged, forwards it with exactly one id appended to its roster, or
/// consumes it. `participants` is only meaningful for
/// [`MessageKind::Election`] and [`MessageKind::NewLeaderAnnounce`]; it is
/// empty for every other kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// What the message means to the receiving node.
    pub kind: MessageKind,
    /// Candidate ids accumulated so far (elections) or the elected leader
    /// (announcements).
    pub participants: Roster,
}

impl Message {
    /// An election ballot seeded with its originator, bounded to `ring_size`
    /// candidates.
    pub fn election(originator: NodeId, ring_size: usize) -> Self {
        Self {
            kind: MessageKind::Election,
            participants: Roster::seeded(originator, ring_size),
        }
    }

    /// A failure directive for whichever node reads it.
    pub fn failure() -> Self {
        Self {
            kind: MessageKind::Failure,
            participants: Roster::with_capacity(0),
        }
    }

    /// A recovery directive for whichever node reads it.
    pub fn recovery() -> Self {
        Self {
            kind: MessageKind::Recovery,
            participants: Roster::with_capacity(0),
        }
    }

    /// An announcement that `leader` won the current election round.
    pub fn new_leader(leader: NodeId) -> Self {
        Self {
            kind: MessageKind::NewLeaderAnnounce,
            participants: Roster::seeded(leader, 1),
        }
    }

    /// A stop directive for whichever node reads it.
    pub fn terminate() -> Self {
        Self {
            kind: MessageKind::Terminate,
            participants: Roster::with_capacity(0),
        }
    }

    /// A message with an unassigned kind code, useful for exercising the
    /// drop-and-continue path.
    pub fn unknown(code: u8) -> Self {
        Self {
            kind: MessageKind::from_code(code),
            participants: Roster::with_capacity(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in [
            MessageKind::Election,
            MessageKind::Failure,
            MessageKind::Recovery,
            MessageKind::NewLeaderAnnounce,
            MessageKind::Terminate,
        ] {
            assert_eq!(MessageKind::from_code(kind.code()), kind);
        }
    }

    #[test]
    fn test_unassigned_code_decodes_as_unknown() {
        assert_eq!(MessageKind::from_code(7), MessageKind::Unknown(7));
        assert_eq!(MessageKind::Unknown(7).code(), 7);
        assert_eq!(Message::unknown(7).kind, MessageKind::Unknown(7));
    }

    #[test]
    fn test_roster_suppresses_duplicates() {
        let mut roster = Roster::seeded(NodeId(1), 4);
        assert!(roster.push_unique(NodeId(2)));
        assert!(!roster.push_unique(NodeId(1)));
        assert!(!roster.push_unique(NodeId(2)));
        assert_eq!(roster.ids(), &[NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_roster_never_exceeds_capacity() {
        let mut roster = Roster::with_capacity(2);
        assert!(roster.push_unique(NodeId(0)));
        assert!(roster.push_unique(NodeId(1)));
        assert!(!roster.push_unique(NodeId(2)));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_roster_first_and_winner() {
        let mut roster = Roster::seeded(NodeId(1), 4);
        roster.push_unique(NodeId(3));
        roster.push_unique(NodeId(0));
        assert_eq!(roster.first(), Some(NodeId(1)));
        assert_eq!(roster.winner(), Some(NodeId(3)));

        let empty = Roster::with_capacity(0);
        assert_eq!(empty.first(), None);
        assert_eq!(empty.winner(), None);
    }

    #[test]
    fn test_successor_wraps_around() {
        assert_eq!(NodeId(2).successor(4), NodeId(3));
        assert_eq!(NodeId(3).successor(4), NodeId(0));
        assert_eq!(NodeId(0).successor(1), NodeId(0));
    }

    #[test]
    fn test_control_messages_carry_no_participants() {
        assert!(Message::failure().participants.is_empty());
        assert!(Message::recovery().participants.is_empty());
        assert!(Message::terminate().participants.is_empty());
    }

    #[test]
    fn test_message_serde_round_trip() {
        let mut msg = Message::election(NodeId(1), 4);
        msg.participants.push_unique(NodeId(2));
        let json = serde_json::to_string(&msg).expect("serialize");
        let decoded: Message = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(msg, decoded);
    }
}
