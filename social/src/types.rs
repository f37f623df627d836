//! Relationship records and the derived per-pair friendship state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a stored friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "PENDING"),
            RequestStatus::Accepted => write!(f, "ACCEPTED"),
            RequestStatus::Declined => write!(f, "DECLINED"),
        }
    }
}

/// A directed friend request. Sender and receiver are preserved after
/// acceptance so it stays clear who may accept or decline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendRequest {
    /// A fresh pending request with a new ULID.
    pub fn pending(sender_id: impl Into<String>, receiver_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ulid::Ulid::new().to_string(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// True if the record joins `a` and `b`, in either direction.
    pub fn involves_pair(&self, a: &str, b: &str) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// The other side of the record, seen from `user_id`.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        if self.sender_id == user_id {
            Some(&self.receiver_id)
        } else if self.receiver_id == user_id {
            Some(&self.sender_id)
        } else {
            None
        }
    }
}

/// A directed follow. Existence is the whole state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: String,
    pub following_id: String,
    pub created_at: DateTime<Utc>,
}

impl FollowEdge {
    pub fn new(follower_id: impl Into<String>, following_id: impl Into<String>) -> Self {
        Self {
            follower_id: follower_id.into(),
            following_id: following_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Friendship between two users as seen by one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendshipState {
    None,
    /// The viewer sent a request that is still pending.
    PendingOutbound { requester_id: String },
    /// The other user sent the viewer a request that is still pending.
    PendingInbound { requester_id: String },
    Friends,
    Declined,
}

impl FriendshipState {
    /// Derives the state between `viewer` and `other` from stored records.
    ///
    /// Records for other pairs are ignored. Accepted beats pending, pending
    /// beats declined.
    pub fn observe(viewer: &str, other: &str, records: &[FriendRequest]) -> Self {
        let between: Vec<&FriendRequest> = records
            .iter()
            .filter(|r| r.involves_pair(viewer, other))
            .collect();

        if between.iter().any(|r| r.status == RequestStatus::Accepted) {
            return FriendshipState::Friends;
        }

        if let Some(pending) = between.iter().find(|r| r.status == RequestStatus::Pending) {
            let requester_id = pending.sender_id.clone();
            return if pending.sender_id == viewer {
                FriendshipState::PendingOutbound { requester_id }
            } else {
                FriendshipState::PendingInbound { requester_id }
            };
        }

        if between.iter().any(|r| r.status == RequestStatus::Declined) {
            return FriendshipState::Declined;
        }

        FriendshipState::None
    }

    /// The same relationship seen from the other side.
    pub fn mirrored(&self) -> Self {
        match self {
            FriendshipState::PendingOutbound { requester_id } => FriendshipState::PendingInbound {
                requester_id: requester_id.clone(),
            },
            FriendshipState::PendingInbound { requester_id } => FriendshipState::PendingOutbound {
                requester_id: requester_id.clone(),
            },
            other => other.clone(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            FriendshipState::PendingOutbound { .. } | FriendshipState::PendingInbound { .. }
        )
    }
}

impl fmt::Display for FriendshipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FriendshipState::None => write!(f, "none"),
            FriendshipState::PendingOutbound { requester_id } => {
                write!(f, "pending (sent by {requester_id})")
            }
            FriendshipState::PendingInbound { requester_id } => {
                write!(f, "pending (received from {requester_id})")
            }
            FriendshipState::Friends => write!(f, "friends"),
            FriendshipState::Declined => write!(f, "declined"),
        }
    }
}

/// Existence facts for one unordered pair, checked in both directions.
///
/// The store answers these as independent queries right before a send; the
/// policy decides on the booleans alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
    pub pending: bool,
    pub accepted: bool,
    pub declined: bool,
}

impl RelationshipSnapshot {
    pub fn from_records(a: &str, b: &str, records: &[FriendRequest]) -> Self {
        let mut snapshot = Self::default();
        for record in records.iter().filter(|r| r.involves_pair(a, b)) {
            match record.status {
                RequestStatus::Pending => snapshot.pending = true,
                RequestStatus::Accepted => snapshot.accepted = true,
                RequestStatus::Declined => snapshot.declined = true,
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sender: &str, receiver: &str, status: RequestStatus) -> FriendRequest {
        let mut request = FriendRequest::pending(sender, receiver);
        request.status = status;
        request
    }

    #[test]
    fn test_observe_pending_from_both_sides() {
        let records = vec![record("alice", "bob", RequestStatus::Pending)];

        assert_eq!(
            FriendshipState::observe("alice", "bob", &records),
            FriendshipState::PendingOutbound {
                requester_id: "alice".into()
            }
        );
        assert_eq!(
            FriendshipState::observe("bob", "alice", &records),
            FriendshipState::PendingInbound {
                requester_id: "alice".into()
            }
        );
    }

    #[test]
    fn test_observe_ignores_other_pairs() {
        let records = vec![record("alice", "carol", RequestStatus::Accepted)];
        assert_eq!(
            FriendshipState::observe("alice", "bob", &records),
            FriendshipState::None
        );
    }

    #[test]
    fn test_observe_precedence() {
        let records = vec![
            record("bob", "alice", RequestStatus::Declined),
            record("alice", "bob", RequestStatus::Pending),
        ];
        assert!(FriendshipState::observe("alice", "bob", &records).is_pending());

        let records = vec![
            record("bob", "alice", RequestStatus::Declined),
            record("alice", "bob", RequestStatus::Accepted),
        ];
        assert_eq!(
            FriendshipState::observe("bob", "alice", &records),
            FriendshipState::Friends
        );

        let records = vec![record("bob", "alice", RequestStatus::Declined)];
        assert_eq!(
            FriendshipState::observe("alice", "bob", &records),
            FriendshipState::Declined
        );
    }

    #[test]
    fn test_mirrored() {
        let outbound = FriendshipState::PendingOutbound {
            requester_id: "alice".into(),
        };
        assert_eq!(
            outbound.mirrored(),
            FriendshipState::PendingInbound {
                requester_id: "alice".into()
            }
        );
        assert_eq!(outbound.mirrored().mirrored(), outbound);
        assert_eq!(FriendshipState::Friends.mirrored(), FriendshipState::Friends);
    }

    #[test]
    fn test_snapshot_checks_both_directions() {
        let records = vec![
            record("bob", "alice", RequestStatus::Pending),
            record("alice", "carol", RequestStatus::Accepted),
        ];
        let snapshot = RelationshipSnapshot::from_records("alice", "bob", &records);
        assert!(snapshot.pending);
        assert!(!snapshot.accepted);
        assert!(!snapshot.declined);
    }

    #[test]
    fn test_counterpart() {
        let request = record("alice", "bob", RequestStatus::Pending);
        assert_eq!(request.counterpart("alice"), Some("bob"));
        assert_eq!(request.counterpart("bob"), Some("alice"));
        assert_eq!(request.counterpart("carol"), None);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(FriendshipState::PendingInbound {
            requester_id: "bob".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "PENDING_INBOUND");
        assert_eq!(json["requester_id"], "bob");
    }
}
