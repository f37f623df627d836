//! The friend-request state machine and follow rules.
//!
//! ```text
//!            send              accept
//!   NONE ──────────▶ PENDING ──────────▶ FRIENDS
//!    ▲                  │                   │
//!    │                  │ decline           │ remove
//!    │                  ▼                   │
//!    │  send*        DECLINED               │
//!    └──────────────────┴───────────────────┘
//! ```
//!
//! `send*`: a new request after a decline is allowed unless
//! [`SocialConfig::declined_blocks_rerequest`] is set.

use tracing::{debug, warn};

use crate::config::SocialConfig;
use crate::error::{Result, SocialError};
use crate::types::{FriendRequest, FriendshipState, RelationshipSnapshot, RequestStatus};

#[derive(Debug, Clone, Default)]
pub struct SocialGraphPolicy {
    config: SocialConfig,
}

impl SocialGraphPolicy {
    pub fn new(config: SocialConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SocialConfig {
        &self.config
    }

    /// Decides whether `sender` may send `receiver` a friend request.
    ///
    /// On success returns the state seen by the sender; the receiver sees
    /// its [`FriendshipState::mirrored`] form.
    pub fn send_friend_request(
        &self,
        sender: &str,
        receiver: &str,
        snapshot: &RelationshipSnapshot,
    ) -> Result<FriendshipState> {
        let decision = if sender == receiver {
            Err(SocialError::SelfFriendRequest)
        } else if snapshot.accepted {
            Err(SocialError::AlreadyFriends)
        } else if snapshot.pending {
            Err(SocialError::RequestAlreadyExists)
        } else if snapshot.declined && self.config.declined_blocks_rerequest {
            Err(SocialError::RequestAlreadyExists)
        } else {
            Ok(FriendshipState::PendingOutbound {
                requester_id: sender.to_string(),
            })
        };

        log_decision("send_friend_request", sender, receiver, &decision);
        decision
    }

    /// Only the receiver of a pending request may accept it.
    pub fn accept_friend_request(
        &self,
        caller: &str,
        request: &FriendRequest,
    ) -> Result<FriendshipState> {
        let decision =
            check_pending_receiver(caller, request).map(|()| FriendshipState::Friends);
        log_decision("accept_friend_request", caller, &request.sender_id, &decision);
        decision
    }

    /// Same precondition as accepting. The record is kept as `DECLINED`.
    pub fn decline_friend_request(
        &self,
        caller: &str,
        request: &FriendRequest,
    ) -> Result<FriendshipState> {
        let decision =
            check_pending_receiver(caller, request).map(|()| FriendshipState::Declined);
        log_decision("decline_friend_request", caller, &request.sender_id, &decision);
        decision
    }

    /// Either friend may end the friendship. The record is deleted, not
    /// re-statused, so a fresh request can follow.
    pub fn remove_friend(
        &self,
        a: &str,
        b: &str,
        state: &FriendshipState,
    ) -> Result<FriendshipState> {
        let decision = if a != b && *state == FriendshipState::Friends {
            Ok(FriendshipState::None)
        } else {
            Err(SocialError::FriendshipNotFound)
        };
        log_decision("remove_friend", a, b, &decision);
        decision
    }

    pub fn follow(&self, follower: &str, following: &str, already_following: bool) -> Result<()> {
        let decision = if follower == following {
            Err(SocialError::SelfFollow)
        } else if already_following {
            Err(SocialError::AlreadyFollowing)
        } else {
            Ok(())
        };
        log_decision("follow", follower, following, &decision);
        decision
    }

    pub fn unfollow(&self, follower: &str, following: &str, is_following: bool) -> Result<()> {
        let decision = if is_following {
            Ok(())
        } else {
            Err(SocialError::NotFollowing)
        };
        log_decision("unfollow", follower, following, &decision);
        decision
    }
}

fn check_pending_receiver(caller: &str, request: &FriendRequest) -> Result<()> {
    if request.receiver_id == caller && request.status == RequestStatus::Pending {
        Ok(())
    } else {
        Err(SocialError::RequestNotFound)
    }
}

fn log_decision<T>(operation: &str, actor: &str, target: &str, decision: &Result<T>) {
    match decision {
        Ok(_) => debug!(operation, actor, target, "social transition allowed"),
        Err(reason) => warn!(operation, actor, target, %reason, "social transition rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy() -> SocialGraphPolicy {
        SocialGraphPolicy::default()
    }

    fn snapshot(pending: bool, accepted: bool, declined: bool) -> RelationshipSnapshot {
        RelationshipSnapshot {
            pending,
            accepted,
            declined,
        }
    }

    #[test]
    fn test_send_from_none() {
        let state = policy()
            .send_friend_request("alice", "bob", &RelationshipSnapshot::default())
            .unwrap();
        assert_eq!(
            state,
            FriendshipState::PendingOutbound {
                requester_id: "alice".into()
            }
        );
        assert_eq!(
            state.mirrored(),
            FriendshipState::PendingInbound {
                requester_id: "alice".into()
            }
        );
    }

    #[rstest]
    #[case(snapshot(false, false, false))]
    #[case(snapshot(true, false, false))]
    #[case(snapshot(false, true, false))]
    #[case(snapshot(false, false, true))]
    fn test_send_to_self_always_rejected(#[case] existing: RelationshipSnapshot) {
        assert_eq!(
            policy().send_friend_request("alice", "alice", &existing),
            Err(SocialError::SelfFriendRequest)
        );
    }

    #[test]
    fn test_send_rejections() {
        let policy = policy();
        assert_eq!(
            policy.send_friend_request("alice", "bob", &snapshot(false, true, false)),
            Err(SocialError::AlreadyFriends)
        );
        assert_eq!(
            policy.send_friend_request("alice", "bob", &snapshot(true, false, false)),
            Err(SocialError::RequestAlreadyExists)
        );
    }

    #[test]
    fn test_declined_does_not_block_by_default() {
        assert!(policy()
            .send_friend_request("alice", "bob", &snapshot(false, false, true))
            .is_ok());
    }

    #[test]
    fn test_declined_blocks_when_configured() {
        let policy = SocialGraphPolicy::new(SocialConfig::new(true));
        assert_eq!(
            policy.send_friend_request("alice", "bob", &snapshot(false, false, true)),
            Err(SocialError::RequestAlreadyExists)
        );
        assert!(policy
            .send_friend_request("alice", "bob", &RelationshipSnapshot::default())
            .is_ok());
    }

    #[test]
    fn test_accept_and_decline_need_pending_receiver() {
        let policy = policy();
        let request = FriendRequest::pending("alice", "bob");

        assert_eq!(
            policy.accept_friend_request("bob", &request),
            Ok(FriendshipState::Friends)
        );
        assert_eq!(
            policy.decline_friend_request("bob", &request),
            Ok(FriendshipState::Declined)
        );

        assert_eq!(
            policy.accept_friend_request("alice", &request),
            Err(SocialError::RequestNotFound)
        );
        assert_eq!(
            policy.decline_friend_request("carol", &request),
            Err(SocialError::RequestNotFound)
        );

        let mut settled = request.clone();
        settled.status = RequestStatus::Declined;
        assert_eq!(
            policy.accept_friend_request("bob", &settled),
            Err(SocialError::RequestNotFound)
        );
        settled.status = RequestStatus::Accepted;
        assert_eq!(
            policy.decline_friend_request("bob", &settled),
            Err(SocialError::RequestNotFound)
        );
    }

    #[test]
    fn test_remove_friend_only_from_friends() {
        let policy = policy();
        assert_eq!(
            policy.remove_friend("alice", "bob", &FriendshipState::Friends),
            Ok(FriendshipState::None)
        );
        for state in [
            FriendshipState::None,
            FriendshipState::Declined,
            FriendshipState::PendingOutbound {
                requester_id: "alice".into(),
            },
        ] {
            assert_eq!(
                policy.remove_friend("alice", "bob", &state),
                Err(SocialError::FriendshipNotFound)
            );
        }
    }

    #[test]
    fn test_follow_rules() {
        let policy = policy();
        assert_eq!(policy.follow("alice", "alice", false), Err(SocialError::SelfFollow));
        assert_eq!(policy.follow("alice", "alice", true), Err(SocialError::SelfFollow));
        assert_eq!(policy.follow("alice", "bob", false), Ok(()));
        assert_eq!(policy.follow("alice", "bob", true), Err(SocialError::AlreadyFollowing));
    }

    #[test]
    fn test_unfollow_rules() {
        let policy = policy();
        assert_eq!(policy.unfollow("alice", "bob", true), Ok(()));
        assert_eq!(policy.unfollow("alice", "bob", false), Err(SocialError::NotFollowing));
    }
}
