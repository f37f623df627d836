//! Applies policy decisions to a [`RelationshipStore`].
//!
//! Each operation reads the facts it needs, asks [`SocialGraphPolicy`], and
//! writes only on allow. Callers are responsible for running an operation
//! inside one transaction when the store is shared.

use tracing::info;

use crate::error::{Result, SocialError};
use crate::policy::SocialGraphPolicy;
use crate::store::RelationshipStore;
use crate::types::{FollowEdge, FriendRequest, FriendshipState, RelationshipSnapshot, RequestStatus};

pub struct SocialService<S> {
    policy: SocialGraphPolicy,
    store: S,
}

impl<S: RelationshipStore> SocialService<S> {
    pub fn new(policy: SocialGraphPolicy, store: S) -> Self {
        Self { policy, store }
    }

    pub fn policy(&self) -> &SocialGraphPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Current friendship state between `viewer` and `other`, from `viewer`'s side.
    pub fn state_between(&self, viewer: &str, other: &str) -> Result<FriendshipState> {
        let records = self.store.requests_between(viewer, other)?;
        Ok(FriendshipState::observe(viewer, other, &records))
    }

    /// Sends a friend request and returns the stored record.
    pub fn send_request(&mut self, sender: &str, receiver: &str) -> Result<FriendRequest> {
        let records = self.store.requests_between(sender, receiver)?;
        let snapshot = RelationshipSnapshot::from_records(sender, receiver, &records);
        self.policy.send_friend_request(sender, receiver, &snapshot)?;

        let request = FriendRequest::pending(sender, receiver);
        self.store.insert_request(request.clone())?;

        // The insert already replaced a same-direction declined row. A
        // declined row in the other direction is superseded too.
        for declined in records.iter().filter(|r| {
            r.status == RequestStatus::Declined
                && r.sender_id == receiver
                && r.receiver_id == sender
        }) {
            self.store.delete_request(&declined.id)?;
        }
        info!(request_id = %request.id, sender, receiver, "friend request sent");
        Ok(request)
    }

    pub fn accept_request(&mut self, caller: &str, request_id: &str) -> Result<FriendshipState> {
        let request = self.load_request(request_id)?;
        let state = self.policy.accept_friend_request(caller, &request)?;
        self.store.update_status(request_id, RequestStatus::Accepted)?;
        info!(request_id, caller, "friend request accepted");
        Ok(state)
    }

    pub fn decline_request(&mut self, caller: &str, request_id: &str) -> Result<FriendshipState> {
        let request = self.load_request(request_id)?;
        let state = self.policy.decline_friend_request(caller, &request)?;
        self.store.update_status(request_id, RequestStatus::Declined)?;
        info!(request_id, caller, "friend request declined");
        Ok(state)
    }

    /// Deletes the accepted record between `a` and `b`.
    pub fn remove_friend(&mut self, a: &str, b: &str) -> Result<FriendshipState> {
        let records = self.store.requests_between(a, b)?;
        let state = FriendshipState::observe(a, b, &records);
        let next = self.policy.remove_friend(a, b, &state)?;

        for accepted in records
            .iter()
            .filter(|r| r.status == RequestStatus::Accepted)
        {
            self.store.delete_request(&accepted.id)?;
        }
        info!(user = a, friend = b, "friendship removed");
        Ok(next)
    }

    pub fn follow(&mut self, follower: &str, following: &str) -> Result<()> {
        let already_following = self.store.is_following(follower, following)?;
        self.policy.follow(follower, following, already_following)?;
        self.store.insert_follow(FollowEdge::new(follower, following))?;
        info!(follower, following, "follow created");
        Ok(())
    }

    pub fn unfollow(&mut self, follower: &str, following: &str) -> Result<()> {
        let is_following = self.store.is_following(follower, following)?;
        self.policy.unfollow(follower, following, is_following)?;
        self.store.delete_follow(follower, following)?;
        info!(follower, following, "follow removed");
        Ok(())
    }

    /// Pending request from `sender` to `receiver`, if any.
    pub fn pending_request(&self, sender: &str, receiver: &str) -> Result<Option<FriendRequest>> {
        Ok(self
            .store
            .requests_between(sender, receiver)?
            .into_iter()
            .find(|r| {
                r.sender_id == sender
                    && r.receiver_id == receiver
                    && r.status == RequestStatus::Pending
            }))
    }

    /// User ids `user_id` is friends with, sorted.
    pub fn friends_of(&self, user_id: &str) -> Result<Vec<String>> {
        let mut friends: Vec<String> = self
            .store
            .requests_for(user_id)?
            .iter()
            .filter(|r| r.status == RequestStatus::Accepted)
            .filter_map(|r| r.counterpart(user_id).map(str::to_string))
            .collect();
        friends.sort();
        friends.dedup();
        Ok(friends)
    }

    pub fn followers_of(&self, user_id: &str) -> Result<Vec<String>> {
        self.store.followers_of(user_id)
    }

    pub fn following_of(&self, user_id: &str) -> Result<Vec<String>> {
        self.store.following_of(user_id)
    }

    fn load_request(&self, request_id: &str) -> Result<FriendRequest> {
        self.store
            .find_request(request_id)?
            .ok_or(SocialError::RequestNotFound)
    }
}
