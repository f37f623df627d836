//! Storage seam for relationship records.
//!
//! The forum database implements [`RelationshipStore`]; [`MemoryStore`] is
//! the in-process implementation used by tests and the CLI.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use tracing::debug;

use crate::error::{Result, SocialError};
use crate::types::{FollowEdge, FriendRequest, RequestStatus};

pub trait RelationshipStore: Send + Sync {
    /// All friend-request records between `a` and `b`, both directions.
    fn requests_between(&self, a: &str, b: &str) -> Result<Vec<FriendRequest>>;

    fn find_request(&self, id: &str) -> Result<Option<FriendRequest>>;

    /// Requests involving `user_id` on either side.
    fn requests_for(&self, user_id: &str) -> Result<Vec<FriendRequest>>;

    /// Inserts a request row. A DECLINED row for the same (sender, receiver)
    /// is replaced; any other existing row for that pair is an error.
    fn insert_request(&mut self, request: FriendRequest) -> Result<()>;

    fn update_status(&mut self, id: &str, status: RequestStatus) -> Result<()>;

    fn delete_request(&mut self, id: &str) -> Result<()>;

    fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool>;

    fn insert_follow(&mut self, edge: FollowEdge) -> Result<()>;

    fn delete_follow(&mut self, follower_id: &str, following_id: &str) -> Result<()>;

    fn followers_of(&self, user_id: &str) -> Result<Vec<String>>;

    fn following_of(&self, user_id: &str) -> Result<Vec<String>>;
}

/// `HashMap`-backed store.
///
/// Mirrors the database's unique constraints: one request row per ordered
/// (sender, receiver) and one follow edge per ordered pair.
#[derive(Debug, Default)]
pub struct MemoryStore {
    requests: HashMap<String, FriendRequest>,
    follows: HashMap<(String, String), FollowEdge>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn follow_count(&self) -> usize {
        self.follows.len()
    }
}

impl RelationshipStore for MemoryStore {
    fn requests_between(&self, a: &str, b: &str) -> Result<Vec<FriendRequest>> {
        let mut found: Vec<FriendRequest> = self
            .requests
            .values()
            .filter(|r| r.involves_pair(a, b))
            .cloned()
            .collect();
        found.sort_by(|x, y| x.id.cmp(&y.id));
        Ok(found)
    }

    fn find_request(&self, id: &str) -> Result<Option<FriendRequest>> {
        Ok(self.requests.get(id).cloned())
    }

    fn requests_for(&self, user_id: &str) -> Result<Vec<FriendRequest>> {
        let mut found: Vec<FriendRequest> = self
            .requests
            .values()
            .filter(|r| r.sender_id == user_id || r.receiver_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|x, y| x.id.cmp(&y.id));
        Ok(found)
    }

    fn insert_request(&mut self, request: FriendRequest) -> Result<()> {
        let existing = self
            .requests
            .values()
            .find(|r| r.sender_id == request.sender_id && r.receiver_id == request.receiver_id)
            .map(|r| (r.id.clone(), r.status));

        match existing {
            Some((id, RequestStatus::Declined)) => {
                debug!(%id, "replacing declined request row");
                self.requests.remove(&id);
            }
            Some((id, _)) => {
                return Err(SocialError::Storage(format!(
                    "unique constraint violated: request {id} already exists for this sender and receiver"
                )));
            }
            None => {}
        }

        self.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn update_status(&mut self, id: &str, status: RequestStatus) -> Result<()> {
        let request = self
            .requests
            .get_mut(id)
            .ok_or_else(|| SocialError::Storage(format!("request {id} does not exist")))?;
        request.status = status;
        request.updated_at = Utc::now();
        Ok(())
    }

    fn delete_request(&mut self, id: &str) -> Result<()> {
        self.requests
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SocialError::Storage(format!("request {id} does not exist")))
    }

    fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        Ok(self
            .follows
            .contains_key(&(follower_id.to_string(), following_id.to_string())))
    }

    fn insert_follow(&mut self, edge: FollowEdge) -> Result<()> {
        let key = (edge.follower_id.clone(), edge.following_id.clone());
        if self.follows.contains_key(&key) {
            return Err(SocialError::Storage(format!(
                "unique constraint violated: {} already follows {}",
                key.0, key.1
            )));
        }
        self.follows.insert(key, edge);
        Ok(())
    }

    fn delete_follow(&mut self, follower_id: &str, following_id: &str) -> Result<()> {
        self.follows
            .remove(&(follower_id.to_string(), following_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| {
                SocialError::Storage(format!("{follower_id} does not follow {following_id}"))
            })
    }

    fn followers_of(&self, user_id: &str) -> Result<Vec<String>> {
        let followers: BTreeSet<String> = self
            .follows
            .values()
            .filter(|e| e.following_id == user_id)
            .map(|e| e.follower_id.clone())
            .collect();
        Ok(followers.into_iter().collect())
    }

    fn following_of(&self, user_id: &str) -> Result<Vec<String>> {
        let following: BTreeSet<String> = self
            .follows
            .values()
            .filter(|e| e.follower_id == user_id)
            .map(|e| e.following_id.clone())
            .collect();
        Ok(following.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query_requests() {
        let mut store = MemoryStore::new();
        let request = FriendRequest::pending("alice", "bob");
        let id = request.id.clone();
        store.insert_request(request).unwrap();

        assert_eq!(store.requests_between("bob", "alice").unwrap().len(), 1);
        assert!(store.requests_between("alice", "carol").unwrap().is_empty());
        assert_eq!(store.requests_for("bob").unwrap().len(), 1);
        assert!(store.find_request(&id).unwrap().is_some());
    }

    #[test]
    fn test_duplicate_ordered_pair_is_rejected() {
        let mut store = MemoryStore::new();
        store.insert_request(FriendRequest::pending("alice", "bob")).unwrap();
        let result = store.insert_request(FriendRequest::pending("alice", "bob"));
        assert!(matches!(result, Err(SocialError::Storage(_))));
    }

    #[test]
    fn test_declined_row_is_replaced() {
        let mut store = MemoryStore::new();
        let first = FriendRequest::pending("alice", "bob");
        let first_id = first.id.clone();
        store.insert_request(first).unwrap();
        store.update_status(&first_id, RequestStatus::Declined).unwrap();

        store.insert_request(FriendRequest::pending("alice", "bob")).unwrap();
        assert_eq!(store.request_count(), 1);
        assert!(store.find_request(&first_id).unwrap().is_none());
    }

    #[test]
    fn test_follow_edges() {
        let mut store = MemoryStore::new();
        store.insert_follow(FollowEdge::new("alice", "bob")).unwrap();
        store.insert_follow(FollowEdge::new("carol", "bob")).unwrap();

        assert!(store.is_following("alice", "bob").unwrap());
        assert!(!store.is_following("bob", "alice").unwrap());
        assert_eq!(store.followers_of("bob").unwrap(), vec!["alice", "carol"]);
        assert_eq!(store.following_of("alice").unwrap(), vec!["bob"]);

        assert!(store.insert_follow(FollowEdge::new("alice", "bob")).is_err());
        store.delete_follow("alice", "bob").unwrap();
        assert!(store.delete_follow("alice", "bob").is_err());
        assert_eq!(store.follow_count(), 1);
    }
}
