//! Social-graph policy for the forum: friend requests and follows.
//!
//! [`SocialGraphPolicy`] is a pure state machine over caller-supplied
//! snapshots. [`SocialService`] pairs it with a [`RelationshipStore`] and
//! performs the reads and writes around each decision.
//!
//! Friendship is one directed record per pair whose status moves
//! `PENDING → ACCEPTED | DECLINED`; removing a friend deletes the record.
//! Follows are independent directed edges with no status.

pub mod config;
pub mod error;
pub mod policy;
pub mod service;
pub mod store;
pub mod types;

pub use config::SocialConfig;
pub use error::{Result, SocialError};
pub use policy::SocialGraphPolicy;
pub use service::SocialService;
pub use store::{MemoryStore, RelationshipStore};
pub use types::{FollowEdge, FriendRequest, FriendshipState, RelationshipSnapshot, RequestStatus};
