//! Rejection reasons for social-graph operations.
//!
//! The `Display` text of each policy variant is the exact message returned
//! to API clients.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocialError {
    #[error("Cannot friend yourself")]
    SelfFriendRequest,

    #[error("Already friends with this user")]
    AlreadyFriends,

    #[error("Friend request already exists")]
    RequestAlreadyExists,

    /// No pending request addressed to the caller under that id.
    #[error("Friend request not found")]
    RequestNotFound,

    #[error("Friendship not found")]
    FriendshipNotFound,

    #[error("Cannot follow yourself")]
    SelfFollow,

    #[error("Already following this user")]
    AlreadyFollowing,

    #[error("Not following this user")]
    NotFollowing,

    /// The backing store failed. Not a policy decision.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SocialError {
    /// Reason string consumed verbatim by the HTTP layer.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// True for rejections that mean "the thing you named does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SocialError::RequestNotFound | SocialError::FriendshipNotFound
        )
    }
}

pub type Result<T> = std::result::Result<T, SocialError>;
