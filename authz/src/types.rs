//! Core authorization types for the forum policy.
//!
//! A decision is always made over three facts supplied by the caller: the
//! [`Principal`] acting, the [`Action`] requested, and the [`Resource`] it
//! targets. None of these types reach into storage; request handlers load
//! them and hand them over.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthzError;

/// Forum membership role.
///
/// Roles are totally ordered: `Beginner < Contributor < Admin`. Every
/// "at least" check goes through [`Role::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Beginner,
    Contributor,
    Admin,
}

impl Role {
    /// All roles, lowest rank first.
    pub const ALL: [Role; 3] = [Role::Beginner, Role::Contributor, Role::Admin];

    /// Numeric rank used for ordering checks.
    pub fn rank(self) -> u8 {
        match self {
            Role::Beginner => 1,
            Role::Contributor => 2,
            Role::Admin => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Beginner => "BEGINNER",
            Role::Contributor => "CONTRIBUTOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BEGINNER" => Ok(Role::Beginner),
            "CONTRIBUTOR" => Ok(Role::Contributor),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(AuthzError::UnknownRole(s.to_string())),
        }
    }
}

/// The authenticated actor making a request.
///
/// Principals must be built from a verified session or token. The role is
/// treated as fixed for the duration of one decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque user identifier (a ULID in the forum database)
    pub id: String,

    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn beginner(id: impl Into<String>) -> Self {
        Self::new(id, Role::Beginner)
    }

    pub fn contributor(id: impl Into<String>) -> Self {
        Self::new(id, Role::Contributor)
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, Role::Admin)
    }
}

/// Something a principal asks to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Hide, flag or otherwise moderate any content
    Moderate,
    Edit,
    Delete,
    Pin,
    Lock,
    /// Change roles, deactivate or delete accounts
    ManageUsers,
    /// Create, rename or delete categories
    MutateCategory,
    /// Post a reply to a thread
    Reply,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Moderate,
        Action::Edit,
        Action::Delete,
        Action::Pin,
        Action::Lock,
        Action::ManageUsers,
        Action::MutateCategory,
        Action::Reply,
    ];

    /// Stable name, also used as the Cedar action entity id.
    pub fn name(self) -> &'static str {
        match self {
            Action::Moderate => "moderate",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Pin => "pin",
            Action::Lock => "lock",
            Action::ManageUsers => "manage_users",
            Action::MutateCategory => "mutate_category",
            Action::Reply => "reply",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Action::ALL
            .into_iter()
            .find(|action| action.name() == normalized)
            .ok_or_else(|| AuthzError::UnknownAction(s.to_string()))
    }
}

/// Kind of forum object a resource refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Post,
    Reply,
    Category,
    User,
}

impl ResourceKind {
    /// Cedar entity type name.
    pub fn type_name(self) -> &'static str {
        match self {
            ResourceKind::Post => "Post",
            ResourceKind::Reply => "Reply",
            ResourceKind::Category => "Category",
            ResourceKind::User => "User",
        }
    }
}

/// Facts about the resource being acted upon.
///
/// `author_id` is the only ownership fact the rules consult. `locked` only
/// matters for posts, where it blocks new replies for everyone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default)]
    pub locked: bool,
}

impl Resource {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            author_id: None,
            locked: false,
        }
    }

    /// A post written by `author_id`.
    pub fn post(id: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::Post).authored_by(author_id)
    }

    /// A reply written by `author_id`.
    pub fn reply(id: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::Reply).authored_by(author_id)
    }

    pub fn category(id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::Category)
    }

    pub fn authored_by(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id.as_deref() == Some(user_id)
    }
}

/// Account-level actions protected by the last-admin guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Demote,
    Deactivate,
    Delete,
}

impl AdminAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AdminAction::Demote => "demote",
            AdminAction::Deactivate => "deactivate",
            AdminAction::Delete => "delete",
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminAction {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demote" => Ok(AdminAction::Demote),
            "deactivate" => Ok(AdminAction::Deactivate),
            "delete" => Ok(AdminAction::Delete),
            _ => Err(AuthzError::UnknownAction(s.to_string())),
        }
    }
}

/// Outcome of the last-admin guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastAdminDecision {
    Allow,
    Deny,
}

impl LastAdminDecision {
    pub fn is_allowed(self) -> bool {
        self == LastAdminDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_rank_matches_ordering() {
        assert_eq!(Role::Beginner.rank(), 1);
        assert_eq!(Role::Contributor.rank(), 2);
        assert_eq!(Role::Admin.rank(), 3);

        for a in Role::ALL {
            for b in Role::ALL {
                assert_eq!(a.rank().cmp(&b.rank()), a.cmp(&b));
            }
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("contributor".parse::<Role>().unwrap(), Role::Contributor);
        assert_eq!(" Beginner ".parse::<Role>().unwrap(), Role::Beginner);
        assert!(matches!(
            "moderator".parse::<Role>(),
            Err(AuthzError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_role_serializes_as_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Contributor).unwrap(), "\"CONTRIBUTOR\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_principal_helpers() {
        let principal = Principal::contributor("01H8XGJWBWBAQ4Z4M9D5K4Z3E1");
        assert_eq!(principal.role, Role::Contributor);
        assert_eq!(principal.id, "01H8XGJWBWBAQ4Z4M9D5K4Z3E1");
        assert_eq!(Principal::admin("a").role, Role::Admin);
        assert_eq!(Principal::beginner("b").role, Role::Beginner);
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(action.name().parse::<Action>().unwrap(), action);
        }
        assert_eq!("manage-users".parse::<Action>().unwrap(), Action::ManageUsers);
        assert!("publish".parse::<Action>().is_err());
    }

    #[test]
    fn test_resource_builders() {
        let post = Resource::post("p1", "u1").with_locked(true);
        assert_eq!(post.kind, ResourceKind::Post);
        assert!(post.is_authored_by("u1"));
        assert!(!post.is_authored_by("u2"));
        assert!(post.locked);

        let category = Resource::category("c1");
        assert!(category.author_id.is_none());
        assert!(!category.is_authored_by("u1"));
    }

    #[test]
    fn test_admin_action_parsing() {
        assert_eq!("Deactivate".parse::<AdminAction>().unwrap(), AdminAction::Deactivate);
        assert!("ban".parse::<AdminAction>().is_err());
    }
}
