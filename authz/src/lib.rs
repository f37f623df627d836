//! Authorization policy for the forum.
//!
//! Two layers live here:
//!
//! - [`policy`] holds the rules as plain functions over a [`Principal`],
//!   an [`Action`] and the [`Resource`] facts. Request handlers call these.
//! - [`AuthzEngine`] holds the same rules as a [Cedar](https://www.cedarpolicy.com/)
//!   policy set and evaluates requests against it. It exists so the rule set
//!   can be audited as policy text; its decisions must match [`policy::permits`].
//!
//! # Rules
//!
//! Roles are ordered `BEGINNER < CONTRIBUTOR < ADMIN`.
//!
//! | Action                     | Allowed for                          |
//! |----------------------------|--------------------------------------|
//! | moderate                   | CONTRIBUTOR and above, on any content |
//! | edit, delete               | the author, or ADMIN                 |
//! | pin, lock                  | ADMIN                                |
//! | manage_users               | ADMIN, subject to the last-admin guard |
//! | mutate_category            | ADMIN                                |
//! | reply                      | anyone signed in, unless locked      |
//!
//! Deny is the default, and a lock beats every permit.

pub mod error;
pub mod policy;
pub mod types;

use cedar_policy::{
    Authorizer, Context, Decision, Entities, EntityId, EntityTypeName, EntityUid, PolicySet,
    Request,
};
use error::{AuthzError, Result};
use std::str::FromStr;
use tracing::{debug, warn};
pub use types::{Action, AdminAction, LastAdminDecision, Principal, Resource, ResourceKind, Role};

/// Cedar entity type for principals. Distinct from the `User` resource type
/// so a user acting on their own profile does not collide in the entity store.
const PRINCIPAL_TYPE: &str = "Member";

/// The forum rule set in Cedar syntax.
pub const FORUM_POLICIES: &str = r#"
// Authors edit and delete their own posts and replies.
permit(
    principal,
    action in [Action::"edit", Action::"delete"],
    resource
) when { resource has author && resource.author == principal.uid };

// Contributors and admins moderate everything.
permit(
    principal,
    action == Action::"moderate",
    resource
) when { principal.rank >= 2 };

// Every member may reply.
permit(
    principal,
    action == Action::"reply",
    resource
) when { principal.rank >= 1 };

// Admins may do anything that is not forbidden.
permit(
    principal,
    action,
    resource
) when { principal.rank >= 3 };

// Locked threads take no new replies.
forbid(
    principal,
    action == Action::"reply",
    resource
) when { resource has locked && resource.locked };
"#;

/// Evaluates [`FORUM_POLICIES`] with Cedar.
///
/// # Example
///
/// ```rust
/// use authz::{AuthzEngine, Action, Principal, Resource};
///
/// let engine = AuthzEngine::new().unwrap();
/// let principal = Principal::beginner("u1");
/// let post = Resource::post("p1", "u1");
///
/// assert!(engine.is_authorized(&principal, Action::Edit, &post).unwrap());
/// assert!(!engine.is_authorized(&principal, Action::Pin, &post).unwrap());
/// ```
pub struct AuthzEngine {
    authorizer: Authorizer,
    policies: PolicySet,
}

impl AuthzEngine {
    /// Creates an engine over the built-in forum policies.
    pub fn new() -> Result<Self> {
        Self::with_policies(FORUM_POLICIES)
    }

    /// Creates an engine over a custom policy source.
    pub fn with_policies(policy_src: &str) -> Result<Self> {
        let policies =
            PolicySet::from_str(policy_src).map_err(|e| AuthzError::PolicyParse(e.to_string()))?;

        Ok(Self {
            authorizer: Authorizer::new(),
            policies,
        })
    }

    /// Returns `Ok(true)` only when a permit matches and no forbid does.
    pub fn is_authorized(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> Result<bool> {
        let entities = self.build_entities(principal, resource)?;
        let request = self.build_cedar_request(principal, action, resource)?;

        let response = self
            .authorizer
            .is_authorized(&request, &self.policies, &entities);
        let allowed = response.decision() == Decision::Allow;

        if allowed {
            debug!(
                principal = %principal.id,
                action = %action,
                resource = %resource.id,
                "cedar decision: allow"
            );
        } else {
            warn!(
                principal = %principal.id,
                role = %principal.role,
                action = %action,
                resource = %resource.id,
                "cedar decision: deny"
            );
        }

        Ok(allowed)
    }

    /// Builds the entity store for one request: the principal, the resource
    /// and every action.
    fn build_entities(&self, principal: &Principal, resource: &Resource) -> Result<Entities> {
        let mut resource_attrs = serde_json::Map::new();
        resource_attrs.insert("locked".to_string(), serde_json::json!(resource.locked));
        if let Some(author_id) = &resource.author_id {
            resource_attrs.insert("author".to_string(), serde_json::json!(author_id));
        }

        let mut entities = vec![
            serde_json::json!({
                "uid": { "type": PRINCIPAL_TYPE, "id": principal.id },
                "attrs": {
                    "uid": principal.id,
                    "rank": principal.role.rank(),
                },
                "parents": []
            }),
            serde_json::json!({
                "uid": { "type": resource.kind.type_name(), "id": resource.id },
                "attrs": resource_attrs,
                "parents": []
            }),
        ];

        entities.extend(Action::ALL.iter().map(|action| {
            serde_json::json!({
                "uid": { "type": "Action", "id": action.name() },
                "attrs": {},
                "parents": []
            })
        }));

        Entities::from_json_value(serde_json::Value::Array(entities), None)
            .map_err(|e| AuthzError::EntityCreation(e.to_string()))
    }

    fn build_cedar_request(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> Result<Request> {
        let principal_uid = entity_uid(PRINCIPAL_TYPE, &principal.id)?;
        let action_uid = entity_uid("Action", action.name())?;
        let resource_uid = entity_uid(resource.kind.type_name(), &resource.id)?;

        Request::new(
            Some(principal_uid),
            Some(action_uid),
            Some(resource_uid),
            Context::empty(),
            None,
        )
        .map_err(|e| AuthzError::EvaluationError(e.to_string()))
    }
}

fn entity_uid(type_name: &str, id: &str) -> Result<EntityUid> {
    let type_name = EntityTypeName::from_str(type_name)
        .map_err(|e| AuthzError::EntityCreation(format!("Invalid entity type: {}", e)))?;
    Ok(EntityUid::from_type_name_and_id(type_name, EntityId::new(id)))
}
