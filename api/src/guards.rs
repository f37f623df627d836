//! Authorization guards for request handlers.
//!
//! Handlers resolve the session into an `Option<Principal>` and the target
//! into a [`Resource`], then call one of these before touching storage.
//! Every failure is already the right [`ApiError`].

use authz::{policy, Action, AdminAction, Principal, Resource, Role};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// 401 when no principal is attached to the request.
pub fn require_principal(principal: Option<&Principal>) -> ApiResult<&Principal> {
    principal.ok_or(ApiError::Unauthenticated)
}

/// 401 without a principal, 403 when the rules deny the action.
pub fn authorize<'a>(
    principal: Option<&'a Principal>,
    action: Action,
    resource: &Resource,
) -> ApiResult<&'a Principal> {
    let principal = require_principal(principal)?;

    if policy::permits(principal, action, resource) {
        debug!(
            "AUTHZ: Access ALLOWED for {} {} {}",
            principal.id, action, resource.id
        );
        return Ok(principal);
    }

    warn!(
        "AUTHZ: Access DENIED for {} ({}) {} {}",
        principal.id, principal.role, action, resource.id
    );

    if action == Action::Reply && resource.locked {
        return Err(ApiError::Forbidden("This post is locked".to_string()));
    }
    Err(ApiError::Forbidden(
        "You do not have permission to perform this action".to_string(),
    ))
}

/// Admin-only endpoints (user management, category CRUD).
pub fn require_admin(principal: Option<&Principal>) -> ApiResult<&Principal> {
    let principal = require_principal(principal)?;
    if policy::require_admin_action(principal) {
        Ok(principal)
    } else {
        warn!("AUTHZ: admin action refused for {}", principal.id);
        Err(ApiError::Forbidden("Admin access required".to_string()))
    }
}

/// Deactivate, delete or demote an account without emptying the admin set.
pub fn authorize_account_action(
    principal: Option<&Principal>,
    action: AdminAction,
    target_is_admin: bool,
    active_admin_count: usize,
) -> ApiResult<()> {
    let actor = require_principal(principal)?;
    policy::authorize_account_action(actor, action, target_is_admin, active_admin_count)
        .map_err(ApiError::from)
}

pub fn authorize_role_change(
    principal: Option<&Principal>,
    target_role: Role,
    new_role: Role,
    active_admin_count: usize,
) -> ApiResult<()> {
    let actor = require_principal(principal)?;
    policy::authorize_role_change(actor, target_role, new_role, active_admin_count)
        .map_err(ApiError::from)
}
