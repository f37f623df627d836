//! Pure authorization rules.
//!
//! Every function here is a total decision over caller-supplied facts. No
//! storage access, no clock, no globals. The Cedar engine in the crate root
//! must agree with [`permits`] for every input.

use tracing::{debug, warn};

use crate::error::{AuthzError, Result};
use crate::types::{Action, AdminAction, LastAdminDecision, Principal, Resource, Role};

/// True iff `actual` ranks at least as high as `required`.
pub fn has_role(actual: Role, required: Role) -> bool {
    actual.rank() >= required.rank()
}

/// Contributors and admins may moderate any content, not only their own.
pub fn can_moderate(principal: &Principal) -> bool {
    has_role(principal.role, Role::Contributor)
}

/// Authors may edit or delete their own content; admins may touch anything.
///
/// Contributors get no extra rights over beginners' content.
pub fn can_edit_or_delete(principal: &Principal, resource_author_id: &str) -> bool {
    principal.id == resource_author_id || has_role(principal.role, Role::Admin)
}

pub fn can_manage_users(principal: &Principal) -> bool {
    has_role(principal.role, Role::Admin)
}

/// Same rule as [`can_manage_users`], used by admin-only endpoints.
pub fn require_admin_action(principal: &Principal) -> bool {
    has_role(principal.role, Role::Admin)
}

pub fn can_pin_or_lock(principal: &Principal) -> bool {
    has_role(principal.role, Role::Admin)
}

/// Category create/update/delete. Listing categories needs no check.
pub fn can_mutate_category(principal: &Principal) -> bool {
    has_role(principal.role, Role::Admin)
}

/// Any member may reply unless the thread is locked. Locks bind admins too.
pub fn can_reply(resource: &Resource) -> bool {
    !resource.locked
}

/// Denies when the target is an admin and no other active admin would remain.
pub fn guard_last_admin(
    action: AdminAction,
    target_is_admin: bool,
    active_admin_count: usize,
) -> LastAdminDecision {
    if target_is_admin && active_admin_count <= 1 {
        warn!(
            action = %action,
            active_admin_count,
            "last-admin guard denied action"
        );
        LastAdminDecision::Deny
    } else {
        LastAdminDecision::Allow
    }
}

/// Dispatches an [`Action`] on a [`Resource`] to the matching rule.
pub fn permits(principal: &Principal, action: Action, resource: &Resource) -> bool {
    let allowed = match action {
        Action::Moderate => can_moderate(principal),
        Action::Edit | Action::Delete => match resource.author_id.as_deref() {
            Some(author_id) => can_edit_or_delete(principal, author_id),
            None => has_role(principal.role, Role::Admin),
        },
        Action::Pin | Action::Lock => can_pin_or_lock(principal),
        Action::ManageUsers => can_manage_users(principal),
        Action::MutateCategory => can_mutate_category(principal),
        Action::Reply => can_reply(resource),
    };

    debug!(
        principal = %principal.id,
        role = %principal.role,
        action = %action,
        resource = %resource.id,
        allowed,
        "authorization decision"
    );

    allowed
}

/// Admin-only account actions (deactivate, delete, demote) with the
/// last-admin guard applied on top.
pub fn authorize_account_action(
    actor: &Principal,
    action: AdminAction,
    target_is_admin: bool,
    active_admin_count: usize,
) -> Result<()> {
    if !require_admin_action(actor) {
        return Err(AuthzError::Forbidden("admin role required".to_string()));
    }

    match guard_last_admin(action, target_is_admin, active_admin_count) {
        LastAdminDecision::Allow => Ok(()),
        LastAdminDecision::Deny => Err(AuthzError::LastAdmin(action)),
    }
}

/// Role changes are admin-only. Lowering an admin's role counts as a demotion
/// and goes through the last-admin guard.
pub fn authorize_role_change(
    actor: &Principal,
    target_role: Role,
    new_role: Role,
    active_admin_count: usize,
) -> Result<()> {
    if !require_admin_action(actor) {
        return Err(AuthzError::Forbidden("admin role required".to_string()));
    }

    let target_is_admin = target_role == Role::Admin;
    if target_is_admin && new_role != Role::Admin {
        return authorize_account_action(
            actor,
            AdminAction::Demote,
            target_is_admin,
            active_admin_count,
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Beginner, Role::Beginner, true)]
    #[case(Role::Beginner, Role::Contributor, false)]
    #[case(Role::Beginner, Role::Admin, false)]
    #[case(Role::Contributor, Role::Beginner, true)]
    #[case(Role::Contributor, Role::Contributor, true)]
    #[case(Role::Contributor, Role::Admin, false)]
    #[case(Role::Admin, Role::Beginner, true)]
    #[case(Role::Admin, Role::Contributor, true)]
    #[case(Role::Admin, Role::Admin, true)]
    fn test_has_role(#[case] actual: Role, #[case] required: Role, #[case] expected: bool) {
        assert_eq!(has_role(actual, required), expected);
    }

    #[rstest]
    #[case(Role::Beginner, true, true)]
    #[case(Role::Beginner, false, false)]
    #[case(Role::Contributor, true, true)]
    #[case(Role::Contributor, false, false)]
    #[case(Role::Admin, true, true)]
    #[case(Role::Admin, false, true)]
    fn test_can_edit_or_delete(#[case] role: Role, #[case] is_author: bool, #[case] expected: bool) {
        let principal = Principal::new("u1", role);
        let author = if is_author { "u1" } else { "u2" };
        assert_eq!(can_edit_or_delete(&principal, author), expected);
    }

    #[test]
    fn test_beginner_edits_only_own_content() {
        let principal = Principal::beginner("u1");
        assert!(!can_edit_or_delete(&principal, "u2"));
        assert!(can_edit_or_delete(&principal, "u1"));
    }

    #[rstest]
    #[case(Role::Beginner, false)]
    #[case(Role::Contributor, true)]
    #[case(Role::Admin, true)]
    fn test_can_moderate(#[case] role: Role, #[case] expected: bool) {
        assert_eq!(can_moderate(&Principal::new("m", role)), expected);
    }

    #[rstest]
    #[case(Role::Beginner, false)]
    #[case(Role::Contributor, false)]
    #[case(Role::Admin, true)]
    fn test_admin_only_rules(#[case] role: Role, #[case] expected: bool) {
        let principal = Principal::new("x", role);
        assert_eq!(can_manage_users(&principal), expected);
        assert_eq!(require_admin_action(&principal), expected);
        assert_eq!(can_pin_or_lock(&principal), expected);
        assert_eq!(can_mutate_category(&principal), expected);
    }

    #[test]
    fn test_guard_last_admin_grid() {
        for action in [AdminAction::Demote, AdminAction::Deactivate, AdminAction::Delete] {
            for count in 0..5usize {
                for target_is_admin in [false, true] {
                    let expected = if target_is_admin && count <= 1 {
                        LastAdminDecision::Deny
                    } else {
                        LastAdminDecision::Allow
                    };
                    assert_eq!(
                        guard_last_admin(action, target_is_admin, count),
                        expected,
                        "action={action} target_is_admin={target_is_admin} count={count}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_deactivating_last_admin_is_denied() {
        assert_eq!(
            guard_last_admin(AdminAction::Deactivate, true, 1),
            LastAdminDecision::Deny
        );
        assert!(guard_last_admin(AdminAction::Deactivate, true, 2).is_allowed());
    }

    #[test]
    fn test_locked_post_refuses_replies_for_every_role() {
        let post = Resource::post("p1", "u1").with_locked(true);
        for role in Role::ALL {
            let principal = Principal::new("u1", role);
            assert!(!permits(&principal, Action::Reply, &post), "role {role}");
        }

        let open = Resource::post("p2", "u1");
        assert!(permits(&Principal::beginner("u9"), Action::Reply, &open));
    }

    #[test]
    fn test_can_reply_depends_only_on_lock() {
        assert!(can_reply(&Resource::post("p1", "u1")));
        assert!(can_reply(&Resource::reply("r1", "u1")));
        assert!(!can_reply(&Resource::post("p1", "u1").with_locked(true)));
    }

    #[test]
    fn test_permits_without_author_falls_back_to_admin() {
        let category = Resource::category("c1");
        assert!(!permits(&Principal::contributor("u1"), Action::Delete, &category));
        assert!(permits(&Principal::admin("u1"), Action::Delete, &category));
    }

    #[test]
    fn test_account_action_requires_admin() {
        let contributor = Principal::contributor("c1");
        assert!(matches!(
            authorize_account_action(&contributor, AdminAction::Delete, false, 3),
            Err(AuthzError::Forbidden(_))
        ));

        let admin = Principal::admin("a1");
        assert!(authorize_account_action(&admin, AdminAction::Delete, false, 1).is_ok());
        assert!(matches!(
            authorize_account_action(&admin, AdminAction::Delete, true, 1),
            Err(AuthzError::LastAdmin(AdminAction::Delete))
        ));
    }

    #[test]
    fn test_role_change() {
        let admin = Principal::admin("a1");

        assert!(matches!(
            authorize_role_change(&admin, Role::Admin, Role::Contributor, 1),
            Err(AuthzError::LastAdmin(AdminAction::Demote))
        ));
        assert!(authorize_role_change(&admin, Role::Admin, Role::Contributor, 2).is_ok());
        assert!(authorize_role_change(&admin, Role::Beginner, Role::Admin, 1).is_ok());
        assert!(authorize_role_change(&admin, Role::Admin, Role::Admin, 1).is_ok());

        assert!(matches!(
            authorize_role_change(&Principal::contributor("c1"), Role::Beginner, Role::Contributor, 2),
            Err(AuthzError::Forbidden(_))
        ));
    }
}
