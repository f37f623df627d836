use anyhow::Result;
use authz::{policy, AdminAction, LastAdminDecision};
use colored::*;
use serde::Serialize;

use crate::utils::{output::emit, settings::OutputFormat};

#[derive(Debug, Serialize)]
pub struct GuardReport {
    pub action: AdminAction,
    pub target_is_admin: bool,
    pub active_admin_count: usize,
    pub decision: LastAdminDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Run the last-admin guard for an account action
pub fn execute(
    action: AdminAction,
    target_is_admin: bool,
    active_admin_count: usize,
    format: OutputFormat,
) -> Result<bool> {
    let decision = policy::guard_last_admin(action, target_is_admin, active_admin_count);
    let reason = match decision {
        LastAdminDecision::Allow => None,
        LastAdminDecision::Deny => Some(authz::error::AuthzError::LastAdmin(action).to_string()),
    };

    let report = GuardReport {
        action,
        target_is_admin,
        active_admin_count,
        decision,
        reason,
    };

    emit(format, &report, |r| match &r.reason {
        None => println!("{} {}", "ALLOW".green().bold(), r.action),
        Some(reason) => println!("{} {}", "DENY".red().bold(), reason),
    })?;

    Ok(decision.is_allowed())
}
