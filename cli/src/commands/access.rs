use anyhow::{bail, Result};
use authz::{policy, Action, AuthzEngine, Principal, Resource, ResourceKind, Role};
use colored::*;
use serde::Serialize;
use tracing::debug;

use crate::utils::{output::emit, settings::OutputFormat};

#[derive(Debug, Serialize)]
pub struct RoleCheck {
    pub actual: Role,
    pub required: Role,
    pub satisfied: bool,
}

/// Compare two roles by rank
pub fn role(actual: Role, required: Role, format: OutputFormat) -> Result<bool> {
    let check = RoleCheck {
        actual,
        required,
        satisfied: policy::has_role(actual, required),
    };

    emit(format, &check, |c| {
        let verdict = if c.satisfied { "yes".green() } else { "no".red() };
        println!(
            "{} (rank {}) >= {} (rank {}): {}",
            c.actual,
            c.actual.rank(),
            c.required,
            c.required.rank(),
            verdict
        );
    })?;

    Ok(check.satisfied)
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub principal: Principal,
    pub action: Action,
    pub resource: Resource,
    pub allowed: bool,
}

pub struct CheckArgs {
    pub action: Action,
    pub role: Role,
    pub user: String,
    pub kind: ResourceKind,
    pub author: Option<String>,
    pub locked: bool,
}

/// Evaluate one authorization question with the Cedar engine
pub fn check(args: CheckArgs, format: OutputFormat) -> Result<bool> {
    let principal = Principal::new(args.user, args.role);
    let mut resource = Resource::new("cli-resource", args.kind).with_locked(args.locked);
    if let Some(author) = args.author {
        resource = resource.authored_by(author);
    }

    let engine = AuthzEngine::new()?;
    let allowed = engine.is_authorized(&principal, args.action, &resource)?;
    let expected = policy::permits(&principal, args.action, &resource);
    debug!(allowed, expected, "cedar and rule decisions");

    if allowed != expected {
        bail!(
            "Cedar policy and rule functions disagree on {} for {}: cedar={}, rules={}",
            args.action,
            principal.role,
            allowed,
            expected
        );
    }

    let report = CheckReport {
        principal,
        action: args.action,
        resource,
        allowed,
    };

    emit(format, &report, |r| {
        let verdict = if r.allowed {
            "ALLOW".green().bold()
        } else {
            "DENY".red().bold()
        };
        println!(
            "{} {} ({}) {} {:?}{}{}",
            verdict,
            r.principal.id,
            r.principal.role,
            r.action,
            r.resource.kind,
            r.resource
                .author_id
                .as_deref()
                .map(|a| format!(" by {}", a))
                .unwrap_or_default(),
            if r.resource.locked { " [locked]" } else { "" }
        );
    })?;

    Ok(allowed)
}
