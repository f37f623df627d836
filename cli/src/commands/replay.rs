use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use social::{
    FriendshipState, MemoryStore, RelationshipStore, SocialConfig, SocialError,
    SocialGraphPolicy, SocialService,
};
use std::path::Path;
use tracing::info;

use crate::utils::{output::emit, settings::OutputFormat};

/// A scenario file: optional policy overrides and an ordered list of steps.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<SocialConfig>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Send,
    Accept,
    Decline,
    Remove,
    Follow,
    Unfollow,
}

/// `accept` and `decline` act on the pending request sent by `target` to `actor`.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub op: Op,
    pub actor: String,
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct Outcome {
    pub step: usize,
    pub op: Op,
    pub actor: String,
    pub target: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Friendship state after the step, seen by the actor
    pub state: FriendshipState,
    pub following: bool,
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse scenario {}", path.display()))
}

/// Replay every step against an in-memory store
pub fn run(scenario: &Scenario, defaults: SocialConfig) -> Result<Vec<Outcome>> {
    let config = scenario.config.unwrap_or(defaults);
    let mut service = SocialService::new(SocialGraphPolicy::new(config), MemoryStore::new());

    let mut outcomes = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let result = apply(&mut service, step);
        if let Err(SocialError::Storage(detail)) = &result {
            anyhow::bail!("step {}: storage failure: {}", index + 1, detail);
        }

        outcomes.push(Outcome {
            step: index + 1,
            op: step.op,
            actor: step.actor.clone(),
            target: step.target.clone(),
            ok: result.is_ok(),
            error: result.err().map(|e| e.reason()),
            state: service.state_between(&step.actor, &step.target)?,
            following: service.store().is_following(&step.actor, &step.target)?,
        });
    }

    info!(steps = outcomes.len(), "scenario replayed");
    Ok(outcomes)
}

fn apply(service: &mut SocialService<MemoryStore>, step: &Step) -> social::Result<()> {
    let (actor, target) = (step.actor.as_str(), step.target.as_str());
    match step.op {
        Op::Send => service.send_request(actor, target).map(|_| ()),
        Op::Accept => {
            let request = service
                .pending_request(target, actor)?
                .ok_or(SocialError::RequestNotFound)?;
            service.accept_request(actor, &request.id).map(|_| ())
        }
        Op::Decline => {
            let request = service
                .pending_request(target, actor)?
                .ok_or(SocialError::RequestNotFound)?;
            service.decline_request(actor, &request.id).map(|_| ())
        }
        Op::Remove => service.remove_friend(actor, target).map(|_| ()),
        Op::Follow => service.follow(actor, target),
        Op::Unfollow => service.unfollow(actor, target),
    }
}

/// Execute the replay command
pub fn replay(path: &Path, defaults: SocialConfig, format: OutputFormat) -> Result<()> {
    let scenario = load_scenario(path)?;
    let outcomes = run(&scenario, defaults)?;

    emit(format, &outcomes, |outcomes| {
        println!("{}", "Social Graph Replay".bold());
        for o in outcomes {
            let status = match &o.error {
                None => "ok".green().to_string(),
                Some(reason) => format!("{} {}", "rejected:".red(), reason),
            };
            println!(
                "{:>3}. {:<8} {} -> {}: {} (state: {}, following: {})",
                o.step,
                format!("{:?}", o.op).to_lowercase(),
                o.actor,
                o.target,
                status,
                o.state,
                o.following
            );
        }
    })
}
