use anyhow::Result;
use authz::{Action, AdminAction, ResourceKind, Role};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod utils;

use commands::{access, config, guard, replay};
use utils::settings::{OutputFormat, Settings};

/// Forum policy CLI - Inspect authorization and social-graph decisions
#[derive(Parser)]
#[command(name = "fpol")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to FORUM_OUTPUT_FORMAT, then text)
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether one role ranks at least as high as another
    Role {
        #[arg(value_parser = parse_role)]
        actual: Role,
        #[arg(value_parser = parse_role)]
        required: Role,
    },

    /// Decide whether a principal may perform an action on a resource
    Check {
        /// moderate, edit, delete, pin, lock, manage-users, mutate-category, reply
        #[arg(value_parser = parse_action)]
        action: Action,

        /// Role of the acting user
        #[arg(long, value_parser = parse_role)]
        role: Role,

        /// Id of the acting user
        #[arg(long)]
        user: String,

        /// Kind of resource acted on
        #[arg(long, value_enum, default_value = "post")]
        kind: KindArg,

        /// Author of the resource
        #[arg(long)]
        author: Option<String>,

        /// The resource is a locked thread
        #[arg(long)]
        locked: bool,
    },

    /// Run the last-admin guard for demote, deactivate or delete
    Guard {
        #[arg(value_parser = parse_admin_action)]
        action: AdminAction,

        /// The target account currently holds the ADMIN role
        #[arg(long)]
        target_is_admin: bool,

        /// Number of active admin accounts
        #[arg(long)]
        active_admins: usize,
    },

    /// Social-graph commands
    Social {
        #[command(subcommand)]
        action: SocialAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum SocialAction {
    /// Replay a YAML scenario of friend and follow operations
    Replay {
        /// Path to the scenario file
        scenario: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Post,
    Reply,
    Category,
    User,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Post => ResourceKind::Post,
            KindArg::Reply => ResourceKind::Reply,
            KindArg::Category => ResourceKind::Category,
            KindArg::User => ResourceKind::User,
        }
    }
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse().map_err(|e: authz::error::AuthzError| e.to_string())
}

fn parse_action(value: &str) -> Result<Action, String> {
    value.parse().map_err(|e: authz::error::AuthzError| e.to_string())
}

fn parse_admin_action(value: &str) -> Result<AdminAction, String> {
    value.parse().map_err(|e: authz::error::AuthzError| e.to_string())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging on stderr so command output stays machine-readable
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(2);
        }
    };
    let format = settings.format_or_default(cli.format);

    // Execute the command; `false` means the policy denied
    let allowed = match cli.command {
        Commands::Role { actual, required } => access::role(actual, required, format)?,
        Commands::Check {
            action,
            role,
            user,
            kind,
            author,
            locked,
        } => access::check(
            access::CheckArgs {
                action,
                role,
                user,
                kind: kind.into(),
                author,
                locked,
            },
            format,
        )?,
        Commands::Guard {
            action,
            target_is_admin,
            active_admins,
        } => guard::execute(action, target_is_admin, active_admins, format)?,
        Commands::Social { action } => match action {
            SocialAction::Replay { scenario } => {
                replay::replay(&scenario, settings.social, format)?;
                true
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                config::show(&settings, format)?;
                true
            }
        },
    };

    if !allowed {
        std::process::exit(1);
    }

    Ok(())
}
