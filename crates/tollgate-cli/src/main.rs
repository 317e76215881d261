//! Tollgate command-line tool.
//!
//! Works directly on a project's store snapshot: seed it, inspect the
//! permission matrix, ask for decisions and manage users.
//!
//! # Quick Start
//!
//! ```bash
//! # Create tollgate.toml and a seeded snapshot
//! tollgate init
//!
//! # Add a user and promote them
//! tollgate user add alice alice@example.com
//! tollgate user role alice Manager
//!
//! # Would alice be allowed to update someone's order?
//! tollgate check alice update orders --owner bob
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tollgate_config::ConfigLoader;
use tracing_subscriber::EnvFilter;

/// Tollgate - role-based access control for business objects.
#[derive(Parser)]
#[command(name = "tollgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding tollgate.toml.
    #[arg(short = 'p', long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create tollgate.toml and a seeded store snapshot.
    Init {
        /// Overwrite an existing snapshot with a freshly seeded one.
        #[arg(long)]
        force: bool,
    },

    /// Evaluate an authorization decision.
    Check {
        /// Username of the acting principal.
        user: String,

        /// Action: list, retrieve, create, update or delete.
        action: String,

        /// Business resource name, e.g. orders.
        resource: String,

        /// Username owning the target object.
        #[arg(long, conflicts_with = "object")]
        owner: Option<String>,

        /// Id of the target object; its recorded owner is used.
        #[arg(long)]
        object: Option<u64>,
    },

    /// Print the permission matrix.
    Rules,

    /// User management.
    #[command(subcommand)]
    User(UserCommands),
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user with the default role.
    Add {
        username: String,

        email: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// List users.
    List,

    /// Assign a role to a user.
    Role {
        username: String,

        /// Role name, or "none" to clear the role.
        role: String,
    },

    /// Deactivate a user and invalidate their credentials.
    Deactivate { username: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        style::set_no_color(true);
    }

    // RUST_LOG wins; otherwise the configured filter, then "info".
    let default_filter = ConfigLoader::new()
        .with_project_dir(&cli.project_dir)
        .load()
        .map(|config| config.logging.filter)
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let dir = cli.project_dir.as_path();
    match cli.command {
        Commands::Init { force } => commands::init::run(dir, force),
        Commands::Check {
            user,
            action,
            resource,
            owner,
            object,
        } => commands::check::run(dir, &user, &action, &resource, owner.as_deref(), object),
        Commands::Rules => commands::rules::run(dir),
        Commands::User(cmd) => match cmd {
            UserCommands::Add {
                username,
                email,
                first_name,
                last_name,
            } => commands::user::add(dir, &username, &email, &first_name, &last_name),
            UserCommands::List => commands::user::list(dir),
            UserCommands::Role { username, role } => commands::user::role(dir, &username, &role),
            UserCommands::Deactivate { username } => commands::user::deactivate(dir, &username),
        },
    }
}
