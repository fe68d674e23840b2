//! Likegraph CLI - drive the likes-graph store from the command line

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use likegraph::Store;
use likegraph::config::{self, Config};

mod commands;

#[derive(Parser)]
#[command(name = "likegraph")]
#[command(version)]
#[command(about = "Portable likes-graph store - users, roles and appreciates edges")]
#[command(long_about = r#"
Likegraph persists a small social graph (users, roles, directed
"appreciates" edges) in a relational database and keeps the SQL portable
across engine dialects.

Example usage:
  likegraph init
  likegraph reset
  likegraph test-users --base t --count 2
  likegraph set-appreciated --user 2 --targets 3
  likegraph set-appreciated --user 3 --targets 2
  likegraph friends --user 2
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON where applicable
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Show the connection URL for the configured engine
    Url,

    /// Create the role, user and appreciates tables
    CreateSchema,

    /// Drop the schema, best-effort, reporting each step
    DropSchema,

    /// Drop, recreate and seed the schema
    Reset,

    /// Seed the base roles and the admin account
    Seed,

    /// List all roles
    Roles,

    /// List all users
    Users,

    /// Create a user
    CreateUser {
        #[arg(short, long)]
        login: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Role id (2 is the seeded "user" role)
        #[arg(short, long, default_value = "2")]
        role: i64,
    },

    /// Create numbered test users
    TestUsers {
        /// Login prefix
        #[arg(short, long)]
        base: String,

        #[arg(short, long)]
        count: u32,
    },

    /// Delete a user by id (fails while appreciates edges reference it)
    DeleteUser {
        #[arg(short, long)]
        id: i64,
    },

    /// Check credentials
    Login {
        #[arg(short, long)]
        login: String,

        #[arg(short, long)]
        password: String,
    },

    /// List the users a user appreciates
    Appreciated {
        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// List the users who appreciate a user
    Fans {
        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// List a user's friends (mutual appreciation)
    Friends {
        /// User id
        #[arg(short, long)]
        user: i64,
    },

    /// Replace a user's outgoing appreciates edges atomically
    SetAppreciated {
        /// User id
        #[arg(short, long)]
        user: i64,

        /// Target user ids (repeat or comma-separate; empty clears the set)
        #[arg(short, long, value_delimiter = ',', num_args = 0..)]
        targets: Vec<i64>,
    },
}

fn load_or_default(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    Ok(config::load_config(path.map(|p| p.as_path()))?.unwrap_or_default())
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    let store = Store::connect(
        config.engine,
        config.host(),
        config.port(),
        &config.database,
    )?;
    Ok(store)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            commands::run_init(&path, force)
        }
        Commands::Url => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_url(&config)
        }
        Commands::CreateSchema => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_create_schema(&mut open_store(&config)?)
        }
        Commands::DropSchema => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_drop_schema(&open_store(&config)?)
        }
        Commands::Reset => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_reset(&mut open_store(&config)?)
        }
        Commands::Seed => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_seed(&open_store(&config)?)
        }
        Commands::Roles => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_roles(&open_store(&config)?, cli.json)
        }
        Commands::Users => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_users(&open_store(&config)?, cli.json)
        }
        Commands::CreateUser {
            login,
            password,
            description,
            role,
        } => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_create_user(&open_store(&config)?, login, password, description, role)
        }
        Commands::TestUsers { base, count } => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_test_users(&open_store(&config)?, &base, count)
        }
        Commands::DeleteUser { id } => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_delete_user(&open_store(&config)?, id)
        }
        Commands::Login { login, password } => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_login(&open_store(&config)?, &login, &password)
        }
        Commands::Appreciated { user } => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_appreciated(&open_store(&config)?, user, cli.json)
        }
        Commands::Fans { user } => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_fans(&open_store(&config)?, user, cli.json)
        }
        Commands::Friends { user } => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_friends(&open_store(&config)?, user, cli.json)
        }
        Commands::SetAppreciated { user, targets } => {
            let config = load_or_default(cli.config.as_ref())?;
            commands::run_set_appreciated(&mut open_store(&config)?, user, &targets)
        }
    }
}
