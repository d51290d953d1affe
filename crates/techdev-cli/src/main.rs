mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, role::RoleSubcommand, standup::StandupSubcommand,
    team::TeamSubcommand, token::TokenSubcommand, Credentials,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "techdev",
    about = "Team formation for developer intern cohorts: accounts, roles, rosters, and standups",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from .techdev/)
    #[arg(long, global = true, env = "TECHDEV_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Account identifier to act as
    #[arg(long, short = 'u', global = true, env = "TECHDEV_USER")]
    user: Option<String>,

    /// Password for --user
    #[arg(long, global = true, env = "TECHDEV_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .techdev/ and a default config
    Init,

    /// Register a new account (password from --password)
    Register { identifier: String },

    /// Check credentials and show the account's role
    Login,

    /// Show the logged-in account, role state, and team
    Whoami,

    /// Show or choose a role
    Role {
        #[command(subcommand)]
        subcommand: RoleSubcommand,
    },

    /// Tech lead verification tokens
    Token {
        #[command(subcommand)]
        subcommand: TokenSubcommand,
    },

    /// Manage your own team (Developer Interns)
    Team {
        #[command(subcommand)]
        subcommand: TeamSubcommand,
    },

    /// List every team (verified Tech Leads)
    Teams,

    /// Platform statistics (verified Tech Leads)
    Stats,

    /// Submit and list daily standups
    Standup {
        #[command(subcommand)]
        subcommand: StandupSubcommand,
    },

    /// Validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Interactive session reading commands from stdin
    Shell,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Shell => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let creds = Credentials {
        user: cli.user,
        password: cli.password,
    };

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Register { identifier } => {
            cmd::account::register(&root, &identifier, &creds, cli.json)
        }
        Commands::Login => cmd::account::login(&root, &creds, cli.json),
        Commands::Whoami => cmd::account::whoami(&root, &creds, cli.json),
        Commands::Role { subcommand } => cmd::role::run(&root, subcommand, &creds, cli.json),
        Commands::Token { subcommand } => cmd::token::run(subcommand, cli.json),
        Commands::Team { subcommand } => cmd::team::run(&root, subcommand, &creds, cli.json),
        Commands::Teams => cmd::team::overview(&root, &creds, cli.json),
        Commands::Stats => cmd::stats::run(&root, &creds, cli.json),
        Commands::Standup { subcommand } => {
            cmd::standup::run(&root, subcommand, &creds, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Shell => cmd::shell::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
