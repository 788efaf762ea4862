use clap::{Parser, Subcommand};
use gitbridge::config::{Config, ConfigError};
use gitbridge::error::AppResult;
use gitbridge::{GitRunner, GitVersion, Repository};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitbridge")]
#[command(about = "Query a git repository and print the result as JSON", long_about = None)]
pub struct Cli {
    /// Repository directory (defaults to the one containing the current directory)
    #[arg(short = 'C', long, global = true)]
    pub repo: Option<PathBuf>,

    /// Config file (defaults to ~/.config/gitbridge/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full repository status
    Status,
    /// Number of staged, unstaged and untracked changes
    Changes,
    /// Local branches
    Branches,
    /// Configured remotes
    Remotes,
    /// Commit history
    Log {
        /// Maximum number of commits
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Installed git version
    Version,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => match Config::load() {
            Err(ConfigError::ReadError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Config::default_config())
            }
            other => other,
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = load_config(cli.config.as_ref())?;

    if let Some(repo) = cli.repo {
        config.git.repo_root = Some(repo);
    } else if config.git.repo_root.is_none() {
        let cwd = std::env::current_dir()?;
        config.git.repo_root = Some(gitbridge::git::repository::find_root(&cwd)?);
    }

    let runner = GitRunner::from_config(&config)?;

    if let Commands::Version = cli.command {
        return print_json(&GitVersion::detect(&runner).await?);
    }

    GitVersion::validate(&runner).await?;
    let repo = Repository::new(runner);

    match cli.command {
        Commands::Status => print_json(&repo.status().get_full_status().await?),
        Commands::Changes => print_json(&repo.status().count_changes().await?),
        Commands::Branches => print_json(&repo.branches().list().await?),
        Commands::Remotes => print_json(&repo.remotes().list().await?),
        Commands::Log { count } => print_json(&repo.commits().history(count).await?),
        Commands::Version => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
