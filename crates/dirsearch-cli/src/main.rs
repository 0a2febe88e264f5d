//! dirsearch - Active Directory user and group lookup
//!
//! Finds users or groups by partial or exact name and prints them as JSON or text.

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dirsearch_core::{DirsearchConfig, SearchMode, SearchRequest};
use dirsearch_ldap::DirectorySearcher;
use output::OutputFormat;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dirsearch")]
#[command(author = "Dirsearch Team")]
#[command(version = dirsearch_core::VERSION)]
#[command(about = "Look up Active Directory users and groups", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DIRSEARCH_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search users or groups
    Search(SearchArgs),

    /// List configured domains
    Domains,

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Name or login to look for
    term: String,

    /// Directory host (dc01.example.local, ldap://... or ldaps://...)
    #[arg(long, env = "DIRSEARCH_HOST")]
    host: String,

    /// Domain the search is scoped to
    #[arg(short, long, env = "DIRSEARCH_DOMAIN")]
    domain: String,

    /// Bind user (defaults to the configured one)
    #[arg(short = 'u', long)]
    bind_user: Option<String>,

    /// Bind password (defaults to the configured one)
    #[arg(short = 'p', long)]
    bind_password: Option<String>,

    /// Match the term exactly instead of as a prefix
    #[arg(long)]
    strict: bool,

    /// name-or-login, login, name or group (0-3 also accepted)
    #[arg(short, long, default_value = "name-or-login")]
    mode: SearchMode,

    /// Include thumbnail photos (base64)
    #[arg(long)]
    photo: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config, cli.log_level.as_deref());

    match cli.command {
        Commands::Search(args) => run_search(&config, args).await?,
        Commands::Domains => {
            let searcher = DirectorySearcher::from_config(&config);
            if searcher.domains().is_empty() {
                eprintln!("No domains configured");
            }
            for (name, base_dn) in searcher.domains().iter() {
                println!("{}\t{}", name, base_dn);
            }
        }
        Commands::Version => {
            println!("dirsearch {}", dirsearch_core::VERSION);
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> anyhow::Result<DirsearchConfig> {
    let Some(path) = path else {
        return Ok(DirsearchConfig::from_env()?);
    };

    let mut config = DirsearchConfig::from_file(path)?;
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &DirsearchConfig, level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(config.logging.level.as_str())));

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries results only
    if config.logging.is_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

async fn run_search(config: &DirsearchConfig, args: SearchArgs) -> anyhow::Result<()> {
    let bind_user = args
        .bind_user
        .or_else(|| config.ldap.bind_user.clone())
        .context("Bind user not configured. Use --bind-user or DIRSEARCH_BIND_USER")?;
    let bind_password = args
        .bind_password
        .or_else(|| config.ldap.bind_password.clone())
        .context("Bind password not configured. Use --bind-password or DIRSEARCH_BIND_PASSWORD")?;

    let request = SearchRequest::new(args.host, args.domain, args.term, args.mode)
        .with_credentials(bind_user, bind_password)
        .with_strict_match(args.strict)
        .with_photo(args.photo);

    debug!("Running {:?}", request);

    let searcher = DirectorySearcher::from_config(config);
    let records = searcher.search(&request).await?;

    println!("{}", output::render(&records, args.format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_args() {
        let cli = Cli::try_parse_from([
            "dirsearch",
            "search",
            "Admins",
            "--host",
            "dc01.example.local",
            "--domain",
            "EXAMPLE",
            "--mode",
            "group",
            "--strict",
            "--format",
            "text",
        ])
        .unwrap();

        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.term, "Admins");
                assert_eq!(args.mode, SearchMode::GroupByName);
                assert!(args.strict);
                assert!(!args.photo);
                assert_eq!(args.format, OutputFormat::Text);
            }
            _ => panic!("expected search command"),
        }
    }

    fn legacy_args(mode: &str) -> Vec<&str> {
        vec![
            "dirsearch",
            "search",
            "jdoe",
            "--host",
            "dc01",
            "--domain",
            "example",
            "--mode",
            mode,
        ]
    }

    #[test]
    fn test_legacy_mode_codes() {
        let cli = Cli::try_parse_from(legacy_args("1")).unwrap();

        match cli.command {
            Commands::Search(args) => assert_eq!(args.mode, SearchMode::UserByLogin),
            _ => panic!("expected search command"),
        }

        assert!(Cli::try_parse_from(legacy_args("7")).is_err());
    }
}
