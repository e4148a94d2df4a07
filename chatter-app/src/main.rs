use anyhow::Result;
use chatter_common::Platform;
use chatter_common::observability::{LogConfig, LogSink, init_logging};
use chatter_config::{ChatterConfig, ChatterConfigLoader, default_config_path};
use chatter_social::{ComposioClient, ComposioSearch, composio::DEFAULT_MAX_RESULTS};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod render;

/// Search Reddit and X through Composio.
#[derive(Debug, Parser)]
#[command(name = "chatter", version)]
struct Cli {
    /// YAML config file (defaults to the user config dir, if present).
    #[arg(long, env = "CHATTER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Print every result as JSON instead of a short summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search Reddit posts.
    Reddit(SearchArgs),
    /// Search recent tweets.
    Twitter(SearchArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[arg(default_value = "AI")]
    query: String,

    /// Maximum number of results to request.
    #[arg(long, short = 'n', default_value_t = DEFAULT_MAX_RESULTS)]
    limit: u32,
}

fn load_config(explicit: Option<&PathBuf>) -> Result<ChatterConfig> {
    let loader = ChatterConfigLoader::new();
    let loader = match (explicit, default_config_path()) {
        (Some(path), _) => loader.with_file(path),
        (None, Some(path)) => loader.with_optional_file(path),
        (None, None) => loader,
    };
    Ok(loader.load()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_ref())?;

    init_logging(LogConfig {
        sink: if cfg.logging.dir.is_some() {
            LogSink::Both
        } else {
            LogSink::Stderr
        },
        log_dir: cfg.logging.dir.clone(),
        format: cfg.logging.format,
        default_filter: cfg
            .logging
            .filter
            .clone()
            .unwrap_or_else(|| LogConfig::default().default_filter),
        ..LogConfig::default()
    })?;
    cfg.log_summary();

    let composio = &cfg.composio;
    let credentials = composio.credentials()?;
    let client = ComposioClient::new(&composio.base_url, composio.api_version)?
        .with_validation(composio.validation())
        .with_timeout(composio.timeout());
    let search = ComposioSearch::new(client, credentials);

    let (platform, args) = match &cli.command {
        Command::Reddit(args) => (Platform::Reddit, args),
        Command::Twitter(args) => (Platform::Twitter, args),
    };
    let connection_id = composio.connection_id(platform);
    tracing::debug!(%platform, query = %args.query, limit = args.limit, "cli.search");

    let output = match platform {
        Platform::Reddit => {
            let posts = search
                .search_reddit_topic(&args.query, args.limit, connection_id.as_deref())
                .await?;
            if cli.json {
                serde_json::to_string_pretty(&posts)?
            } else {
                render::posts(&posts)
            }
        }
        Platform::Twitter => {
            let tweets = search
                .search_twitter_topic(&args.query, args.limit, connection_id.as_deref())
                .await?;
            if cli.json {
                serde_json::to_string_pretty(&tweets)?
            } else {
                render::tweets(&tweets)
            }
        }
    };
    println!("{}", output.trim_end());
    Ok(())
}
