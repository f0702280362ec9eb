use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripdesk::app::App;
use tripdesk::config::Config;
use tripdesk::parser::{parse_single_id, SerpFormat};

mod commands;

#[derive(Parser)]
#[command(
    name = "tripdesk",
    version,
    about = "JetEngine relations, search result harvesting and WordPress content from the command line",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured one
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accommodation -> review relations
    Relations {
        #[command(subcommand)]
        action: RelationAction,
    },

    /// Harvest the top search results for a keyword
    Scrape {
        /// Search keyword
        #[arg(required = true)]
        keyword: Vec<String>,

        /// Number of results to keep
        #[arg(short, long)]
        top: Option<usize>,

        /// Request the search engine directly instead of through the proxy
        #[arg(long, default_value = "false")]
        direct: bool,

        /// Print results without writing the CSV file
        #[arg(long, default_value = "false")]
        no_save: bool,

        /// Results markup (auto, modern, container, redirect)
        #[arg(long)]
        format: Option<SerpFormat>,

        /// Publish each result as a source item linked under this parent ID
        #[arg(long)]
        link_to: Option<String>,
    },

    /// List or create WordPress content items
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Interactive menu
    Shell,
}

#[derive(Subcommand)]
enum RelationAction {
    /// Show the children of one or more parents
    Children {
        /// Parent IDs (comma / space / dot separated)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Add children to a parent
    Add {
        /// Parent ID
        parent: String,

        /// Child IDs (comma / space / dot separated)
        #[arg(required = true)]
        children: Vec<String>,
    },

    /// Link an existing child to a parent
    Link {
        /// Child ID
        child: String,

        /// Parent ID
        parent: String,
    },

    /// Check the relation endpoint
    Ping,
}

#[derive(Subcommand)]
enum ContentAction {
    /// List one page of items
    List {
        /// Content type, e.g. `alojamientos`
        content_type: String,

        /// Query filter as key=value (repeatable)
        #[arg(short, long)]
        filter: Vec<String>,

        /// Page size
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Create an item
    Create {
        /// Content type, e.g. `resenas`
        content_type: String,

        /// Item title
        #[arg(long)]
        title: String,

        /// Item status
        #[arg(long, default_value = "draft")]
        status: String,

        /// Extra field as key=value (repeatable); JSON values are accepted
        #[arg(long)]
        field: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Initialize tracing/logging
    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&format, &config.logging.level, cli.verbose)?;

    tracing::debug!(config = ?cli.config, "tripdesk starting");

    let app = App::from_config(&config)?;

    match cli.command {
        Commands::Relations { action } => match action {
            RelationAction::Children { ids } => {
                commands::show_children(&app, &ids.join(" ")).await?;
            }
            RelationAction::Add { parent, children } => {
                commands::add_children(&app, &parent, &children.join(" ")).await?;
            }
            RelationAction::Link { child, parent } => {
                commands::link_to_parent(&app, &child, &parent).await?;
            }
            RelationAction::Ping => commands::ping(&app).await?,
        },

        Commands::Scrape {
            keyword,
            top,
            direct,
            no_save,
            format,
            link_to,
        } => {
            let link_to = match link_to {
                Some(raw) => match parse_single_id(&raw) {
                    Some(id) => Some(id),
                    None => {
                        println!("Invalid parent ID: {raw:?}");
                        return Ok(());
                    }
                },
                None => None,
            };

            let options = commands::ScrapeOptions {
                keyword: keyword.join(" "),
                top,
                direct,
                no_save,
                format,
                link_to,
            };
            tracing::info!(keyword = %options.keyword, "Starting scrape command");
            commands::scrape(&app, options).await?;
        }

        Commands::Content { action } => match action {
            ContentAction::List {
                content_type,
                filter,
                per_page,
            } => commands::list_content(&app, &content_type, &filter, per_page).await?,
            ContentAction::Create {
                content_type,
                title,
                status,
                field,
            } => commands::create_content(&app, &content_type, &title, &status, &field).await?,
        },

        Commands::Shell => commands::shell(&app).await?,
    }

    Ok(())
}

/// Setup tracing subscriber for logging
fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tripdesk=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("tripdesk={level},warn"))?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
