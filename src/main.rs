use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use query_copilot::catalog::{example_catalogs, load_catalogs};
use query_copilot::governance::{example_governance, example_question, load_governance};
use query_copilot::render::render_response;
use query_copilot::{
    Config, Defaults, Dialect, GovernanceRules, LiveGenerator, MockGenerator, ModeFlags,
    QueryRequest, QueryService, SqlGenerator,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "query-copilot")]
#[command(about = "Natural Language to SQL Generator")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate SQL for a natural-language question
    Generate {
        /// The question to answer
        #[arg(short, long)]
        question: Option<String>,

        /// snowflake, postgres, mysql or databricks
        #[arg(short, long, default_value = "snowflake")]
        dialect: Dialect,

        /// JSON file holding an array of table catalogs
        #[arg(long)]
        catalogs: Option<PathBuf>,

        /// JSON file holding governance rules
        #[arg(long)]
        governance: Option<PathBuf>,

        /// Default row limit
        #[arg(long)]
        limit: Option<u64>,

        /// Default time range, e.g. "LAST 90 DAYS" (--example sets one)
        #[arg(long)]
        time_range: Option<String>,

        /// Ask the backend not to come back with clarifying questions
        #[arg(long)]
        no_clarify: bool,

        /// Ask the backend to plan the query without running it
        #[arg(long)]
        dry_run: bool,

        /// Start from the bundled sales example
        #[arg(long)]
        example: bool,

        /// Call the backend instead of templating locally
        #[arg(long)]
        live: bool,

        /// Backend base URL (overrides QUERY_COPILOT_API_URL)
        #[arg(long)]
        api_url: Option<String>,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check SQL with the backend
    Validate {
        #[arg(short, long)]
        sql: String,

        #[arg(short, long, default_value = "snowflake")]
        dialect: Dialect,

        #[arg(long)]
        api_url: Option<String>,
    },
    /// Print the example request as JSON
    Example,
}

fn service_for(config: &Config, api_url: Option<String>) -> QueryService {
    match api_url {
        Some(url) => QueryService::new(url).with_mock_delay(config.mock_delay),
        None => QueryService::from_config(config),
    }
}

/// Only the example carries a time range unless one is asked for.
fn request_defaults(example: bool, limit: Option<u64>, time_range: Option<String>) -> Defaults {
    let mut defaults = if example { Defaults::default() } else { Defaults::none() };
    if limit.is_some() {
        defaults.limit_default = limit;
    }
    if time_range.is_some() {
        defaults.time_range_default = time_range;
    }
    defaults
}

fn example_request(dialect: Dialect) -> Result<QueryRequest> {
    Ok(QueryRequest::builder(dialect, example_question())
        .catalogs(example_catalogs())
        .governance(example_governance())
        .defaults(Defaults::default())
        .mode(ModeFlags {
            no_clarify: Some(false),
            dry_run: None,
        })
        .build()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    match args.command {
        Command::Generate {
            question,
            dialect,
            catalogs,
            governance,
            limit,
            time_range,
            no_clarify,
            dry_run,
            example,
            live,
            api_url,
            json,
        } => {
            let question = match (question, example) {
                (Some(q), _) => q,
                (None, true) => example_question().to_string(),
                (None, false) => bail!("--question is required unless --example is given"),
            };

            let mut catalog_list = if example { example_catalogs() } else { Vec::new() };
            if let Some(path) = catalogs {
                catalog_list = load_catalogs(&path)?;
            }

            let mut rules = if example { example_governance() } else { GovernanceRules::default() };
            if let Some(path) = governance {
                rules = load_governance(&path)?;
            }

            let defaults = request_defaults(example, limit, time_range);

            let request = QueryRequest::builder(dialect, question)
                .catalogs(catalog_list)
                .governance(rules)
                .defaults(defaults)
                .mode(ModeFlags {
                    no_clarify: Some(no_clarify),
                    dry_run: dry_run.then_some(true),
                })
                .build()?;

            let service = service_for(&config, api_url);
            let generator: Box<dyn SqlGenerator> = if live {
                info!("Using backend at {}", service.api_base_url());
                Box::new(LiveGenerator::new(service))
            } else {
                Box::new(MockGenerator::new(service))
            };

            let response = match generator.generate(&request).await {
                Ok(response) => response,
                Err(_) => {
                    eprintln!("Failed to generate SQL. Please try again.");
                    std::process::exit(1);
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", render_response(&response));
            }
        }
        Command::Validate { sql, dialect, api_url } => {
            let service = service_for(&config, api_url);
            let outcome = service.validate_sql(&sql, dialect).await;
            if outcome.valid {
                println!("valid");
            } else {
                println!("invalid");
                for error in outcome.errors.unwrap_or_default() {
                    println!("- {}", error);
                }
            }
        }
        Command::Example => {
            let request = example_request(Dialect::default())?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
    }

    Ok(())
}
