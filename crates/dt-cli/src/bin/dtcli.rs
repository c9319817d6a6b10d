//! `dtcli` — query monitoring API responses with key searches.
//!
//! Responses are served from the on-disk cache (`<cache-dir>/<tenant>/...`);
//! requests that miss the cache fail unless a transport is wired in.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dt_cli::api::{ApiClient, EntityType, OfflineTransport};
use dt_cli::cache::ResponseCache;
use dt_cli::commands;
use dt_cli::config::Config;
use dt_cli::projections_to_json;
use dt_cli::timeseries::TimeseriesSpec;
use dt_query::find_values_by_key;

#[derive(Parser, Debug)]
#[command(name = "dtcli")]
#[command(author, version, about = "Query entities, tags and timeseries of a monitoring tenant")]
struct Args {
    /// Configuration file
    #[arg(long, default_value = "dtconfig.json")]
    config: PathBuf,

    /// Directory holding cached API responses
    #[arg(long, default_value = ".")]
    cache_dir: PathBuf,

    /// Tenant host for this invocation only
    #[arg(long)]
    tenant: Option<String>,

    /// API token for this invocation only
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query entities: app | srv | pg | host
    Ent {
        entity_type: String,
        /// `value`, `key=value` or `tags/AWS:Name=value`
        query: Option<String>,
        /// Field, `field1,field2` or `*`
        return_key: Option<String>,
    },

    /// Query timeseries
    Ts {
        #[command(subcommand)]
        action: TsAction,
    },

    /// Metrics for the entities matching a query
    Dql {
        /// app | srv | pg | host | appmethod
        entity_type: String,
        entity_query: String,
        /// `metric[aggregation%timeframe],...`
        metrics: String,
    },

    /// Show or update configuration: `config tenanthost <host> apitoken <token> cacheupdate <secs>`
    Config { settings: Vec<String> },

    /// Run a key search on a local JSON document (`-` reads stdin)
    Search {
        file: PathBuf,
        key: String,
        match_value: Option<String>,
        #[arg(default_value = "*")]
        return_key: String,
    },
}

#[derive(Subcommand, Debug)]
enum TsAction {
    /// List timeseries definitions
    List { query: Option<String>, return_key: Option<String> },
    /// Show one timeseries definition
    Describe { timeseries_id: String },
    /// Query data points: `id[aggregation%timeframe] [entity1,entity2]`
    Query { spec: String, entities: Option<String> },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let stored = Config::load(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;

    if let Commands::Config { settings } = &args.command {
        if settings.is_empty() {
            println!("Current tenant: {}", stored.tenanthost);
            println!("Cache update: {}", stored.cacheupdate);
            return Ok(());
        }
        if settings.len() % 2 != 0 {
            bail!("expected <name> <value> pairs, got {} arguments", settings.len());
        }
        let mut config = stored;
        for pair in settings.chunks(2) {
            config.set(&pair[0], &pair[1])?;
        }
        config.save(&args.config)?;
        return Ok(());
    }

    let config = stored.with_overrides(args.tenant.as_deref(), args.token.as_deref());
    let cache = ResponseCache::new(&args.cache_dir, config.cache_policy());
    let client = ApiClient::new(config, cache, OfflineTransport);

    match args.command {
        Commands::Ent { entity_type, query, return_key } => {
            let entity_type: EntityType = entity_type.parse()?;
            let results = commands::entities(&client, entity_type, query.as_deref(), return_key.as_deref())?;
            print_json(&projections_to_json(&results))
        }
        Commands::Ts { action } => match action {
            TsAction::List { query, return_key } => {
                let results = commands::timeseries_list(&client, query.as_deref(), return_key.as_deref())?;
                print_json(&projections_to_json(&results))
            }
            TsAction::Describe { timeseries_id } => {
                print_json(&commands::timeseries_describe(&client, &timeseries_id)?)
            }
            TsAction::Query { spec, entities } => {
                let spec = TimeseriesSpec::parse(&spec);
                let entities: Option<Vec<String>> =
                    entities.map(|list| list.split(',').map(str::to_string).collect());
                let measures = commands::timeseries_query(&client, &spec, entities.as_deref())?;
                print_json(&Value::Object(measures))
            }
        },
        Commands::Dql { entity_type, entity_query, metrics } => {
            let results = commands::dql(&client, &entity_type, &entity_query, &metrics)?;
            print_json(&Value::Array(results))
        }
        Commands::Search { file, key, match_value, return_key } => {
            let text = if file.as_os_str() == "-" {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?
            };
            let doc: Value = serde_json::from_str(&text)?;
            let results = find_values_by_key(&doc, &key, match_value.as_deref(), &return_key)?;
            print_json(&projections_to_json(&results))
        }
        Commands::Config { .. } => Ok(()),
    }
}
