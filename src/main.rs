use anyhow::{Context, Result};
use azure_discovery::adapters::{AdapterContext, AdapterMetadata};
use azure_discovery::azure::http::ArmHttpClient;
use azure_discovery::azure::{auth, defaults, format_arm_error, resource_groups, ArmClient, ArmError};
use azure_discovery::cache::MemoryCache;
use azure_discovery::config::Config;
use azure_discovery::engine::{AdapterRegistry, Engine};
use azure_discovery::scope::{Scope, WILDCARD_SCOPE};
use azure_discovery::sdp::{ItemType, Query, QueryError, QueryMethod};
use azure_discovery::VERSION;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Discover Azure resources and how they link together
#[derive(Parser, Debug)]
#[command(name = "azure-discovery", version = VERSION, about, long_about = None)]
struct Args {
    /// Azure subscription to use
    #[arg(short, long, global = true)]
    subscription: Option<String>,

    /// Resource group to discover (repeatable, default: every group)
    #[arg(short = 'g', long = "resource-group", global = true)]
    resource_groups: Vec<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    /// Seconds a result stays cached
    #[arg(long, global = true)]
    cache_ttl: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List item types, their query methods and potential links
    Types,
    /// Get one item by name (`parent|child` for child resources)
    Get {
        item_type: ItemType,
        query: String,
        /// `subscription.resourceGroup`, `subscription` or `*` for every scope
        #[arg(long, default_value = WILDCARD_SCOPE)]
        scope: String,
    },
    /// List every item of a type
    List {
        item_type: ItemType,
        #[arg(long, default_value = WILDCARD_SCOPE)]
        scope: String,
    },
    /// Find the children of a parent (`parent` or `grandparent|parent`)
    Search {
        item_type: ItemType,
        query: String,
        #[arg(long, default_value = WILDCARD_SCOPE)]
        scope: String,
    },
    /// Save --subscription, --resource-group and --cache-ttl as defaults
    Config,
}

impl Command {
    fn to_query(&self) -> Option<Query> {
        match self {
            Command::Types | Command::Config => None,
            Command::Get {
                item_type,
                query,
                scope,
            } => Some(Query::new(*item_type, QueryMethod::Get, query.as_str(), scope.as_str())),
            Command::List { item_type, scope } => {
                Some(Query::new(*item_type, QueryMethod::List, "", scope.as_str()))
            }
            Command::Search {
                item_type,
                query,
                scope,
            } => Some(Query::new(*item_type, QueryMethod::Search, query.as_str(), scope.as_str())),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    fn render<T: Serialize + ?Sized>(self, value: &T) -> Result<String> {
        Ok(match self {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        })
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("azure-discovery {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("azure-discovery").join("azure-discovery.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".azure-discovery").join("azure-discovery.log");
    }
    PathBuf::from("azure-discovery.log")
}

/// Short message for a query error; ARM failures use the friendly wording
fn describe_error(error: &QueryError) -> String {
    if let QueryError::Other(inner) = error {
        if let Some(arm) = inner.downcast_ref::<ArmError>() {
            return format!("{} ({})", format_arm_error(arm), inner);
        }
    }
    error.to_string()
}

/// Resource groups to discover (CLI > config > every group of the subscription)
async fn resolve_resource_groups(
    args: &Args,
    config: &Config,
    client: &ArmClient,
    subscription: &str,
) -> Result<Vec<String>> {
    if !args.resource_groups.is_empty() {
        return Ok(args.resource_groups.clone());
    }
    if !config.resource_groups.is_empty() {
        return Ok(config.resource_groups.clone());
    }

    let groups = resource_groups::list_resource_group_names(client, subscription)
        .await
        .map_err(|e| anyhow::anyhow!("{} ({})", format_arm_error(&e), e))
        .with_context(|| format!("Failed to list resource groups of {}", subscription))?;
    tracing::info!("Discovered {} resource group(s) in {}", groups.len(), subscription);
    Ok(groups)
}

/// Store the global flags in the config file and print the result
fn save_config(args: &Args, mut config: Config) -> Result<()> {
    config.update(
        args.subscription.as_deref(),
        &args.resource_groups,
        args.cache_ttl,
    );
    config.save().context("Failed to save config")?;
    if let Some(path) = Config::config_path() {
        eprintln!("Saved {}", path.display());
    }
    println!("{}", args.output.render(&config)?);
    Ok(())
}

async fn run(args: Args, config: Config) -> Result<()> {
    if matches!(args.command, Command::Config) {
        return save_config(&args, config);
    }

    let endpoint = config.effective_management_endpoint().to_string();
    let http = ArmHttpClient::new().context("Failed to create HTTP client")?;
    let source = auth::default_token_source(config.effective_authority_host(), &endpoint, http);
    let client = ArmClient::new(source, &endpoint).context("Failed to create ARM client")?;
    let cache_ttl = Duration::from_secs(args.cache_ttl.unwrap_or(config.cache_ttl_secs));

    let mut ctx = AdapterContext {
        client: client.clone(),
        cache: Arc::new(MemoryCache::new()),
        cache_ttl,
        scopes: Vec::new(),
    };

    let Some(query) = args.command.to_query() else {
        let metadata: Vec<AdapterMetadata> = AdapterRegistry::new(&ctx)
            .iter()
            .map(|adapter| adapter.metadata())
            .collect();
        println!("{}", args.output.render(&metadata)?);
        return Ok(());
    };

    let subscription = args
        .subscription
        .clone()
        .or_else(|| config.effective_subscription())
        .context(
            "No Azure subscription configured. Set AZURE_SUBSCRIPTION_ID, run 'az account set' or use --subscription",
        )?;
    if !defaults::validate_subscription_id(&subscription) {
        tracing::warn!("Subscription '{}' is not a GUID", subscription);
    }

    let groups = resolve_resource_groups(&args, &config, &client, &subscription).await?;
    ctx.scopes = std::iter::once(Scope::subscription(subscription.as_str()))
        .chain(groups.iter().map(|rg| Scope::resource_group(subscription.as_str(), rg.as_str())))
        .collect();
    tracing::info!("Using subscription: {}, {} resource group(s)", subscription, groups.len());

    let engine = Engine::new(AdapterRegistry::new(&ctx), config.max_parallel);
    let result = engine.execute(&query, false).await;

    for error in &result.errors {
        eprintln!("Error: {}", describe_error(error));
    }
    println!("{}", args.output.render(&result.items)?);

    if result.items.is_empty() && !result.errors.is_empty() {
        anyhow::bail!("{} failed", query);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let config = Config::load();

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
