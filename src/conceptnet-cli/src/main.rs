use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use conceptnet_core::resolver::{self, ResolvedRequest};
use conceptnet_core::{
    ApiProfile, AssociationOptions, ClientConfig, ConfigOverrides, FilterPolicy, LookupOptions,
    SearchParams, UriOptions,
};
use conceptnet_rs::{Client, HttpTransport};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

mod telemetry;

#[derive(Parser)]
#[command(name = "conceptnet", version, about = "Query the ConceptNet REST API")]
struct Cli {
    /// JSON config file with host, port, api_version, profile, filter_policy
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    host: Option<String>,

    #[arg(long, global = true)]
    port: Option<u16>,

    #[arg(long, global = true)]
    api_version: Option<String>,

    #[arg(long, global = true, value_enum)]
    profile: Option<Profile>,

    /// Forward association filters without checking them
    #[arg(long, global = true)]
    lenient_filter: bool,

    /// Accept invalid TLS certificates
    #[arg(long, global = true)]
    insecure: bool,

    /// Print the request URL instead of sending it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Also write JSON logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Legacy,
    Current,
}

impl From<Profile> for ApiProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Legacy => ApiProfile::Legacy,
            Profile::Current => ApiProfile::Current,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Look up the edges of a concept URI
    Lookup {
        uri: String,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        offset: Option<u64>,
        /// Only return edges from core sources
        #[arg(long)]
        core: bool,
    },
    /// Find the concept URI for a piece of text
    Uri {
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(long, short)]
        language: Option<String>,
    },
    /// Search edges; each parameter is key=value, keys may repeat
    Search {
        #[arg(value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Concepts associated with a concept URI or /list/ path
    Assoc {
        input: String,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Relatedness query for a concept URI or /list/ path
    Relatedness {
        input: String,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        limit: Option<u64>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", s))
}

/// Repeated keys collapse into an array, which serializes as repeated
/// query parameters again.
fn search_params(pairs: Vec<(String, String)>) -> SearchParams {
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    SearchParams::from(map)
}

fn load_config(cli: &Cli) -> ClientConfig {
    let file = match &cli.config {
        Some(path) => ConfigOverrides::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load {}: {:#}, using defaults", path, e);
            ConfigOverrides::default()
        }),
        None => ConfigOverrides::default(),
    };

    let flags = ConfigOverrides {
        host: cli.host.clone(),
        port: cli.port,
        api_version: cli.api_version.clone(),
        profile: cli.profile.map(Into::into),
        filter_policy: cli.lenient_filter.then_some(FilterPolicy::Lenient),
        ..Default::default()
    };

    file.merge(flags).build()
}

fn build_request(command: Command, config: &ClientConfig) -> Result<ResolvedRequest> {
    let request = match command {
        Command::Lookup {
            uri,
            limit,
            offset,
            core,
        } => {
            let options = LookupOptions {
                limit,
                offset,
                filter: core.then(|| "core".to_string()),
            };
            resolver::lookup(&uri, &options)
        }
        Command::Uri { text, language } => {
            resolver::resolve_uri(&text.join(" "), &UriOptions { language })
        }
        Command::Search { params } => resolver::search(search_params(params)),
        Command::Assoc {
            input,
            filter,
            limit,
        } => resolver::associate(
            &input,
            &AssociationOptions { limit, filter },
            config.filter_policy(),
        )?,
        Command::Relatedness {
            input,
            filter,
            limit,
        } => resolver::relatedness(
            &input,
            &AssociationOptions { limit, filter },
            config.filter_policy(),
        )?,
    };
    Ok(request)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let guard = telemetry::init_telemetry(cli.log_dir.as_deref())?;

    let config = load_config(&cli);
    tracing::info!(
        "Using {}://{}:{} (profile={:?}, api_version={}, filter_policy={:?})",
        config.scheme(),
        config.host(),
        config.port(),
        config.profile(),
        config.api_version(),
        config.filter_policy()
    );

    let transport = HttpTransport::new(cli.insecure).context("Failed to build HTTP client")?;
    let client = Client::with_transport(config, Arc::new(transport));

    let request = build_request(cli.command, client.config())?;

    if cli.dry_run {
        println!("{}", client.prepare(&request));
        return Ok(());
    }

    let document = client.send(&request).await.context("Request failed")?;
    println!("{}", serde_json::to_string_pretty(&document)?);

    // Guard dropped here, flushing remaining file logs
    drop(guard);

    Ok(())
}
