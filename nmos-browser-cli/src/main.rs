//! NMOS registry browser.
//!
//! Lists and inspects registry resources through the Query API, follows
//! senders and receivers through to their device's Connection API, and
//! stages new transport parameters.
//!
//! Usage:
//!   nmos-browser --origin http://registry.local list senders --filter label=cam
//!   nmos-browser --prefs prefs.db show receivers <id>
//!   nmos-browser --prefs prefs.db stage receivers <id> --file staged.json
//!
//! Every command prints pretty JSON on stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nmos_browser_adapter::{DataProvider, DataResponse, HttpTransport, TransportConfig};
use nmos_browser_prefs::{
    ApiUrlChange, MemoryPreferenceStore, PreferenceStore, Preferences, SqlitePreferenceStore,
};
use nmos_browser_types::{
    ApiFamily, DataRequest, Endpoint, Filter, LinkRelation, Operation, ResourceFamily,
};
use serde_json::{json, Value};
use tracing::{debug, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "nmos-browser")]
#[command(about = "Browse an NMOS registry and stage Connection API changes")]
struct Args {
    /// Scheme and authority the default API paths hang off
    #[arg(short, long, default_value = "http://localhost")]
    origin: String,

    /// SQLite file holding preferences (in-memory when omitted)
    #[arg(short, long)]
    prefs: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a resource collection
    List {
        resource: ResourceFamily,
        /// Filter as field=value; repeatable, comma-separated values are OR'd terms in RQL mode
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Number of pages to fetch, following `next` links
        #[arg(long, default_value = "1")]
        pages: usize,
    },
    /// Show one resource, resolved through its Connection API if it has one
    Show {
        resource: ResourceFamily,
        id: String,
        /// Print the `$`-prefixed flattened view
        #[arg(long)]
        flat: bool,
    },
    /// Fetch several resources by id
    Many {
        resource: ResourceFamily,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List resources whose field references a value
    Refs {
        resource: ResourceFamily,
        #[arg(long)]
        target: String,
        #[arg(long)]
        value: String,
    },
    /// Stage a new document on a sender or receiver
    Stage {
        resource: ResourceFamily,
        id: String,
        /// JSON file holding the desired staged document
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Read or change preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    /// Print the preferences in effect
    Show,
    /// Override an API base URL
    SetUrl { api: ApiFamily, url: String },
    /// Restore an API base URL to its default
    ResetUrl { api: ApiFamily },
    /// Send filters as RQL (true) or plain key=value pairs (false)
    Rql {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Set the page size for paged listings
    Paging {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected field=value, got {raw:?}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_ascii_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let store: Arc<dyn PreferenceStore> = match &args.prefs {
        Some(path) => {
            info!("Using preference store at {}", path.display());
            Arc::new(
                SqlitePreferenceStore::open(path)
                    .with_context(|| format!("opening preferences at {}", path.display()))?,
            )
        }
        None => Arc::new(MemoryPreferenceStore::new()),
    };
    let preferences = Preferences::new(store);

    let transport = HttpTransport::new(TransportConfig {
        timeout_secs: args.timeout,
        ..TransportConfig::default()
    })?;
    let provider = DataProvider::new(transport, preferences, args.origin);

    let output = match args.command {
        Command::List {
            resource,
            filters,
            pages,
        } => list(&provider, resource, filters.into_iter().collect(), pages).await?,
        Command::Show { resource, id, flat } => show(&provider, resource, &id, flat).await?,
        Command::Many { resource, ids } => {
            let response = provider.execute(&DataRequest::get_many(resource, ids)).await?;
            page_json(response)
        }
        Command::Refs {
            resource,
            target,
            value,
        } => {
            let request = DataRequest::get_many_reference(resource, target, value);
            page_json(provider.execute(&request).await?)
        }
        Command::Stage { resource, id, file } => stage(&provider, resource, &id, &file).await?,
        Command::Prefs { action } => prefs(&provider, action)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn list(
    provider: &DataProvider,
    resource: ResourceFamily,
    filter: Filter,
    pages: usize,
) -> Result<Value> {
    let mut out = vec![page_json(
        provider
            .execute(&DataRequest::get_list(resource.clone(), filter))
            .await?,
    )];

    while out.len() < pages {
        if provider.links().await.next.is_none() {
            debug!("No next page after {}", out.len());
            break;
        }
        let request = DataRequest::navigate(resource.clone(), LinkRelation::Next);
        out.push(page_json(provider.execute(&request).await?));
    }

    Ok(json!({
        "pagination": provider.preferences().pagination()?.as_str(),
        "pages": out,
    }))
}

async fn show(provider: &DataProvider, resource: ResourceFamily, id: &str, flat: bool) -> Result<Value> {
    match provider.execute(&DataRequest::get_one(resource, id)).await? {
        DataResponse::One { url, record } => {
            let record = if flat {
                record.to_flat_json()
            } else {
                serde_json::to_value(&record)?
            };
            Ok(json!({ "url": url, "record": record }))
        }
        other => bail!("unexpected response to get-one: {other:?}"),
    }
}

async fn stage(
    provider: &DataProvider,
    resource: ResourceFamily,
    id: &str,
    file: &Path,
) -> Result<Value> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let staged: Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;

    let previous = match provider
        .execute(&DataRequest::get_one(resource.clone(), id))
        .await?
    {
        DataResponse::One { record, .. } => record,
        other => bail!("unexpected response to get-one: {other:?}"),
    };
    if !previous.is_resolved() {
        bail!("{resource} {id} has no Connection API to stage on");
    }

    let mut data = previous.clone();
    data.endpoints.insert(Endpoint::Staged, staged);

    let request = DataRequest::new(
        resource,
        Operation::Update {
            id: id.to_string(),
            data,
            previous,
        },
    );
    match provider.execute(&request).await? {
        DataResponse::Updated { data } => Ok(data),
        other => bail!("unexpected response to update: {other:?}"),
    }
}

fn prefs(provider: &DataProvider, action: PrefsAction) -> Result<Value> {
    let preferences = provider.preferences();
    let origin = provider.origin();
    match action {
        PrefsAction::Show => {}
        PrefsAction::SetUrl { api, url } => {
            preferences.change_api_url(api, ApiUrlChange::Set(url), origin)?;
        }
        PrefsAction::ResetUrl { api } => {
            preferences.change_api_url(api, ApiUrlChange::Reset, origin)?;
        }
        PrefsAction::Rql { enabled } => preferences.set_rql_mode(enabled)?,
        PrefsAction::Paging { limit } => preferences.set_paging_limit(limit)?,
    }

    let mut urls = serde_json::Map::new();
    for family in ApiFamily::ALL {
        let url = preferences.effective_api_url(family, origin)?;
        urls.insert(family.preference_name().to_string(), Value::String(url));
    }
    Ok(json!({
        "origin": origin,
        "urls": urls,
        "rql": preferences.rql_enabled()?,
        "paging_limit": preferences.paging_limit_label()?,
        "pagination": preferences.pagination()?.as_str(),
    }))
}

fn page_json(response: DataResponse) -> Value {
    match response {
        DataResponse::List { url, data, total } => json!({
            "url": url,
            "total": total,
            "data": data,
        }),
        DataResponse::One { url, record } => json!({ "url": url, "record": record.to_flat_json() }),
        DataResponse::Updated { data } => data,
        DataResponse::NoOp => Value::Null,
    }
}
