//! Run one place search against the configured provider and print the
//! response envelope as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;

use clap::Parser;
use nearby::bootstrap::build_search_stack;
use nearby::domain::SearchRequest;
use nearby::settings::NearbySettings;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `search-places` command arguments.
///
/// Engine settings come from `NEARBY_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "search-places",
    about = "Find and rank places of a category around a point",
    version
)]
struct CliArgs {
    /// Category name, synonym, or raw `key=value` tag.
    #[arg(long, value_name = "category")]
    category: String,
    /// Latitude of the search center.
    #[arg(long, value_name = "degrees", allow_hyphen_values = true)]
    lat: String,
    /// Longitude of the search center.
    #[arg(long, value_name = "degrees", allow_hyphen_values = true)]
    lon: String,
    /// Time bucket: morning, afternoon, or evening.
    #[arg(long = "time", value_name = "bucket")]
    time_bucket: Option<String>,
    /// Mood preference echoed in the response.
    #[arg(long)]
    mood: Option<String>,
    /// Budget preference echoed in the response.
    #[arg(long)]
    budget: Option<String>,
}

impl From<CliArgs> for SearchRequest {
    fn from(args: CliArgs) -> Self {
        let preferences: BTreeMap<String, String> = [("mood", args.mood), ("budget", args.budget)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (name.to_owned(), value)))
            .collect();
        Self {
            category: Some(args.category),
            lat: Some(args.lat),
            lon: Some(args.lon),
            time_bucket: args.time_bucket,
            preferences,
        }
    }
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = NearbySettings::load_from_iter([OsString::from("search-places")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let stack = build_search_stack(&settings)
        .map_err(|error| io::Error::other(format!("build search service: {error}")))?;

    let outcome = stack
        .service
        .search(args.into())
        .await
        .map_err(|error| io::Error::other(format!("search failed: {error}")))?;
    let body = serde_json::to_string_pretty(&outcome)
        .map_err(|error| io::Error::other(format!("encode results: {error}")))?;
    println!("{body}");
    Ok(())
}
