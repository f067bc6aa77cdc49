//! Service configuration loaded via OrthoConfig.
//!
//! Accessors apply defaults and parse the textual values into domain types.
//! Environment variables use the `NEARBY_` prefix, for example
//! `NEARBY_CACHE_TTL_SECONDS=120` or `NEARBY_RADII=0.02,0.05,0.1`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{
    BucketConvention, RadiusSchedule, RadiusScheduleError, ResolverMode, ScoringTier,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_QUERY_TIMEOUT_SECONDS: u32 = 25;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_TOP_N: usize = 4;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;
const DEFAULT_COORDINATE_PRECISION: u32 = 4;
const MAX_COORDINATE_PRECISION: u32 = 7;

/// A configured value could not be interpreted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{0}'")]
    BindAddr(String),
    /// `overpass_endpoint` is not an absolute URL.
    #[error("invalid Overpass endpoint '{value}': {message}")]
    Endpoint {
        /// Configured text.
        value: String,
        /// Parser message.
        message: String,
    },
    /// `radii` is malformed.
    #[error(transparent)]
    Radii(#[from] RadiusScheduleError),
    /// `top_n` is zero.
    #[error("top_n must be at least 1")]
    TopN,
    /// `coordinate_precision` is outside `0..=7`.
    #[error("coordinate precision {0} is outside 0..={MAX_COORDINATE_PRECISION}")]
    Precision(u32),
    /// An enumerated option has an unknown value.
    #[error("{0}")]
    Choice(String),
    /// `utc_offset_minutes` is beyond a day.
    #[error("UTC offset of {0} minutes is out of range")]
    UtcOffset(i32),
}

/// Configuration values for the search service and its HTTP surface.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NEARBY")]
pub struct NearbySettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Overpass interpreter URL.
    pub overpass_endpoint: Option<String>,
    /// User-agent sent to Overpass.
    pub overpass_user_agent: Option<String>,
    /// Contact header sent to Overpass.
    pub overpass_contact: Option<String>,
    /// `[timeout:N]` directive embedded in each query.
    pub query_timeout_seconds: Option<u32>,
    /// Budget for one provider round-trip.
    pub http_timeout_seconds: Option<u64>,
    /// Radii in degrees, smallest first.
    pub radii: Option<Vec<f64>>,
    /// Maximum places returned.
    pub top_n: Option<usize>,
    /// Lifetime of cached results; zero disables caching.
    #[ortho_config(default = 300)]
    pub cache_ttl_seconds: u64,
    /// Interval between expired-entry sweeps.
    pub sweep_interval_seconds: Option<u64>,
    /// Decimal places kept from query coordinates.
    pub coordinate_precision: Option<u32>,
    /// `dictionary` or `raw`.
    pub category_mode: Option<String>,
    /// JSON catalogue replacing the built-in categories.
    pub catalogue_path: Option<PathBuf>,
    /// `baseline` or `enriched`.
    pub scoring_tier: Option<String>,
    /// `midnight` or `dawn`.
    pub bucket_convention: Option<String>,
    /// Fixed offset used for "now"; host local time when unset.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for NearbySettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            overpass_endpoint: None,
            overpass_user_agent: None,
            overpass_contact: None,
            query_timeout_seconds: None,
            http_timeout_seconds: None,
            radii: None,
            top_n: None,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            sweep_interval_seconds: None,
            coordinate_precision: None,
            category_mode: None,
            catalogue_path: None,
            scoring_tier: None,
            bucket_convention: None,
            utc_offset_minutes: None,
        }
    }
}

impl NearbySettings {
    /// Socket address to bind.
    ///
    /// # Errors
    /// [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::BindAddr(raw.to_owned()))
    }

    /// Overpass interpreter URL.
    ///
    /// # Errors
    /// [`SettingsError::Endpoint`] when the value is not a URL.
    pub fn overpass_endpoint(&self) -> Result<Url, SettingsError> {
        let raw = self
            .overpass_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_OVERPASS_ENDPOINT);
        Url::parse(raw).map_err(|err| SettingsError::Endpoint {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Query timeout directive, at least one second.
    #[must_use]
    pub fn query_timeout_seconds(&self) -> u32 {
        self.query_timeout_seconds
            .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECONDS)
            .max(1)
    }

    /// Provider round-trip budget.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(
            self.http_timeout_seconds
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS)
                .max(1),
        )
    }

    /// Radius schedule.
    ///
    /// # Errors
    /// [`SettingsError::Radii`] when the list is empty or not strictly
    /// increasing.
    pub fn radii(&self) -> Result<RadiusSchedule, SettingsError> {
        match &self.radii {
            Some(radii) => Ok(RadiusSchedule::new(radii.clone())?),
            None => Ok(RadiusSchedule::default()),
        }
    }

    /// Result limit.
    ///
    /// # Errors
    /// [`SettingsError::TopN`] when zero.
    pub fn top_n(&self) -> Result<usize, SettingsError> {
        match self.top_n.unwrap_or(DEFAULT_TOP_N) {
            0 => Err(SettingsError::TopN),
            n => Ok(n),
        }
    }

    /// Lifetime of cached results.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Interval between cache sweeps, at least one second.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(
            self.sweep_interval_seconds
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECONDS)
                .max(1),
        )
    }

    /// Coordinate rounding precision.
    ///
    /// # Errors
    /// [`SettingsError::Precision`] above seven decimal places.
    pub fn coordinate_precision(&self) -> Result<u32, SettingsError> {
        let precision = self
            .coordinate_precision
            .unwrap_or(DEFAULT_COORDINATE_PRECISION);
        if precision > MAX_COORDINATE_PRECISION {
            return Err(SettingsError::Precision(precision));
        }
        Ok(precision)
    }

    /// Category resolution mode.
    ///
    /// # Errors
    /// [`SettingsError::Choice`] for values other than `dictionary`/`raw`.
    pub fn category_mode(&self) -> Result<ResolverMode, SettingsError> {
        parse_choice(self.category_mode.as_deref())
    }

    /// Scoring strategy.
    ///
    /// # Errors
    /// [`SettingsError::Choice`] for values other than `baseline`/`enriched`.
    pub fn scoring_tier(&self) -> Result<ScoringTier, SettingsError> {
        parse_choice(self.scoring_tier.as_deref())
    }

    /// Time-bucket hour convention.
    ///
    /// # Errors
    /// [`SettingsError::Choice`] for values other than `midnight`/`dawn`.
    pub fn bucket_convention(&self) -> Result<BucketConvention, SettingsError> {
        parse_choice(self.bucket_convention.as_deref())
    }

    /// Fixed UTC offset, if configured.
    ///
    /// # Errors
    /// [`SettingsError::UtcOffset`] when the offset exceeds a day.
    pub fn utc_offset(&self) -> Result<Option<FixedOffset>, SettingsError> {
        self.utc_offset_minutes
            .map(|minutes| {
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or(SettingsError::UtcOffset(minutes))
            })
            .transpose()
    }
}

fn parse_choice<T>(raw: Option<&str>) -> Result<T, SettingsError>
where
    T: Default + std::str::FromStr<Err = String>,
{
    raw.map_or_else(
        || Ok(T::default()),
        |value| value.parse().map_err(SettingsError::Choice),
    )
}
