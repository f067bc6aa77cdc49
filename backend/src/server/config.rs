//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use nearby::settings::{NearbySettings, SettingsError};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) sweep_interval: Duration,
}

impl ServerConfig {
    /// Construct a server configuration from explicit values.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, sweep_interval: Duration) -> Self {
        Self {
            bind_addr,
            sweep_interval,
        }
    }

    /// Derive the server configuration from loaded settings.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the bind address does not parse.
    pub fn from_settings(settings: &NearbySettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.bind_addr()?, settings.sweep_interval()))
    }
}
