use std::time::Duration;

use crate::domain::order::{PickupArea, PICKUP_CITIES, PICKUP_POSTAL_PREFIXES};

// ============================================================================
// Storefront Configuration
// ============================================================================
//
// Defaults match the hosted storefront. Every field can be overridden from a
// `STOREFRONT_*` environment variable; see `from_env`.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    /// Upper bound on a single order-creation call
    pub submission_timeout: Duration,
    /// Latency of the simulated order service
    pub simulated_latency: Duration,
    /// Port for `/metrics` and `/health`; disabled when `None`
    pub metrics_port: Option<u16>,
    /// Cities served by in-person pickup
    pub pickup_cities: Vec<String>,
    /// Postal code prefixes served by in-person pickup
    pub pickup_postal_prefixes: Vec<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            submission_timeout: Duration::from_secs(10),
            simulated_latency: Duration::from_millis(800),
            metrics_port: None,
            pickup_cities: PICKUP_CITIES.iter().map(|c| c.to_string()).collect(),
            pickup_postal_prefixes: PICKUP_POSTAL_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl StorefrontConfig {
    /// Fast settings for tests and local demos
    pub fn local() -> Self {
        Self {
            submission_timeout: Duration::from_secs(2),
            simulated_latency: Duration::from_millis(50),
            ..Self::default()
        }
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("STOREFRONT_SUBMISSION_TIMEOUT_MS") {
            config.submission_timeout = parse_millis("STOREFRONT_SUBMISSION_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("STOREFRONT_SIMULATED_LATENCY_MS") {
            config.simulated_latency = parse_millis("STOREFRONT_SIMULATED_LATENCY_MS", &raw)?;
        }
        if let Some(raw) = lookup("STOREFRONT_METRICS_PORT") {
            let port = raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "STOREFRONT_METRICS_PORT",
                expected: "a port number",
                value: raw.clone(),
            })?;
            config.metrics_port = Some(port);
        }
        if let Some(raw) = lookup("STOREFRONT_PICKUP_CITIES") {
            config.pickup_cities = split_list(&raw);
        }
        if let Some(raw) = lookup("STOREFRONT_PICKUP_POSTAL_PREFIXES") {
            config.pickup_postal_prefixes = split_list(&raw);
        }

        Ok(config)
    }

    pub fn pickup_area(&self) -> PickupArea {
        PickupArea::new(self.pickup_cities.clone(), self.pickup_postal_prefixes.clone())
    }
}

fn parse_millis(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::Invalid {
            var,
            expected: "a number of milliseconds",
            value: raw.to_string(),
        })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
