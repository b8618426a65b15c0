//! Configuration module
//!
//! Every setting comes from a `VIGIL_*` environment variable and falls back
//! to the library default when the variable is unset or blank.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use vigil_connectors::{default_source, ConnectorError, LinkSettings, TransportConfig};
use vigil_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_CALIBRATION_SAMPLES, DEFAULT_ERROR_BACKOFF_MS,
    DEFAULT_HEADER_PREFIXES, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SETTLE_DELAY_MS,
    DEFAULT_WINDOW_CAPACITY,
};
use vigil_core::{IngestConfig, PipelineConfig};
use vigil_ml::{ForestConfig, DEFAULT_NUM_TREES, DEFAULT_SEED};

/// Default listen address
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Default directory for the dashboard
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Configuration errors reported at start-up
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set to something unusable
    #[error("{key}={value:?}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parse failure
        reason: String,
    },

    /// The line source is not usable
    #[error("VIGIL_SOURCE: {0}")]
    Source(#[from] ConnectorError),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Where sensor lines come from
    pub source: TransportConfig,

    /// Calibration and window sizing
    pub pipeline: PipelineConfig,

    /// Anomaly model parameters
    pub forest: ForestConfig,

    /// Ingestion loop tuning
    pub ingest: IngestConfig,

    /// Prefixes identifying header lines
    pub header_prefixes: Vec<String>,

    /// HTTP listen address
    pub bind: SocketAddr,

    /// Dashboard directory
    pub static_dir: PathBuf,

    /// CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let link = LinkSettings {
            baud_rate: parse(&var, "VIGIL_BAUD", DEFAULT_BAUD_RATE)?,
            read_timeout: Duration::from_millis(parse(
                &var,
                "VIGIL_READ_TIMEOUT_MS",
                DEFAULT_READ_TIMEOUT_MS,
            )?),
            settle_delay: Duration::from_millis(parse(
                &var,
                "VIGIL_SETTLE_MS",
                DEFAULT_SETTLE_DELAY_MS,
            )?),
        };
        let source = TransportConfig::from_source(
            &var("VIGIL_SOURCE").unwrap_or_else(default_source),
            &link,
        )?;

        let pipeline = PipelineConfig::default()
            .with_calibration_samples(parse(
                &var,
                "VIGIL_CALIBRATION_SAMPLES",
                non_zero(DEFAULT_CALIBRATION_SAMPLES),
            )?)
            .with_window_capacity(parse(
                &var,
                "VIGIL_WINDOW_CAPACITY",
                non_zero(DEFAULT_WINDOW_CAPACITY),
            )?);

        let forest = ForestConfig {
            num_trees: parse::<NonZeroUsize, _>(
                &var,
                "VIGIL_FOREST_TREES",
                non_zero(DEFAULT_NUM_TREES),
            )?
            .get(),
            seed: parse(&var, "VIGIL_FOREST_SEED", DEFAULT_SEED)?,
            ..ForestConfig::default()
        };

        let ingest = IngestConfig {
            error_backoff: Duration::from_millis(parse(
                &var,
                "VIGIL_ERROR_BACKOFF_MS",
                DEFAULT_ERROR_BACKOFF_MS,
            )?),
        };

        let header_prefixes = match var("VIGIL_HEADER_PREFIXES") {
            Some(list) => split_list(&list),
            None => DEFAULT_HEADER_PREFIXES.iter().map(|p| p.to_string()).collect(),
        };

        Ok(Self {
            source,
            pipeline,
            forest,
            ingest,
            header_prefixes,
            bind: parse(&var, "VIGIL_BIND", default_bind())?,
            static_dir: var("VIGIL_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            allowed_origins: var("VIGIL_ALLOWED_ORIGINS")
                .map(|list| split_list(&list))
                .unwrap_or_default(),
        })
    }
}

fn parse<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        }
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_zero(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.source.to_string(), "serial:/dev/ttyACM0@9600");
        assert_eq!(config.pipeline.calibration_samples.get(), 100);
        assert_eq!(config.pipeline.window_capacity.get(), 50);
        assert_eq!(config.forest.num_trees, 100);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.ingest.error_backoff, Duration::from_millis(100));
        assert_eq!(config.header_prefixes, vec!["humedad", "humidity"]);
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("VIGIL_SOURCE", "tcp:10.0.0.5:7000"),
            ("VIGIL_READ_TIMEOUT_MS", "250"),
            ("VIGIL_CALIBRATION_SAMPLES", "20"),
            ("VIGIL_WINDOW_CAPACITY", " 10 "),
            ("VIGIL_HEADER_PREFIXES", "hum, temp ,,"),
            ("VIGIL_BIND", "127.0.0.1:9000"),
            ("VIGIL_ALLOWED_ORIGINS", "http://localhost:8000, https://dash.example"),
        ])
        .unwrap();

        match &config.source {
            TransportConfig::Tcp(tcp) => {
                assert_eq!(tcp.address, "10.0.0.5:7000");
                assert_eq!(tcp.read_timeout, Duration::from_millis(250));
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(config.pipeline.calibration_samples.get(), 20);
        assert_eq!(config.pipeline.window_capacity.get(), 10);
        assert_eq!(config.header_prefixes, vec!["hum", "temp"]);
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:8000", "https://dash.example"]
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("VIGIL_BAUD", "  "), ("VIGIL_SOURCE", "")]).unwrap();
        assert_eq!(config.source.to_string(), "serial:/dev/ttyACM0@9600");
    }

    #[test]
    fn invalid_values_are_reported() {
        for (key, value) in [
            ("VIGIL_CALIBRATION_SAMPLES", "0"),
            ("VIGIL_WINDOW_CAPACITY", "many"),
            ("VIGIL_BAUD", "-9600"),
            ("VIGIL_BIND", "localhost"),
            ("VIGIL_FOREST_TREES", "0"),
        ] {
            match config_from(&[(key, value)]) {
                Err(ConfigError::Invalid { key: k, .. }) => assert_eq!(k, key),
                other => panic!("{}={} gave {:?}", key, value, other.map(|_| ())),
            }
        }

        assert!(matches!(
            config_from(&[("VIGIL_SOURCE", "tcp:nowhere")]),
            Err(ConfigError::Source(_))
        ));
        assert!(matches!(
            config_from(&[("VIGIL_READ_TIMEOUT_MS", "0")]),
            Err(ConfigError::Source(_))
        ));
    }
}
