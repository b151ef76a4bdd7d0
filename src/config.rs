// Engine configuration
// Layered: built-in defaults -> optional config file -> MOVIE_GRAPH__* environment

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Simulated backend latency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyConfig {
    /// Delay before every read resolver runs
    pub read_delay_ms: u64,
    /// Delay before a mutation result is delivered
    pub write_delay_ms: u64,
    /// Upper bound of the uniform random extra delay
    pub jitter_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            read_delay_ms: 2000,
            write_delay_ms: 100,
            jitter_ms: 0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Zero latency; what tests and scripted runs want
    pub fn instant() -> Self {
        Self {
            latency: LatencyConfig {
                read_delay_ms: 0,
                write_delay_ms: 0,
                jitter_ms: 0,
            },
            log: LogConfig::default(),
        }
    }

    /// Load from `movie_graph.{toml,yaml,json}` (optional) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with an explicit config file. The file is required when given.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&EngineConfig::default())?);

        builder = match path {
            Some(path) => builder.add_source(::config::File::from(path).required(true)),
            None => builder.add_source(::config::File::with_name("movie_graph").required(false)),
        };

        // MOVIE_GRAPH__LATENCY__READ_DELAY_MS=0
        builder = builder.add_source(
            ::config::Environment::with_prefix("MOVIE_GRAPH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}
