//! Configuration management for the Neighborhood Market server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with NBM_ prefix

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use shared::zone::{ZoneDistances, ZonePair, DEFAULT_ZONE_DISTANCE_M};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    pub marketplace: MarketplaceConfig,

    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Without one the server keeps records in memory.
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Shared secret for HS256 bearer tokens
    pub secret: String,

    /// Expected `iss` claim, when set
    pub issuer: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketplaceConfig {
    /// Distance assumed between two different zones with no table entry
    pub default_zone_distance_m: f64,

    #[serde(default)]
    pub zone_distances: Vec<ZonePair>,
}

impl MarketplaceConfig {
    pub fn zone_table(&self) -> ZoneDistances {
        ZoneDistances::from_pairs(self.default_zone_distance_m, &self.zone_distances)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// Number of search terms in the dashboard ranking
    pub top_search_limit: usize,

    /// Days of orders covered by the hourly histogram
    pub histogram_window_days: i64,
}

/// Signing secret used when none is configured in development
pub const DEV_JWT_SECRET: &str = "development-secret-key";

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("NBM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::defaults(&environment)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("NBM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Config>()?.validated()
    }

    /// Code defaults. The JWT secret only has one in development.
    fn defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("marketplace.default_zone_distance_m", DEFAULT_ZONE_DISTANCE_M)?
            .set_default("analytics.top_search_limit", 10)?
            .set_default("analytics.histogram_window_days", 30)?;

        if environment == "development" {
            builder = builder.set_default("jwt.secret", DEV_JWT_SECRET)?;
        }
        Ok(builder)
    }

    /// Reject settings that are only safe in development
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.environment != "development"
            && (self.jwt.secret.trim().is_empty() || self.jwt.secret == DEV_JWT_SECRET)
        {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be set to a private value in {}",
                self.environment
            )));
        }
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            jwt: JwtConfig::default(),
            marketplace: MarketplaceConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_JWT_SECRET.to_string(),
            issuer: None,
        }
    }
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            default_zone_distance_m: DEFAULT_ZONE_DISTANCE_M,
            zone_distances: Vec::new(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_search_limit: 10,
            histogram_window_days: 30,
        }
    }
}
