//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS (empty = any origin)
    pub client_origins: Vec<String>,
    /// Match simulation parameters
    pub game: GameSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Render provides PORT env var, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let client_origins = env::var("CLIENT_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            client_origins,
            game: GameSettings::from_env()?,
        })
    }
}

/// Tunable parameters of a match.
///
/// Lengths are in playfield units, the same coordinate space the browser
/// client draws in.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSettings {
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub node_radius: f32,
    /// Inclusive range the neutral node count is drawn from
    pub neutral_nodes: RangeInclusive<u32>,
    /// Inclusive range a neutral node's starting garrison is drawn from
    pub neutral_units: RangeInclusive<u32>,
    /// Period of the growth cadence (milliseconds)
    pub production_tick_ms: u64,
    /// Period of the stream movement cadence (milliseconds)
    pub movement_tick_ms: u64,
    /// Stream travel speed in playfield units per second
    pub movement_speed: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            playfield_width: 800.0,
            playfield_height: 600.0,
            node_radius: 40.0,
            neutral_nodes: 3..=7,
            neutral_units: 1..=15,
            production_tick_ms: 1000,
            movement_tick_ms: 10,
            movement_speed: 100.0,
        }
    }
}

impl GameSettings {
    /// Load game settings, falling back to defaults for unset variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Self {
            playfield_width: env_or("PLAYFIELD_WIDTH", defaults.playfield_width)?,
            playfield_height: env_or("PLAYFIELD_HEIGHT", defaults.playfield_height)?,
            node_radius: env_or("NODE_RADIUS", defaults.node_radius)?,
            neutral_nodes: env_or("NEUTRAL_NODES_MIN", *defaults.neutral_nodes.start())?
                ..=env_or("NEUTRAL_NODES_MAX", *defaults.neutral_nodes.end())?,
            neutral_units: env_or("NEUTRAL_UNITS_MIN", *defaults.neutral_units.start())?
                ..=env_or("NEUTRAL_UNITS_MAX", *defaults.neutral_units.end())?,
            production_tick_ms: env_or("PRODUCTION_TICK_MS", defaults.production_tick_ms)?,
            movement_tick_ms: env_or("MOVEMENT_TICK_MS", defaults.movement_tick_ms)?,
            movement_speed: env_or("MOVEMENT_SPEED", defaults.movement_speed)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check positivity and range ordering
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("PLAYFIELD_WIDTH", self.playfield_width),
            ("PLAYFIELD_HEIGHT", self.playfield_height),
            ("NODE_RADIUS", self.node_radius),
            ("MOVEMENT_SPEED", self.movement_speed),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(key, "must be a positive number"));
            }
        }

        if self.production_tick_ms == 0 {
            return Err(ConfigError::Invalid("PRODUCTION_TICK_MS", "must be positive"));
        }
        if self.movement_tick_ms == 0 {
            return Err(ConfigError::Invalid("MOVEMENT_TICK_MS", "must be positive"));
        }
        if *self.neutral_units.start() == 0 {
            return Err(ConfigError::Invalid("NEUTRAL_UNITS_MIN", "must be positive"));
        }
        if self.neutral_nodes.is_empty() {
            return Err(ConfigError::Invalid("NEUTRAL_NODES_MAX", "must not be below minimum"));
        }
        if self.neutral_units.is_empty() {
            return Err(ConfigError::Invalid("NEUTRAL_UNITS_MAX", "must not be below minimum"));
        }

        let diameter = self.node_diameter();
        if self.playfield_width < diameter || self.playfield_height < diameter {
            return Err(ConfigError::Invalid(
                "NODE_RADIUS",
                "a node must fit inside the playfield",
            ));
        }

        Ok(())
    }

    pub fn node_diameter(&self) -> f32 {
        self.node_radius * 2.0
    }

    pub fn production_period(&self) -> Duration {
        Duration::from_millis(self.production_tick_ms)
    }

    pub fn movement_period(&self) -> Duration {
        Duration::from_millis(self.movement_tick_ms)
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Unparsable(key)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Could not parse environment variable: {0}")]
    Unparsable(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
