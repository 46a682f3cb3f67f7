use std::net::{IpAddr, Ipv4Addr};

use crate::game::constants::{blob, world};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the WebSocket listener to
    pub bind_address: IpAddr,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.port = parsed;
                } else {
                    tracing::warn!("PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PORT '{}', using default", port);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        Ok(())
    }
}

/// World tuning parameters
///
/// These are the knobs of the simulation itself; structural invariants
/// (radius floor, split counts, friction) live in `game::constants`.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Arena width/height with no players connected
    pub base_size: f32,
    /// Extra width/height per connected player
    pub growth_per_player: f32,
    /// Fraction of a victim's radius transferred on absorption (and shed on a bounce)
    pub absorption: f32,
    /// Fraction of a consumed player's radius paid out as a reward
    pub award_fraction: f32,
    /// Probability that a newly spawned autonomous blob is hostile
    pub hostile_chance: f64,
    /// Autonomous blobs above this radius are force-split
    pub split_threshold: f32,
    /// Spawn protection window for new players, in milliseconds
    pub protection_ms: u64,
    /// Account the reward pool pays out from
    pub pool_account: i64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            base_size: world::BASE_SIZE,
            growth_per_player: world::GROWTH_PER_PLAYER,
            absorption: 0.1,
            award_fraction: 0.1,
            hostile_chance: 0.3,
            split_threshold: 50.0,
            protection_ms: 5000,
            pool_account: 1,
        }
    }
}

impl WorldConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("ABSORPTION_RATE") {
            if let Ok(parsed) = raw.parse::<f32>() {
                if parsed > 0.0 && parsed < 1.0 {
                    config.absorption = parsed;
                } else {
                    tracing::warn!("ABSORPTION_RATE must be in (0, 1), using default");
                }
            } else {
                tracing::warn!("Invalid ABSORPTION_RATE '{}', using default", raw);
            }
        }

        if let Ok(raw) = std::env::var("AWARD_FRACTION") {
            if let Ok(parsed) = raw.parse::<f32>() {
                if parsed >= 0.0 && parsed < 1.0 {
                    config.award_fraction = parsed;
                } else {
                    tracing::warn!("AWARD_FRACTION must be in [0, 1), using default");
                }
            } else {
                tracing::warn!("Invalid AWARD_FRACTION '{}', using default", raw);
            }
        }

        if let Ok(raw) = std::env::var("HOSTILE_CHANCE") {
            if let Ok(parsed) = raw.parse::<f64>() {
                if (0.0..=1.0).contains(&parsed) {
                    config.hostile_chance = parsed;
                } else {
                    tracing::warn!("HOSTILE_CHANCE must be in [0, 1], using default");
                }
            } else {
                tracing::warn!("Invalid HOSTILE_CHANCE '{}', using default", raw);
            }
        }

        if let Ok(raw) = std::env::var("SPLIT_THRESHOLD") {
            if let Ok(parsed) = raw.parse::<f32>() {
                if parsed > blob::MIN_RADIUS {
                    config.split_threshold = parsed;
                } else {
                    tracing::warn!("SPLIT_THRESHOLD must exceed the radius floor, using default");
                }
            } else {
                tracing::warn!("Invalid SPLIT_THRESHOLD '{}', using default", raw);
            }
        }

        if let Ok(raw) = std::env::var("PROTECTION_MS") {
            if let Ok(parsed) = raw.parse::<u64>() {
                config.protection_ms = parsed;
            } else {
                tracing::warn!("Invalid PROTECTION_MS '{}', using default", raw);
            }
        }

        if let Ok(raw) = std::env::var("POOL_ACCOUNT") {
            if let Ok(parsed) = raw.parse::<i64>() {
                config.pool_account = parsed;
            } else {
                tracing::warn!("Invalid POOL_ACCOUNT '{}', using default", raw);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.base_size <= 0.0 {
            return Err("base_size must be positive".to_string());
        }
        if self.growth_per_player < 0.0 {
            return Err("growth_per_player cannot be negative".to_string());
        }
        if !(self.absorption > 0.0 && self.absorption < 1.0) {
            return Err("absorption must be in (0, 1)".to_string());
        }
        if !(0.0..=1.0).contains(&self.hostile_chance) {
            return Err("hostile_chance must be in [0, 1]".to_string());
        }
        if self.split_threshold <= blob::MIN_RADIUS {
            return Err("split_threshold must exceed the radius floor".to_string());
        }
        Ok(())
    }
}
