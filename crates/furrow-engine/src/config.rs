//! Runner configuration.
//!
//! Aggregates the settings of every simulation subsystem plus the run loop
//! parameters. Loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{info, warn};

use furrow_gameplay::{ActorConfig, DropConfig, InteractionConfig, SimulationConfig};
use furrow_world::{FarmingConfig, WorldConfig};

/// Configuration file name.
pub const CONFIG_FILE: &str = "furrow.toml";

/// Runner configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Run Loop ===
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// How long to run, in seconds
    pub run_secs: f32,
    /// Interval between status log lines, in seconds
    pub status_interval_secs: f32,

    // === Simulation ===
    /// World size and generation
    pub world: WorldConfig,
    /// Growth and soil timings
    pub farming: FarmingConfig,
    /// Tool use
    pub interaction: InteractionConfig,
    /// Item drops
    pub drops: DropConfig,
    /// Actor movement
    pub actor: ActorConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            run_secs: 60.0,
            status_interval_secs: 5.0,
            world: WorldConfig::default(),
            farming: FarmingConfig::default(),
            interaction: InteractionConfig::default(),
            drops: DropConfig::default(),
            actor: ActorConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from `furrow.toml` in the working directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(1, 1000);
        self.run_secs = self.run_secs.clamp(0.0, 86_400.0);
        self.status_interval_secs = self.status_interval_secs.clamp(0.5, 3600.0);

        self.world.validate();
        self.farming.validate();
        self.interaction.validate();
        self.drops.validate();
        self.actor.validate();
    }

    /// The subsystem settings handed to the simulation.
    #[must_use]
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            world: self.world.clone(),
            farming: self.farming.clone(),
            interaction: self.interaction.clone(),
            drops: self.drops.clone(),
            actor: self.actor.clone(),
        }
    }
}
