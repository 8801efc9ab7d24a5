//! Configuration System
//!
//! Loads model parameters from a TOML file so runs can be tuned without
//! recompiling. Every field has a default, so a file only needs the
//! values it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::error::SimError;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "fieldsim.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub spatial: SpatialConfig,
    pub village: VillageConfig,
    pub robots: RobotsConfig,
    pub barn: BarnConfig,
}

/// Run parameters shared by every model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Tick budget; the run terminates once it is reached
    pub max_ticks: u64,
    /// Interval between view snapshots written by the binary (0 = none)
    pub snapshot_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_ticks: 1000,
            snapshot_interval: 100,
        }
    }
}

/// Spatial index tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Bucket edge for continuous models
    pub cell_size: f64,
    /// Bucket edge for grid models, in cells
    pub grid_cell_size: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: 50.0,
            grid_cell_size: 8.0,
        }
    }
}

/// Werewolf contagion model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VillageConfig {
    pub width: f64,
    pub height: f64,
    pub villagers: usize,
    pub werewolves: usize,
    pub clerics: usize,
    pub hunters: usize,
    pub speed: f64,
    /// Chance per turn that a latent werewolf transforms
    pub transform_probability: f64,
    pub infection_radius: f64,
    pub cure_radius: f64,
    pub hunt_radius: f64,
}

impl Default for VillageConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            villagers: 15,
            werewolves: 5,
            clerics: 1,
            hunters: 2,
            speed: 10.0,
            transform_probability: 0.1,
            infection_radius: 40.0,
            cure_radius: 30.0,
            hunt_radius: 40.0,
        }
    }
}

/// Mine-clearing robots model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    pub width: f64,
    pub height: f64,
    pub robots: usize,
    pub obstacles: usize,
    pub slow_zones: usize,
    pub items: usize,
    pub speed: f64,
    /// Sight distance as a multiple of speed
    pub sight_factor: f64,
    /// Chance per turn of picking a fresh random heading
    pub heading_change_probability: f64,
    pub feature_radius_min: f64,
    pub feature_radius_span: f64,
    /// Heading re-samples before a blocked robot gives up for the turn
    pub max_heading_retries: u32,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            robots: 7,
            obstacles: 5,
            slow_zones: 5,
            items: 15,
            speed: 15.0,
            sight_factor: 2.0,
            heading_change_probability: 0.01,
            feature_radius_min: 10.0,
            feature_radius_span: 20.0,
            max_heading_retries: 64,
        }
    }
}

/// Dog and cow herding model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarnConfig {
    pub width: i32,
    pub height: i32,
    pub cows: usize,
    pub dogs_per_team: usize,
    /// Side of each square corral, in cells
    pub corral_size: i32,
    pub obstacles: usize,
    /// Side of the square window a cow senses
    pub cow_sense_range: i32,
    /// Side of the window in which other cows repel
    pub cow_near_range: i32,
    /// Side of the square window a dog senses
    pub dog_visibility: i32,
    /// Maximum angle (degrees) at which a dog walks straight at a cow
    pub same_direction_deg: f64,
    /// Maximum angle (degrees) at which a dog flanks a cow
    pub change_direction_deg: f64,
}

impl Default for BarnConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            cows: 30,
            dogs_per_team: 5,
            corral_size: 5,
            obstacles: 5,
            cow_sense_range: 9,
            cow_near_range: 3,
            dog_visibility: 17,
            same_direction_deg: 20.0,
            change_direction_deg: 50.0,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every section, not just the one a model uses
    pub fn validate(&self) -> Result<(), SimError> {
        self.simulation.validate()?;
        positive("spatial.cell_size", self.spatial.cell_size)?;
        positive("spatial.grid_cell_size", self.spatial.grid_cell_size)?;
        self.village.validate()?;
        self.robots.validate()?;
        self.barn.validate()
    }
}

fn positive(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::config(format!("{} must be positive, got {}", name, value)))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::config(format!("{} must not be negative, got {}", name, value)))
    }
}

fn probability(name: &str, value: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::config(format!("{} must lie in [0, 1], got {}", name, value)))
    }
}

fn odd_window(name: &str, value: i32) -> Result<(), SimError> {
    if value > 0 && value % 2 == 1 {
        Ok(())
    } else {
        Err(SimError::config(format!("{} must be a positive odd number, got {}", name, value)))
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.max_ticks == 0 {
            return Err(SimError::config("max_ticks must be at least 1"));
        }
        Ok(())
    }
}

impl VillageConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        positive("village.width", self.width)?;
        positive("village.height", self.height)?;
        non_negative("village.speed", self.speed)?;
        probability("village.transform_probability", self.transform_probability)?;
        non_negative("village.infection_radius", self.infection_radius)?;
        non_negative("village.cure_radius", self.cure_radius)?;
        non_negative("village.hunt_radius", self.hunt_radius)?;
        Ok(())
    }
}

impl RobotsConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        positive("robots.width", self.width)?;
        positive("robots.height", self.height)?;
        positive("robots.speed", self.speed)?;
        non_negative("robots.sight_factor", self.sight_factor)?;
        probability("robots.heading_change_probability", self.heading_change_probability)?;
        non_negative("robots.feature_radius_min", self.feature_radius_min)?;
        non_negative("robots.feature_radius_span", self.feature_radius_span)?;
        Ok(())
    }
}

impl BarnConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(SimError::config(format!(
                "barn dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        odd_window("barn.corral_size", self.corral_size)?;
        odd_window("barn.cow_sense_range", self.cow_sense_range)?;
        odd_window("barn.cow_near_range", self.cow_near_range)?;
        odd_window("barn.dog_visibility", self.dog_visibility)?;
        if self.cow_near_range > self.cow_sense_range {
            return Err(SimError::config("barn.cow_near_range exceeds barn.cow_sense_range"));
        }
        if self.corral_size > self.width || self.corral_size > self.height / 2 {
            return Err(SimError::config(format!(
                "corral of size {} does not fit a {}x{} barn",
                self.corral_size, self.width, self.height
            )));
        }
        non_negative("barn.same_direction_deg", self.same_direction_deg)?;
        non_negative("barn.change_direction_deg", self.change_direction_deg)?;

        let overflow = || SimError::config("barn occupant counts overflow");
        let cells = (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or_else(overflow)?;
        let corrals = 2 * (self.corral_size as usize).pow(2);
        let occupants = self
            .dogs_per_team
            .checked_mul(2)
            .and_then(|dogs| dogs.checked_add(self.cows))
            .and_then(|n| n.checked_add(self.obstacles))
            .ok_or_else(overflow)?;
        if occupants.checked_add(corrals).ok_or_else(overflow)? > cells {
            return Err(SimError::config(format!(
                "{} occupants do not fit the {} free cells of the barn",
                occupants,
                cells.saturating_sub(corrals)
            )));
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] SimError),
}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(inner) => inner,
            other => SimError::Configuration(other.to_string()),
        }
    }
}
