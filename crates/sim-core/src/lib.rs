//! Field Simulation Engine Library
//!
//! Agent-based simulations on a bounded plane or lattice: werewolves in a
//! village, mine-clearing robots, and dogs herding cows into corrals.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod behaviors;
pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod setup;
pub mod sim;
pub mod systems;

pub use components::*;

pub use config::{Config, ConfigError};
pub use error::{SimError, SimResult};
pub use sim::Simulation;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
