//! World Setup
//!
//! Builds the initial layout of each model and spawns its agents.

pub mod barn;
pub mod robots;
pub mod village;

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use std::collections::BTreeMap;

use crate::components::agent::{Agent, AgentId, IdAllocator, Position};
use crate::components::environment::Environment;
use crate::components::simulation::{ModelKind, Occupancy};
use crate::components::space::{Space, SpaceKind};
use crate::config::Config;
use crate::error::{SimError, SimResult};

/// Rejection-sampling budget when placing agents and features
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Everything a model starts with
#[derive(Debug, Clone)]
pub struct Layout {
    pub space: Space,
    pub environment: Environment,
    pub agents: Vec<(Position, Agent)>,
    /// Empty-cell weight for grid potential fields
    pub empty_weight: f64,
}

impl Layout {
    pub fn new(space: Space) -> Self {
        Self {
            space,
            environment: Environment::new(),
            agents: Vec::new(),
            empty_weight: 0.0,
        }
    }
}

/// Lay out the chosen model
pub fn build_layout(model: ModelKind, config: &Config, rng: &mut SmallRng) -> SimResult<Layout> {
    match model {
        ModelKind::Village => village::layout(&config.village, rng),
        ModelKind::Robots => robots::layout(&config.robots, rng),
        ModelKind::Barn => barn::layout(&config.barn, rng),
    }
}

/// Draw candidates until one is accepted
pub(crate) fn sample_until<T>(
    what: &str,
    mut draw: impl FnMut() -> T,
    mut accept: impl FnMut(&T) -> bool,
) -> SimResult<T> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let candidate = draw();
        if accept(&candidate) {
            return Ok(candidate);
        }
    }
    Err(SimError::config(format!(
        "could not place {} after {} attempts",
        what, MAX_PLACEMENT_ATTEMPTS
    )))
}

/// Spawn agents in layout order, assigning ids and claiming grid cells
pub fn spawn_agents(
    world: &mut World,
    ids: &mut IdAllocator,
    space: &Space,
    agents: Vec<(Position, Agent)>,
) -> SimResult<usize> {
    let mut occupancy = Occupancy::new();
    let count = agents.len();
    for (position, agent) in agents {
        let id = ids.allocate();
        if space.kind == SpaceKind::Grid && !occupancy.place(id, position.cell()) {
            return Err(SimError::config(format!(
                "two agents placed on cell {:?}",
                position.cell()
            )));
        }
        world.spawn((id, position, agent));
    }
    world.insert_resource(occupancy);
    Ok(count)
}

/// Summary of spawned agents
pub struct SpawnSummary {
    pub total_agents: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
}

/// Get a summary of spawned agents
pub fn get_spawn_summary(world: &mut World) -> SpawnSummary {
    let mut query = world.query::<(&AgentId, &Agent)>();
    let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total_agents = 0;

    for (_, agent) in query.iter(world) {
        total_agents += 1;
        *by_kind.entry(agent.kind().as_str()).or_default() += 1;
    }

    SpawnSummary {
        total_agents,
        by_kind,
    }
}
