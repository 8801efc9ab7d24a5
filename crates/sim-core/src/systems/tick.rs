//! Tick Bookkeeping
//!
//! End-of-tick cleanup and the terminal check.

use bevy_ecs::prelude::*;

use crate::components::agent::{Agent, Position};
use crate::components::environment::Environment;
use crate::components::simulation::{ModelKind, Occupancy, SimulationState, Tombstones};
use crate::systems::snapshot::WorldSnapshot;

/// System to despawn agents removed this tick and compact the arenas
pub fn apply_removals(
    mut commands: Commands,
    mut tombstones: ResMut<Tombstones>,
    snapshot: Res<WorldSnapshot>,
    mut env: ResMut<Environment>,
    mut occupancy: ResMut<Occupancy>,
    positions: Query<&Position>,
) {
    for id in tombstones.drain() {
        let Some(entity) = snapshot.get(id).map(|entry| entry.entity) else {
            continue;
        };
        if let Ok(position) = positions.get(entity) {
            occupancy.release(id, position.cell());
        }
        commands.entity(entity).despawn();
    }
    env.compact();
}

/// Whether the model has run out of what it is working on
pub fn goal_reached<'a>(
    model: ModelKind,
    env: &Environment,
    mut agents: impl Iterator<Item = &'a Agent>,
) -> bool {
    match model {
        ModelKind::Village => false,
        ModelKind::Robots => env.item_count() == 0,
        ModelKind::Barn => !agents.any(|agent| matches!(agent, Agent::Cow(_))),
    }
}

/// System to advance the tick counter and latch termination
pub fn finish_tick(
    mut state: ResMut<SimulationState>,
    model: Res<ModelKind>,
    env: Res<Environment>,
    agents: Query<&Agent>,
) {
    state.advance();
    if state.terminated() {
        return;
    }

    let depleted = goal_reached(*model, &env, agents.iter());
    if depleted || state.budget_exhausted() {
        state.terminate();
        tracing::info!(
            model = model.as_str(),
            tick = state.tick(),
            depleted,
            "simulation terminated"
        );
    }
}
