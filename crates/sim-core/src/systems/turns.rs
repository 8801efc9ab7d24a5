//! Turn System
//!
//! Activates every live agent once per tick in a seeded random order.
//! Effects an agent requests on others are applied as soon as its turn
//! ends, so the next agent in line already sees them.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;

use crate::behaviors::{self, Effect, Rules, TurnContext};
use crate::components::agent::{Agent, AgentId, Position};
use crate::components::environment::Environment;
use crate::components::simulation::{Occupancy, SimulationState, Tally, Tombstones};
use crate::components::space::Space;
use crate::error::{SimError, SimResult};
use crate::systems::snapshot::WorldSnapshot;
use crate::SimRng;

type AgentQuery<'w, 's> = Query<'w, 's, (&'static mut Position, &'static mut Agent), With<AgentId>>;

/// Apply one effect to its target, reading the target's live state
fn apply_effect(
    effect: Effect,
    snapshot: &WorldSnapshot,
    agents: &mut AgentQuery,
    tombstones: &mut Tombstones,
) -> SimResult<()> {
    let target = effect.target();
    if tombstones.is_removed(target) {
        return Err(SimError::TransientReference(target));
    }
    let entity = snapshot
        .get(target)
        .map(|entry| entry.entity)
        .ok_or(SimError::TransientReference(target))?;
    let (_, mut agent) = agents
        .get_mut(entity)
        .map_err(|_| SimError::TransientReference(target))?;

    match effect {
        Effect::Infect(_) => {
            if let Some(villager) = agent.as_villager_mut() {
                villager.infect();
            }
        }
        Effect::Cure(_) => {
            if let Some(villager) = agent.as_villager_mut() {
                villager.cure();
            }
        }
        Effect::Slay(_) => {
            if agent.as_villager().is_some_and(|v| v.transformed) {
                tombstones.mark(target);
                tracing::debug!(agent = %target, "werewolf slain");
            }
        }
        Effect::Remove(_) => {
            tombstones.mark(target);
        }
    }
    Ok(())
}

/// System to run one turn for every agent
#[allow(clippy::too_many_arguments)]
pub fn run_agent_turns(
    state: Res<SimulationState>,
    space: Res<Space>,
    snapshot: Res<WorldSnapshot>,
    rules: Res<Rules>,
    mut env: ResMut<Environment>,
    mut occupancy: ResMut<Occupancy>,
    mut tally: ResMut<Tally>,
    mut tombstones: ResMut<Tombstones>,
    mut rng: ResMut<SimRng>,
    mut agents: AgentQuery,
) {
    let mut order: Vec<AgentId> = snapshot.ids();
    order.shuffle(&mut rng.0);

    for id in order {
        if tombstones.is_removed(id) {
            continue;
        }
        let Some(entity) = snapshot.get(id).map(|entry| entry.entity) else {
            continue;
        };

        let (outcome, effects) = {
            let Ok((mut position, mut agent)) = agents.get_mut(entity) else {
                tracing::debug!(agent = %id, "no longer present, turn skipped");
                continue;
            };
            let mut ctx = TurnContext::new(
                id,
                state.tick(),
                &space,
                &snapshot,
                &rules,
                &mut env,
                &mut occupancy,
                &mut tally,
                &mut rng.0,
            );
            let outcome = behaviors::step(&mut agent, &mut position, &mut ctx);
            (outcome, ctx.take_effects())
        };

        if let Err(err) = outcome {
            if err.is_recoverable() {
                tracing::debug!(agent = %id, "{}", err);
            } else {
                tracing::warn!(agent = %id, "{}", err);
            }
        }

        for effect in effects {
            if let Err(err) = apply_effect(effect, &snapshot, &mut agents, &mut tombstones) {
                tracing::debug!(source = %id, "effect skipped: {}", err);
            }
        }
    }
}
