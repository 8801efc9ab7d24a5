//! Village Behaviours
//!
//! Villagers may carry lycanthropy; transformed werewolves infect nearby
//! villagers, clerics cure them, and hunters kill transformed werewolves.
//! Everyone wanders one random step per turn.

use rand::Rng;

use crate::behaviors::movement::wander;
use crate::behaviors::{Effect, TurnContext};
use crate::components::agent::{AgentId, AgentKind, Position, Villager};
use crate::error::SimResult;

/// Villagers within `radius` of `position`, excluding the acting agent
fn villagers_near(position: &Position, radius: f64, ctx: &TurnContext) -> Vec<AgentId> {
    ctx.snapshot
        .neighbors(position.0, radius)
        .into_iter()
        .filter(|e| e.kind == AgentKind::Villager && e.id != ctx.me)
        .map(|e| e.id)
        .collect()
}

pub fn step_villager(villager: &mut Villager, position: &mut Position, ctx: &mut TurnContext) -> SimResult<()> {
    let rules = ctx.rules;
    if villager.lycanthrope
        && !villager.transformed
        && ctx.rng.gen::<f64>() <= rules.village.transform_probability
    {
        villager.transform();
        tracing::debug!(agent = %ctx.me, tick = ctx.tick, "werewolf transformed");
    }

    if villager.transformed {
        for target in villagers_near(position, rules.village.infection_radius, ctx) {
            ctx.request(Effect::Infect(target));
        }
    }

    position.0 = wander(position.0, villager.speed, ctx.space, ctx.rng);
    Ok(())
}

pub fn step_cleric(speed: f64, position: &mut Position, ctx: &mut TurnContext) -> SimResult<()> {
    for target in villagers_near(position, ctx.rules.village.cure_radius, ctx) {
        ctx.request(Effect::Cure(target));
    }
    position.0 = wander(position.0, speed, ctx.space, ctx.rng);
    Ok(())
}

pub fn step_hunter(speed: f64, position: &mut Position, ctx: &mut TurnContext) -> SimResult<()> {
    for target in villagers_near(position, ctx.rules.village.hunt_radius, ctx) {
        ctx.request(Effect::Slay(target));
    }
    position.0 = wander(position.0, speed, ctx.space, ctx.rng);
    Ok(())
}
