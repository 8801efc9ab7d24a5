//! Barn Behaviours
//!
//! Cows drift along a potential field built from the cells around them:
//! empty cells attract, obstacles and crowding cows repel, dogs repel
//! strongly. Dogs of each team try to get behind a cow and push it toward
//! their own corral. A cow stepping into a corral scores for that team and
//! leaves the barn.

use glam::{DVec2, IVec2};
use rand::Rng;
use std::collections::HashMap;

use crate::behaviors::movement::{field_sum, octant_step, OCTANT_STEPS};
use crate::behaviors::{Effect, TurnContext};
use crate::components::agent::{Cow, Dog, Position};
use crate::error::SimResult;
use crate::systems::snapshot::Sensed;

/// Net pull on a cow standing at `here`
pub fn cow_field(here: IVec2, ctx: &TurnContext) -> DVec2 {
    let rules = &ctx.rules.barn;
    let half = rules.cow_sense_range / 2;
    let near = rules.cow_near_range / 2;
    let empty = ctx.rules.empty_weight;

    let sensed: HashMap<IVec2, Sensed> = ctx
        .snapshot
        .within_box(here.as_dvec2(), f64::from(half))
        .into_iter()
        .filter(|e| e.id != ctx.me)
        .map(|e| (Position(e.position).cell() - here, e.sensed))
        .collect();

    let mut contributions = Vec::new();
    for dx in -half..=half {
        for dy in -half..=half {
            let offset = IVec2::new(dx, dy);
            let cell = here + offset;
            if offset == IVec2::ZERO || !ctx.space.contains_cell(cell) {
                continue;
            }
            let weight = if ctx.env.obstacle_at_cell(cell) {
                -empty
            } else {
                match sensed.get(&offset) {
                    Some(Sensed::Dog { weight, .. }) => *weight,
                    Some(Sensed::Cow { weight }) if dx.abs() <= near && dy.abs() <= near => -weight,
                    Some(Sensed::Cow { weight }) => *weight,
                    _ => empty,
                }
            };
            contributions.push((offset, weight));
        }
    }
    field_sum(contributions)
}

pub fn step_cow(cow: &mut Cow, position: &mut Position, ctx: &mut TurnContext) -> SimResult<()> {
    if !cow.advance_phase() {
        return Ok(());
    }

    let here = position.cell();
    let Some(step) = octant_step(cow_field(here, ctx)) else {
        return Ok(());
    };
    let target = here + step;
    if !ctx.space.contains_cell(target)
        || ctx.env.obstacle_at_cell(target)
        || !ctx.occupancy.is_free(target)
    {
        return Ok(());
    }

    if let Some(team) = ctx.env.goal_zone_at(target).map(|zone| zone.team) {
        ctx.tally.score(team);
        ctx.occupancy.release(ctx.me, here);
        ctx.request(Effect::Remove(ctx.me));
        tracing::debug!(agent = %ctx.me, tick = ctx.tick, team = team.number(), "cow corralled");
        return Ok(());
    }

    if ctx.occupancy.relocate(ctx.me, here, target) {
        *position = Position::from_cell(target);
    }
    Ok(())
}

/// Direction a dog wants to push in, if it has a cow worth chasing
fn herding_direction(dog: &Dog, here: IVec2, ctx: &TurnContext) -> Option<DVec2> {
    let rules = &ctx.rules.barn;
    let corral = ctx.env.goal_zone_of(dog.team)?.center();
    let to_corral = (corral - here).as_dvec2();
    if to_corral.length() <= f64::from(rules.corral_size / 2) {
        return None;
    }
    let to_corral = to_corral.normalize();

    let mut best: Option<(f64, DVec2)> = None;
    for entry in ctx.snapshot.within_box(here.as_dvec2(), f64::from(dog.visibility / 2)) {
        if !matches!(entry.sensed, Sensed::Cow { .. }) {
            continue;
        }
        let to_cow = entry.position - here.as_dvec2();
        if to_cow == DVec2::ZERO {
            continue;
        }
        let angle = to_corral
            .dot(to_cow.normalize())
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees();
        if best.map_or(true, |(closest, _)| angle < closest) {
            best = Some((angle, to_cow));
        }
    }

    let (angle, to_cow) = best?;
    if angle <= rules.same_direction_deg {
        Some(to_cow)
    } else if angle <= rules.change_direction_deg {
        // Sidestep toward the cow's side of the corral line
        let side = DVec2::new(-to_corral.y, to_corral.x);
        if to_corral.perp_dot(to_cow) < 0.0 {
            Some(-side)
        } else {
            Some(side)
        }
    } else {
        None
    }
}

pub fn step_dog(dog: &Dog, position: &mut Position, ctx: &mut TurnContext) -> SimResult<()> {
    let here = position.cell();

    if let Some(step) = herding_direction(dog, here, ctx).and_then(octant_step) {
        let target = here + step;
        if !ctx.space.contains_cell(target) {
            return Ok(());
        }
        if !ctx.env.obstacle_at_cell(target) {
            if ctx.occupancy.relocate(ctx.me, here, target) {
                *position = Position::from_cell(target);
            }
            return Ok(());
        }
    }

    let target = here + OCTANT_STEPS[ctx.rng.gen_range(0..OCTANT_STEPS.len())];
    if ctx.space.contains_cell(target)
        && !ctx.env.obstacle_at_cell(target)
        && ctx.occupancy.relocate(ctx.me, here, target)
    {
        *position = Position::from_cell(target);
    }
    Ok(())
}
