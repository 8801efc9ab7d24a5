//! Agent Behaviours
//!
//! One turn of behaviour per agent kind. A behaviour mutates its own agent
//! and the environment directly, reads other agents only through the
//! tick-start snapshot, and asks for changes to other agents by pushing
//! `Effect`s that the turn system applies once the turn is over.

pub mod barn;
pub mod movement;
pub mod robots;
pub mod village;

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

use crate::components::agent::{Agent, AgentId, Position};
use crate::components::environment::Environment;
use crate::components::simulation::{Occupancy, Tally};
use crate::components::space::Space;
use crate::config::{BarnConfig, RobotsConfig, VillageConfig};
use crate::error::SimResult;
use crate::systems::snapshot::WorldSnapshot;

/// Resource: behaviour parameters for the running model
#[derive(Resource, Debug, Clone, Default)]
pub struct Rules {
    pub village: VillageConfig,
    pub robots: RobotsConfig,
    pub barn: BarnConfig,
    /// Weight of an empty cell in the cow potential field, drawn at setup
    pub empty_weight: f64,
}

/// A change one agent makes to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Make the target a latent werewolf
    Infect(AgentId),
    /// Cure the target unless it has transformed
    Cure(AgentId),
    /// Remove the target if it is a transformed werewolf
    Slay(AgentId),
    /// Remove the target unconditionally
    Remove(AgentId),
}

impl Effect {
    pub fn target(&self) -> AgentId {
        match self {
            Effect::Infect(id) | Effect::Cure(id) | Effect::Slay(id) | Effect::Remove(id) => *id,
        }
    }
}

/// Everything one agent turn may read or change
pub struct TurnContext<'a> {
    pub me: AgentId,
    pub tick: u64,
    pub space: &'a Space,
    pub snapshot: &'a WorldSnapshot,
    pub rules: &'a Rules,
    pub env: &'a mut Environment,
    pub occupancy: &'a mut Occupancy,
    pub tally: &'a mut Tally,
    pub rng: &'a mut SmallRng,
    effects: Vec<Effect>,
}

impl<'a> TurnContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        me: AgentId,
        tick: u64,
        space: &'a Space,
        snapshot: &'a WorldSnapshot,
        rules: &'a Rules,
        env: &'a mut Environment,
        occupancy: &'a mut Occupancy,
        tally: &'a mut Tally,
        rng: &'a mut SmallRng,
    ) -> Self {
        Self {
            me,
            tick,
            space,
            snapshot,
            rules,
            env,
            occupancy,
            tally,
            rng,
            effects: Vec::new(),
        }
    }

    pub fn request(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Hand over the effects queued during this turn
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

/// Run one turn of `agent`'s behaviour
pub fn step(agent: &mut Agent, position: &mut Position, ctx: &mut TurnContext) -> SimResult<()> {
    match agent {
        Agent::Villager(villager) => village::step_villager(villager, position, ctx),
        Agent::Cleric { speed } => village::step_cleric(*speed, position, ctx),
        Agent::Hunter { speed } => village::step_hunter(*speed, position, ctx),
        Agent::Robot(robot) => robots::step_robot(robot, position, ctx),
        Agent::Cow(cow) => barn::step_cow(cow, position, ctx),
        Agent::Dog(dog) => barn::step_dog(dog, position, ctx),
    }
}
