//! Simulation State
//!
//! Tick bookkeeping, shared counters, and the per-tick removal and
//! occupancy registers.

use bevy_ecs::prelude::*;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::components::agent::{AgentId, Team};

/// Which of the three simulations a world runs
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Werewolf contagion among villagers, clerics and hunters
    Village,
    /// Mine-clearing robots with markers
    Robots,
    /// Dogs herding cows into team corrals
    Barn,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Village => "village",
            ModelKind::Robots => "robots",
            ModelKind::Barn => "barn",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "village" => Ok(ModelKind::Village),
            "robots" => Ok(ModelKind::Robots),
            "barn" => Ok(ModelKind::Barn),
            other => Err(format!("unknown model '{}'", other)),
        }
    }
}

/// Resource: tick counter and terminal flag
#[derive(Resource, Debug, Clone)]
pub struct SimulationState {
    tick: u64,
    pub max_ticks: u64,
    terminated: bool,
}

impl SimulationState {
    pub fn new(max_ticks: u64) -> Self {
        Self {
            tick: 0,
            max_ticks,
            terminated: false,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// Complete one scheduler pass
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Latch the terminal flag; it never resets
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    pub fn budget_exhausted(&self) -> bool {
        self.tick >= self.max_ticks
    }
}

/// Resource: shared counters incremented by behaviours
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tally {
    /// Agent-turns spent inside slow zones (one per zone)
    pub slow_zone_steps: u64,
    pub team_scores: [u64; 2],
    pub initial_items: usize,
    pub initial_agents: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&mut self, team: Team) {
        self.team_scores[team.index()] += 1;
    }

    pub fn team_score(&self, team: Team) -> u64 {
        self.team_scores[team.index()]
    }
}

/// Resource: agents removed during the current tick
///
/// Removal only marks the id; despawning happens after every agent has
/// acted, so nothing invalidates the activation order mid-tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct Tombstones {
    removed: BTreeSet<AgentId>,
}

impl Tombstones {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the agent was not already removed
    pub fn mark(&mut self, id: AgentId) -> bool {
        self.removed.insert(id)
    }

    pub fn is_removed(&self, id: AgentId) -> bool {
        self.removed.contains(&id)
    }

    pub fn drain(&mut self) -> Vec<AgentId> {
        std::mem::take(&mut self.removed).into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Resource: live cell occupancy for grid models
///
/// Unlike neighbour sensing, occupancy is updated as soon as an agent
/// moves, so two agents can never claim the same cell in one tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct Occupancy {
    cells: HashMap<IVec2, AgentId>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self, cell: IVec2) -> Option<AgentId> {
        self.cells.get(&cell).copied()
    }

    pub fn is_free(&self, cell: IVec2) -> bool {
        !self.cells.contains_key(&cell)
    }

    /// Claim a free cell; false if someone already stands there
    pub fn place(&mut self, id: AgentId, cell: IVec2) -> bool {
        if self.cells.contains_key(&cell) {
            return false;
        }
        self.cells.insert(cell, id);
        true
    }

    /// Move an occupant from one cell to a free one
    pub fn relocate(&mut self, id: AgentId, from: IVec2, to: IVec2) -> bool {
        if !self.is_free(to) {
            return false;
        }
        if self.cells.get(&from) == Some(&id) {
            self.cells.remove(&from);
        }
        self.cells.insert(to, id);
        true
    }

    pub fn release(&mut self, id: AgentId, cell: IVec2) {
        if self.cells.get(&cell) == Some(&id) {
            self.cells.remove(&cell);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
