//! Agent Components
//!
//! Identity, position, and the closed set of agent kinds with their
//! per-kind state.

use bevy_ecs::prelude::*;
use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent
///
/// Assigned at creation from `IdAllocator`, never reused. The total order
/// on ids is the tie-breaker for every neighbourhood query.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resource handing out agent ids
#[derive(Resource, Debug)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Component: An agent's current position
///
/// Grid agents always hold integer-valued coordinates; use `cell()` to
/// compare them exactly.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn from_cell(cell: IVec2) -> Self {
        Self(cell.as_dvec2())
    }

    pub fn cell(&self) -> IVec2 {
        IVec2::new(self.0.x.round() as i32, self.0.y.round() as i32)
    }
}

/// Tag distinguishing behaviour variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Villager,
    Cleric,
    Hunter,
    Robot,
    Cow,
    Dog,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Villager => "villager",
            AgentKind::Cleric => "cleric",
            AgentKind::Hunter => "hunter",
            AgentKind::Robot => "robot",
            AgentKind::Cow => "cow",
            AgentKind::Dog => "dog",
        }
    }
}

/// Herding team affiliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    One,
    Two,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::One, Team::Two];

    /// Zero-based index into per-team tables
    pub fn index(&self) -> usize {
        match self {
            Team::One => 0,
            Team::Two => 1,
        }
    }

    pub fn number(&self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Villager state: a healthy human, a latent werewolf, or a transformed one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Villager {
    pub speed: f64,
    pub lycanthrope: bool,
    pub transformed: bool,
}

impl Villager {
    pub fn human(speed: f64) -> Self {
        Self {
            speed,
            lycanthrope: false,
            transformed: false,
        }
    }

    pub fn werewolf(speed: f64) -> Self {
        Self {
            speed,
            lycanthrope: true,
            transformed: false,
        }
    }

    pub fn infect(&mut self) {
        self.lycanthrope = true;
    }

    /// Only untransformed villagers can be cured
    pub fn cure(&mut self) -> bool {
        if self.transformed {
            return false;
        }
        self.lycanthrope = false;
        true
    }

    pub fn transform(&mut self) {
        self.lycanthrope = true;
        self.transformed = true;
    }
}

/// Mine-clearing robot state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub speed: f64,
    /// Effective speed used on the previous turn
    pub last_speed: f64,
    pub sight_distance: f64,
    /// Heading in radians
    pub heading: f64,
    /// Turns left during which markers are ignored
    pub counter: u32,
    /// Consumed item positions awaiting an indication marker
    pub pending_trail: Vec<DVec2>,
}

impl Robot {
    pub fn new(speed: f64, sight_distance: f64, heading: f64) -> Self {
        Self {
            speed,
            last_speed: speed,
            sight_distance,
            heading,
            counter: 0,
            pending_trail: Vec::new(),
        }
    }

    /// Ignore markers for half the base speed, in turns
    pub fn reset_counter(&mut self) {
        self.counter = (self.speed / 2.0).floor().max(0.0) as u32;
    }
}

/// Cow state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cow {
    /// Attraction felt by other cows, 1..=10
    pub weight: f64,
    /// Phase (0..3) on which this cow acts
    pub turn: u8,
    pub phase: u8,
}

impl Cow {
    /// Advance the three-phase cycle; true when this cow acts this turn
    pub fn advance_phase(&mut self) -> bool {
        self.phase = (self.phase + 1) % 3;
        self.phase == self.turn
    }
}

/// Herding dog state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub team: Team,
    /// Repulsion felt by cows, -300..=-100
    pub weight: f64,
    /// Side of the square sensing window, in cells
    pub visibility: i32,
}

/// Component: the agent's kind and kind-specific state
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Agent {
    Villager(Villager),
    Cleric { speed: f64 },
    Hunter { speed: f64 },
    Robot(Robot),
    Cow(Cow),
    Dog(Dog),
}

impl Agent {
    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::Villager(_) => AgentKind::Villager,
            Agent::Cleric { .. } => AgentKind::Cleric,
            Agent::Hunter { .. } => AgentKind::Hunter,
            Agent::Robot(_) => AgentKind::Robot,
            Agent::Cow(_) => AgentKind::Cow,
            Agent::Dog(_) => AgentKind::Dog,
        }
    }

    /// Movement speed for continuous agents
    pub fn speed(&self) -> Option<f64> {
        match self {
            Agent::Villager(v) => Some(v.speed),
            Agent::Cleric { speed } | Agent::Hunter { speed } => Some(*speed),
            Agent::Robot(r) => Some(r.speed),
            Agent::Cow(_) | Agent::Dog(_) => None,
        }
    }

    pub fn heading(&self) -> Option<f64> {
        match self {
            Agent::Robot(r) => Some(r.heading),
            _ => None,
        }
    }

    pub fn as_villager(&self) -> Option<&Villager> {
        match self {
            Agent::Villager(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_villager_mut(&mut self) -> Option<&mut Villager> {
        match self {
            Agent::Villager(v) => Some(v),
            _ => None,
        }
    }
}
