//! Barn Setup
//!
//! Two square corrals on the vertical centre line, then obstacles, cows
//! and dogs on distinct free cells.

use glam::IVec2;
use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::HashSet;

use crate::components::agent::{Agent, Cow, Dog, Position, Team};
use crate::components::environment::{Environment, GoalZone, Obstacle};
use crate::components::space::Space;
use crate::config::BarnConfig;
use crate::error::SimResult;
use crate::setup::{sample_until, Layout};

/// Corral centres: a quarter and three quarters of the way up
pub fn corral_centers(config: &BarnConfig) -> [(Team, IVec2); 2] {
    [
        (Team::One, IVec2::new(config.width / 2, config.height / 4)),
        (Team::Two, IVec2::new(config.width / 2, 3 * config.height / 4)),
    ]
}

/// Claim a random cell nobody has taken yet
fn free_cell(what: &str, config: &BarnConfig, taken: &mut HashSet<IVec2>, rng: &mut SmallRng) -> SimResult<IVec2> {
    let cell = sample_until(
        what,
        || IVec2::new(rng.gen_range(0..config.width), rng.gen_range(0..config.height)),
        |cell| !taken.contains(cell),
    )?;
    taken.insert(cell);
    Ok(cell)
}

pub fn layout(config: &BarnConfig, rng: &mut SmallRng) -> SimResult<Layout> {
    config.validate()?;
    let mut layout = Layout::new(Space::grid(config.width, config.height)?);
    layout.empty_weight = f64::from(rng.gen_range(1..=10_i32));

    let corrals: Vec<GoalZone> = corral_centers(config)
        .into_iter()
        .map(|(team, center)| GoalZone::square(team, center, config.corral_size))
        .collect();
    let mut taken: HashSet<IVec2> = corrals.iter().flat_map(|zone| zone.cells()).collect();

    let mut obstacles = Vec::with_capacity(config.obstacles);
    for _ in 0..config.obstacles {
        let cell = free_cell("obstacle", config, &mut taken, rng)?;
        obstacles.push(Obstacle { center: cell.as_dvec2(), radius: 0.0 });
    }
    layout.environment = Environment::new()
        .with_obstacles(obstacles)
        .with_goal_zones(corrals);

    for _ in 0..config.cows {
        let cell = free_cell("cow", config, &mut taken, rng)?;
        let cow = Cow {
            weight: f64::from(rng.gen_range(1..=10_i32)),
            turn: rng.gen_range(0..=2),
            phase: 0,
        };
        layout.agents.push((Position::from_cell(cell), Agent::Cow(cow)));
    }

    for _ in 0..config.dogs_per_team {
        for team in Team::ALL {
            let cell = free_cell("dog", config, &mut taken, rng)?;
            let dog = Dog {
                team,
                weight: f64::from(rng.gen_range(-300..=-100_i32)),
                visibility: config.dog_visibility,
            };
            layout.agents.push((Position::from_cell(cell), Agent::Dog(dog)));
        }
    }

    Ok(layout)
}
