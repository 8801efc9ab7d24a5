//! Village Setup
//!
//! Humans, latent werewolves, clerics and hunters scattered uniformly.

use glam::DVec2;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::agent::{Agent, Position, Villager};
use crate::components::space::Space;
use crate::config::VillageConfig;
use crate::error::SimResult;
use crate::setup::Layout;

fn random_point(space: &Space, rng: &mut SmallRng) -> Position {
    Position(space.min + DVec2::new(rng.gen::<f64>() * space.width(), rng.gen::<f64>() * space.height()))
}

pub fn layout(config: &VillageConfig, rng: &mut SmallRng) -> SimResult<Layout> {
    config.validate()?;
    let mut layout = Layout::new(Space::continuous(config.width, config.height)?);

    let roster = std::iter::repeat_with(|| Agent::Villager(Villager::human(config.speed)))
        .take(config.villagers)
        .chain(
            std::iter::repeat_with(|| Agent::Villager(Villager::werewolf(config.speed)))
                .take(config.werewolves),
        )
        .chain(std::iter::repeat_with(|| Agent::Cleric { speed: config.speed }).take(config.clerics))
        .chain(std::iter::repeat_with(|| Agent::Hunter { speed: config.speed }).take(config.hunters));

    for agent in roster {
        let position = random_point(&layout.space, rng);
        layout.agents.push((position, agent));
    }
    Ok(layout)
}
