//! Robots Setup
//!
//! Obstacles and slow zones of random radius, then robots and mines placed
//! clear of both.

use glam::DVec2;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::behaviors::movement::random_heading;
use crate::components::agent::{Agent, Position, Robot};
use crate::components::environment::{Environment, Item, Obstacle, SlowZone};
use crate::components::space::Space;
use crate::config::RobotsConfig;
use crate::error::SimResult;
use crate::setup::{sample_until, Layout};

fn random_point(space: &Space, rng: &mut SmallRng) -> DVec2 {
    space.min + DVec2::new(rng.gen::<f64>() * space.width(), rng.gen::<f64>() * space.height())
}

fn feature_radius(config: &RobotsConfig, rng: &mut SmallRng) -> f64 {
    config.feature_radius_min + config.feature_radius_span * rng.gen::<f64>()
}

/// Outside every obstacle and slow zone
fn is_clear(env: &Environment, p: DVec2) -> bool {
    !env.is_obstructed(p) && env.slow_zones_containing(p) == 0
}

pub fn layout(config: &RobotsConfig, rng: &mut SmallRng) -> SimResult<Layout> {
    config.validate()?;
    let space = Space::continuous(config.width, config.height)?;

    let obstacles = (0..config.obstacles)
        .map(|_| Obstacle {
            center: random_point(&space, rng),
            radius: feature_radius(config, rng),
        })
        .collect();
    let slow_zones = (0..config.slow_zones)
        .map(|_| SlowZone {
            center: random_point(&space, rng),
            radius: feature_radius(config, rng),
        })
        .collect();

    let mut layout = Layout::new(space);
    layout.environment = Environment::new()
        .with_obstacles(obstacles)
        .with_slow_zones(slow_zones);

    let sight = config.sight_factor * config.speed;
    for _ in 0..config.robots {
        let at = sample_until("robot", || random_point(&space, rng), |p| is_clear(&layout.environment, *p))?;
        let robot = Robot::new(config.speed, sight, random_heading(rng));
        layout.agents.push((Position(at), Agent::Robot(robot)));
    }

    for _ in 0..config.items {
        let at = sample_until("mine", || random_point(&space, rng), |p| is_clear(&layout.environment, *p))?;
        layout.environment.add_item(Item { position: at });
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_robots_layout() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = RobotsConfig::default();
        let layout = layout(&config, &mut rng).unwrap();

        assert_eq!(layout.agents.len(), config.robots);
        assert_eq!(layout.environment.item_count(), config.items);
        assert_eq!(layout.environment.obstacles().len(), config.obstacles);
        assert_eq!(layout.environment.slow_zones().len(), config.slow_zones);

        for (position, agent) in &layout.agents {
            assert!(is_clear(&layout.environment, position.0));
            assert_eq!(agent.speed(), Some(15.0));
        }
        for (_, item) in layout.environment.items() {
            assert!(is_clear(&layout.environment, item.position));
            assert!(layout.space.contains(item.position));
        }
        for zone in layout.environment.slow_zones() {
            assert!((10.0..=30.0).contains(&zone.radius));
        }
    }

    #[test]
    fn test_unplaceable_robot_is_configuration_error() {
        let mut rng = SmallRng::seed_from_u64(1);
        let config = RobotsConfig {
            width: 10.0,
            height: 10.0,
            obstacles: 1,
            feature_radius_min: 100.0,
            ..Default::default()
        };
        assert!(layout(&config, &mut rng).is_err());
    }
}
