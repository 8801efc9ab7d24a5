//! Determinism verification tests
//!
//! The same seed must reproduce the same run, tick for tick.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use glam::DVec2;
use sim_core::components::{Agent, AgentId, Item, Position, Robot, Space};
use sim_core::setup::Layout;
use sim_core::{Config, ModelKind, Simulation};

fn config(seed: u64, ticks: u64) -> Config {
    let mut config = Config::default();
    config.simulation.seed = seed;
    config.simulation.max_ticks = ticks;
    config
}

/// Positions of every agent after each tick
fn trajectory(model: ModelKind, seed: u64, ticks: u64) -> Vec<Vec<(AgentId, Position)>> {
    let mut sim = Simulation::new(&config(seed, ticks), model).unwrap();
    let mut frames = Vec::new();
    while sim.step() {
        frames.push(
            sim.agents()
                .into_iter()
                .map(|(id, position, _)| (id, position))
                .collect(),
        );
    }
    frames
}

/// Test that SmallRng produces identical sequences with the same seed
#[test]
fn test_rng_determinism() {
    let mut rng1 = SmallRng::seed_from_u64(42);
    let values1: Vec<f64> = (0..100).map(|_| rng1.gen()).collect();

    let mut rng2 = SmallRng::seed_from_u64(42);
    let values2: Vec<f64> = (0..100).map(|_| rng2.gen()).collect();

    assert_eq!(values1, values2, "RNG sequences should be identical with same seed");
}

#[test]
fn test_village_trajectories_repeat() {
    assert_eq!(
        trajectory(ModelKind::Village, 7, 50),
        trajectory(ModelKind::Village, 7, 50)
    );
}

#[test]
fn test_robots_trajectories_repeat() {
    assert_eq!(
        trajectory(ModelKind::Robots, 11, 50),
        trajectory(ModelKind::Robots, 11, 50)
    );
}

#[test]
fn test_barn_trajectories_repeat() {
    assert_eq!(trajectory(ModelKind::Barn, 3, 50), trajectory(ModelKind::Barn, 3, 50));
}

#[test]
fn test_metrics_repeat() {
    let run = |seed| {
        let mut sim = Simulation::new(&config(seed, 40), ModelKind::Robots).unwrap();
        sim.run();
        sim.metrics().to_vec()
    };
    assert_eq!(run(5), run(5));
}

/// Test that different seeds produce different runs
#[test]
fn test_different_seeds_diverge() {
    assert_ne!(
        trajectory(ModelKind::Village, 1, 10),
        trajectory(ModelKind::Village, 2, 10)
    );
}

/// Isolated robots with nothing to sense only wander, and still repeat
#[test]
fn test_isolated_wander_repeats() {
    let run = || {
        let mut layout = Layout::new(Space::continuous(500.0, 500.0).unwrap());
        // Out of everyone's sight, but keeps the run from ending early
        layout.environment.add_item(Item { position: DVec2::new(250.0, 250.0) });
        for (x, y) in [(50.0, 50.0), (450.0, 50.0), (250.0, 450.0)] {
            layout
                .agents
                .push((Position(DVec2::new(x, y)), Agent::Robot(Robot::new(15.0, 30.0, 0.0))));
        }
        let mut sim = Simulation::with_layout(&config(99, 5), ModelKind::Robots, layout).unwrap();
        let mut frames = Vec::new();
        while sim.step() {
            frames.push(sim.agents());
        }
        frames
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(first.len(), 5);
    for frame in &first {
        for (_, position, agent) in frame {
            assert!(position.0.x >= 0.0 && position.0.x <= 500.0);
            assert!(agent.heading().is_some());
        }
    }
}
