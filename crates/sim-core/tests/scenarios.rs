//! Hand-built worlds with a known outcome after one tick.

use glam::{DVec2, IVec2};

use sim_core::components::{Agent, Cow, Environment, Item, Obstacle, Position, Robot, Space};
use sim_core::setup::Layout;
use sim_core::{Config, ModelKind, Simulation};

fn cow(weight: f64) -> Agent {
    // Acts on the first tick
    Agent::Cow(Cow { weight, turn: 1, phase: 0 })
}

fn cells(sim: &mut Simulation) -> Vec<IVec2> {
    sim.agents().into_iter().map(|(_, position, _)| position.cell()).collect()
}

/// A robot next to a visible item drives onto it and takes it
#[test]
fn test_robot_reaches_adjacent_item() {
    let mut layout = Layout::new(Space::continuous(500.0, 500.0).unwrap());
    layout.environment.add_item(Item { position: DVec2::new(10.0, 0.0) });
    layout
        .agents
        .push((Position::new(0.0, 0.0), Agent::Robot(Robot::new(15.0, 20.0, 0.0))));

    let mut sim = Simulation::with_layout(&Config::default(), ModelKind::Robots, layout).unwrap();
    assert!(sim.step());

    let (_, position, _) = sim.agents()[0].clone();
    assert!(position.0.distance(DVec2::new(10.0, 0.0)) < 1e-6);
    assert_eq!(sim.environment().item_count(), 0);
    assert!(sim.terminated());
}

/// Two cows pulled toward the same free cell: one wins, one stays
#[test]
fn test_contested_cell_goes_to_one_cow() {
    let mut layout = Layout::new(Space::grid(50, 50).unwrap());
    layout.empty_weight = 5.0;
    // Obstacles on the far side of each cow push them together
    layout.environment = Environment::new().with_obstacles(vec![
        Obstacle { center: DVec2::new(6.0, 25.0), radius: 0.0 },
        Obstacle { center: DVec2::new(16.0, 25.0), radius: 0.0 },
    ]);
    let left = IVec2::new(10, 25);
    let right = IVec2::new(12, 25);
    let contested = IVec2::new(11, 25);
    layout.agents.push((Position::from_cell(left), cow(1.0)));
    layout.agents.push((Position::from_cell(right), cow(1.0)));

    let mut sim = Simulation::with_layout(&Config::default(), ModelKind::Barn, layout).unwrap();
    sim.step();

    let after = cells(&mut sim);
    assert_eq!(after.iter().filter(|c| **c == contested).count(), 1);
    let stayed: Vec<&IVec2> = after.iter().filter(|c| **c != contested).collect();
    assert_eq!(stayed.len(), 1);
    assert!(*stayed[0] == left || *stayed[0] == right);
}

/// The contested cell is decided by activation order, which depends on
/// the seed; across seeds both cows get to win
#[test]
fn test_contested_cell_winner_depends_on_order() {
    let mut winners = std::collections::HashSet::new();
    for seed in 0..32 {
        let mut layout = Layout::new(Space::grid(50, 50).unwrap());
        layout.empty_weight = 5.0;
        layout.environment = Environment::new().with_obstacles(vec![
            Obstacle { center: DVec2::new(6.0, 25.0), radius: 0.0 },
            Obstacle { center: DVec2::new(16.0, 25.0), radius: 0.0 },
        ]);
        layout.agents.push((Position::from_cell(IVec2::new(10, 25)), cow(1.0)));
        layout.agents.push((Position::from_cell(IVec2::new(12, 25)), cow(1.0)));

        let mut config = Config::default();
        config.simulation.seed = seed;
        let mut sim = Simulation::with_layout(&config, ModelKind::Barn, layout).unwrap();
        sim.step();

        let agents = sim.agents();
        let winner = agents
            .iter()
            .find(|(_, position, _)| position.cell() == IVec2::new(11, 25))
            .map(|(id, _, _)| *id);
        winners.extend(winner);
    }
    assert_eq!(winners.len(), 2);
}

/// A lone cow in open pasture feels no net pull and stays put
#[test]
fn test_balanced_field_keeps_cow_still() {
    let mut layout = Layout::new(Space::grid(50, 50).unwrap());
    layout.empty_weight = 7.0;
    let home = IVec2::new(25, 25);
    layout.agents.push((Position::from_cell(home), cow(3.0)));

    let mut sim = Simulation::with_layout(&Config::default(), ModelKind::Barn, layout).unwrap();
    for _ in 0..3 {
        sim.step();
    }
    assert_eq!(cells(&mut sim), vec![home]);
}
