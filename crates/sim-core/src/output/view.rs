//! View Generation
//!
//! Turns the world into layered portrayals for a renderer. Coordinates
//! are normalized into the unit square; environment features come before
//! agents, and agents appear in id order.

use bevy_ecs::prelude::*;
use sim_view::{Portrayal, ViewSnapshot};

use crate::components::agent::{Agent, AgentId, Position, Team};
use crate::components::environment::{Environment, MarkerPurpose};
use crate::components::simulation::{ModelKind, SimulationState};
use crate::components::space::Space;

/// Side of the square drawn for a grid cell
const CELL_FILL: f64 = 0.9;

/// Resource to track view snapshot generation
#[derive(Resource, Debug, Clone)]
pub struct ViewScheduler {
    interval: u64,
    written: u64,
}

impl ViewScheduler {
    pub fn new(interval: u64) -> Self {
        Self { interval, written: 0 }
    }

    /// Tick 0 always gets a view; an interval of 0 disables the rest
    pub fn should_snapshot(&self, tick: u64) -> bool {
        tick == 0 || (self.interval > 0 && tick % self.interval == 0)
    }

    pub fn mark_written(&mut self) {
        self.written += 1;
    }

    pub fn snapshot_count(&self) -> u64 {
        self.written
    }
}

/// Portrayal of one agent, before positioning
pub fn portray_agent(agent: &Agent) -> Portrayal {
    match agent {
        Agent::Villager(v) => {
            let color = if v.lycanthrope { "red" } else { "blue" };
            let radius = if v.transformed { 6.0 } else { 3.0 };
            Portrayal::circle(color, 1, radius)
        }
        Agent::Cleric { .. } => Portrayal::circle("green", 1, 3.0),
        Agent::Hunter { .. } => Portrayal::circle("black", 1, 3.0),
        Agent::Robot(r) => Portrayal::arrow_head("Red", 3, r.heading),
        Agent::Cow(_) => Portrayal::circle("black", 2, 0.5),
        Agent::Dog(d) => {
            let color = match d.team {
                Team::One => "red",
                Team::Two => "blue",
            };
            Portrayal::circle(color, 2, 0.8)
        }
    }
}

/// Portrayals of the non-agent features, already positioned
pub fn portray_environment(model: ModelKind, space: &Space, env: &Environment) -> Vec<Portrayal> {
    let place = |portrayal: Portrayal, at: glam::DVec2| {
        let n = space.normalize(at);
        portrayal.at(n.x, n.y)
    };
    let mut out = Vec::new();

    match model {
        ModelKind::Barn => {
            for obstacle in env.obstacles() {
                out.push(place(Portrayal::rect("green", 1, CELL_FILL, CELL_FILL), obstacle.center));
            }
            for zone in env.goal_zones() {
                let color = match zone.team {
                    Team::One => "#FEB2A2",
                    Team::Two => "#9AFDFF",
                };
                for cell in zone.cells() {
                    out.push(place(Portrayal::rect(color, 1, CELL_FILL, CELL_FILL), cell.as_dvec2()));
                }
            }
        }
        ModelKind::Robots | ModelKind::Village => {
            for obstacle in env.obstacles() {
                out.push(place(Portrayal::circle("black", 1, obstacle.radius), obstacle.center));
            }
            for zone in env.slow_zones() {
                out.push(place(Portrayal::circle("olive", 1, zone.radius), zone.center));
            }
            for (_, item) in env.items() {
                out.push(place(Portrayal::circle("black", 2, 2.0), item.position));
            }
            for (_, marker) in env.markers() {
                let color = match marker.purpose {
                    MarkerPurpose::Hazard => "red",
                    MarkerPurpose::Indication => "green",
                };
                out.push(place(Portrayal::circle(color, 2, 2.0), marker.position));
            }
        }
    }
    out
}

/// Generate a complete view of the current world
pub fn generate_view(world: &mut World) -> ViewSnapshot {
    let tick = world.resource::<SimulationState>().tick();
    let model = *world.resource::<ModelKind>();
    let space = *world.resource::<Space>();

    let mut view = ViewSnapshot::new(tick, model.as_str());
    for portrayal in portray_environment(model, &space, world.resource::<Environment>()) {
        view.push(portrayal);
    }

    let mut query = world.query::<(&AgentId, &Position, &Agent)>();
    let mut agents: Vec<(AgentId, Portrayal)> = query
        .iter(world)
        .map(|(id, position, agent)| {
            let n = space.normalize(position.0);
            (*id, portray_agent(agent).at(n.x, n.y))
        })
        .collect();
    agents.sort_by_key(|(id, _)| *id);
    for (_, portrayal) in agents {
        view.push(portrayal);
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{Dog, Robot, Villager};
    use crate::components::environment::{GoalZone, Item, Marker};
    use glam::{DVec2, IVec2};
    use sim_view::Shape;

    #[test]
    fn test_villager_portrayals() {
        let human = portray_agent(&Agent::Villager(Villager::human(10.0)));
        assert_eq!(human.color.as_str(), "blue");
        assert_eq!(human.radius, Some(3.0));

        let wolf = portray_agent(&Agent::Villager(Villager {
            speed: 10.0,
            lycanthrope: true,
            transformed: true,
        }));
        assert_eq!(wolf.color.as_str(), "red");
        assert_eq!(wolf.radius, Some(6.0));
        assert_eq!(wolf.layer, 1);
    }

    #[test]
    fn test_robot_and_dog_portrayals() {
        let robot = portray_agent(&Agent::Robot(Robot::new(15.0, 30.0, 1.5)));
        assert_eq!(robot.shape, Shape::ArrowHead);
        assert_eq!(robot.angle, Some(1.5));
        assert_eq!(robot.layer, 3);

        let dog = portray_agent(&Agent::Dog(Dog { team: Team::Two, weight: -150.0, visibility: 17 }));
        assert_eq!(dog.color.as_str(), "blue");
        assert_eq!(dog.radius, Some(0.8));
    }

    #[test]
    fn test_environment_positions_are_normalized() {
        let space = Space::continuous(500.0, 500.0).unwrap();
        let mut env = Environment::new();
        env.add_item(Item { position: DVec2::new(250.0, 500.0) });
        env.add_marker(Marker::hazard(DVec2::new(0.0, 125.0)));

        let out = portray_environment(ModelKind::Robots, &space, &env);
        assert_eq!(out.len(), 2);
        assert_eq!((out[0].x, out[0].y), (0.5, 1.0));
        assert_eq!(out[1].color.as_str(), "red");
        assert_eq!((out[1].x, out[1].y), (0.0, 0.25));
    }

    #[test]
    fn test_barn_corrals_drawn_per_cell() {
        let space = Space::grid(50, 50).unwrap();
        let env = Environment::new().with_goal_zones(vec![GoalZone::square(Team::One, IVec2::new(25, 12), 5)]);

        let out = portray_environment(ModelKind::Barn, &space, &env);
        assert_eq!(out.len(), 25);
        assert!(out.iter().all(|p| p.shape == Shape::Rect && p.color.as_str() == "#FEB2A2"));
        assert!(out.iter().all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));
    }

    #[test]
    fn test_scheduler_intervals() {
        let scheduler = ViewScheduler::new(10);
        assert!(scheduler.should_snapshot(0));
        assert!(!scheduler.should_snapshot(5));
        assert!(scheduler.should_snapshot(20));
        assert!(!ViewScheduler::new(0).should_snapshot(20));
    }
}
