//! Robot Behaviour
//!
//! Robots sweep a continuous field for mines. On each turn a robot:
//!
//! 1. Consumes the items and markers it stands on
//! 2. Slows down inside slow zones, dropping a hazard marker on leaving one
//! 3. Heads for the nearest visible item it can reach
//! 4. Otherwise follows the nearest visible marker (once its cool-down ends)
//! 5. Otherwise moves ahead, re-drawing its heading when blocked
//! 6. Marks where it found items with indication markers
//!
//! Other robots are sensed from the tick-start snapshot; items and markers
//! are read and changed live, so an item taken earlier in the tick is gone
//! for everyone acting later.

use glam::DVec2;
use rand::Rng;
use std::f64::consts::{FRAC_PI_2, PI};

use crate::behaviors::movement::{go_to, project, random_heading, wrap_angle};
use crate::behaviors::TurnContext;
use crate::components::agent::{Position, Robot};
use crate::components::environment::{Marker, MarkerPurpose};
use crate::components::space::POSITION_EPSILON;
use crate::error::SimResult;
use crate::systems::snapshot::Sensed;

pub fn step_robot(robot: &mut Robot, position: &mut Position, ctx: &mut TurnContext) -> SimResult<()> {
    robot.counter = robot.counter.saturating_sub(1);

    let mut trail = std::mem::take(&mut robot.pending_trail);
    trail.extend(collect_items(position.0, ctx));
    if !trail.is_empty() {
        robot.reset_counter();
    }
    ctx.env.remove_markers_at(position.0, POSITION_EPSILON);

    let zones = ctx.env.slow_zones_containing(position.0);
    let speed = robot.speed / 2f64.powi(zones as i32);
    ctx.tally.slow_zone_steps += zones as u64;

    if speed == robot.speed && robot.last_speed != robot.speed {
        ctx.env.add_marker(Marker::hazard(position.0));
        robot.reset_counter();
        tracing::trace!(agent = %ctx.me, "left slow zone, hazard marked");
    }
    robot.last_speed = speed;

    if ctx.rng.gen::<f64>() <= ctx.rules.robots.heading_change_probability {
        robot.heading = random_heading(ctx.rng);
    }

    let moved = seek_item(robot, position, speed, ctx)
        || (robot.counter == 0 && follow_marker(robot, position, speed, ctx));
    if !moved {
        roam(robot, position, speed, ctx);
    }

    for spot in trail {
        ctx.env.add_marker(Marker::indication(spot, robot.heading));
    }

    // Items reached this turn disappear now; their marker follows next turn
    robot.pending_trail = collect_items(position.0, ctx);
    Ok(())
}

/// Take every item lying on `at`, returning their positions
fn collect_items(at: DVec2, ctx: &mut TurnContext) -> Vec<DVec2> {
    let mut taken = Vec::new();
    for (id, item) in ctx.env.items_at(at) {
        if ctx.env.remove_item(id) {
            tracing::debug!(agent = %ctx.me, tick = ctx.tick, x = item.position.x, y = item.position.y, "item collected");
            taken.push(item.position);
        }
    }
    taken
}

/// A move is feasible when it stays in bounds, clear of obstacles, and
/// outside the safety radius of every other robot in sight
fn feasible(robot: &Robot, from: DVec2, to: DVec2, ctx: &TurnContext) -> bool {
    if !ctx.space.contains(to) || ctx.env.is_obstructed(to) {
        return false;
    }
    ctx.snapshot
        .neighbors(from, robot.sight_distance)
        .into_iter()
        .filter(|e| e.id != ctx.me)
        .all(|e| match e.sensed {
            Sensed::Robot { speed } => e.position.distance(to) > speed,
            _ => true,
        })
}

fn seek_item(robot: &mut Robot, position: &mut Position, speed: f64, ctx: &mut TurnContext) -> bool {
    for (_, item) in ctx.env.items_within(position.0, robot.sight_distance) {
        let (next, heading) = go_to(position.0, speed, item.position, ctx.rng);
        if feasible(robot, position.0, next, ctx) {
            position.0 = next;
            robot.heading = heading;
            return true;
        }
    }
    false
}

fn follow_marker(robot: &mut Robot, position: &mut Position, speed: f64, ctx: &mut TurnContext) -> bool {
    for (_, marker) in ctx.env.markers_within(position.0, robot.sight_distance) {
        let (next, heading) = go_to(position.0, speed, marker.position, ctx.rng);
        if !feasible(robot, position.0, next, ctx) {
            continue;
        }
        position.0 = next;
        robot.heading = match (marker.purpose, marker.heading()) {
            (MarkerPurpose::Indication, Some(along)) => {
                let turn = if ctx.rng.gen::<f64>() > 0.5 { FRAC_PI_2 } else { -FRAC_PI_2 };
                wrap_angle(along + turn)
            }
            (MarkerPurpose::Indication, None) => heading,
            (MarkerPurpose::Hazard, _) => wrap_angle(heading + PI),
        };
        return true;
    }
    false
}

/// Move ahead, re-drawing the heading while blocked; stay put if no
/// heading works within the retry budget
fn roam(robot: &mut Robot, position: &mut Position, speed: f64, ctx: &mut TurnContext) {
    let mut next = project(position.0, speed, robot.heading);
    let mut retries = 0;
    while !feasible(robot, position.0, next, ctx) {
        if retries >= ctx.rules.robots.max_heading_retries {
            tracing::trace!(agent = %ctx.me, "boxed in, staying put");
            return;
        }
        robot.heading = random_heading(ctx.rng);
        next = project(position.0, speed, robot.heading);
        retries += 1;
    }
    position.0 = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::test_support::Bench;
    use crate::components::agent::Agent;
    use crate::components::environment::{Item, Obstacle, SlowZone};
    use crate::components::space::Space;

    fn bench() -> Bench {
        Bench::new(Space::continuous(500.0, 500.0).unwrap())
    }

    fn robot_at(bench: &mut Bench, robot: &Robot, at: DVec2) -> (Agent, Position) {
        let agent = Agent::Robot(robot.clone());
        bench.observe(&[(1, at, &agent)]);
        (agent, Position(at))
    }

    fn robot_state(agent: &Agent) -> &Robot {
        match agent {
            Agent::Robot(r) => r,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_item_removed_on_arrival_and_marked_next_turn() {
        let mut bench = bench();
        bench.rules.robots.heading_change_probability = 0.0;
        bench.env.add_item(Item { position: DVec2::new(110.0, 100.0) });
        let (mut agent, mut pos) = robot_at(&mut bench, &Robot::new(15.0, 30.0, 0.0), DVec2::new(100.0, 100.0));

        bench.turn(1, &mut agent, &mut pos);
        assert_eq!(pos.0, DVec2::new(110.0, 100.0));
        assert_eq!(bench.env.item_count(), 0);
        assert_eq!(bench.env.marker_count(MarkerPurpose::Indication), 0);

        bench.observe(&[(1, pos.0, &agent)]);
        bench.turn(1, &mut agent, &mut pos);
        let markers: Vec<Marker> = bench.env.markers().map(|(_, m)| *m).collect();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].purpose, MarkerPurpose::Indication);
        assert_eq!(markers[0].position, DVec2::new(110.0, 100.0));
        assert_eq!(markers[0].heading(), Some(robot_state(&agent).heading));
        assert_eq!(robot_state(&agent).counter, 7);
    }

    #[test]
    fn test_slow_zones_halve_speed_and_count_steps() {
        let mut bench = bench();
        bench.rules.robots.heading_change_probability = 0.0;
        bench.env = std::mem::take(&mut bench.env).with_slow_zones(vec![
            SlowZone { center: DVec2::new(100.0, 100.0), radius: 30.0 },
            SlowZone { center: DVec2::new(110.0, 100.0), radius: 30.0 },
        ]);
        let (mut agent, mut pos) = robot_at(&mut bench, &Robot::new(16.0, 32.0, 0.0), DVec2::new(100.0, 100.0));

        bench.turn(1, &mut agent, &mut pos);
        assert!((pos.0 - DVec2::new(104.0, 100.0)).length() < 1e-9);
        assert_eq!(robot_state(&agent).last_speed, 4.0);
        assert_eq!(bench.tally.slow_zone_steps, 2);
    }

    #[test]
    fn test_hazard_marker_dropped_when_leaving_slow_zone() {
        let mut bench = bench();
        bench.rules.robots.heading_change_probability = 0.0;
        let mut robot = Robot::new(15.0, 30.0, 0.0);
        robot.last_speed = 7.5;
        let (mut agent, mut pos) = robot_at(&mut bench, &robot, DVec2::new(200.0, 200.0));

        bench.turn(1, &mut agent, &mut pos);
        assert_eq!(bench.env.marker_count(MarkerPurpose::Hazard), 1);
        let (_, hazard) = bench.env.markers().next().unwrap();
        assert_eq!(hazard.position, DVec2::new(200.0, 200.0));
        assert_eq!(robot_state(&agent).last_speed, 15.0);
        assert_eq!(robot_state(&agent).counter, 7);
    }

    #[test]
    fn test_hazard_marker_reverses_heading() {
        let mut bench = bench();
        bench.rules.robots.heading_change_probability = 0.0;
        bench.env.add_marker(Marker::hazard(DVec2::new(120.0, 100.0)));
        let (mut agent, mut pos) = robot_at(&mut bench, &Robot::new(10.0, 30.0, 1.0), DVec2::new(100.0, 100.0));

        bench.turn(1, &mut agent, &mut pos);
        assert!((pos.0 - DVec2::new(110.0, 100.0)).length() < 1e-9);
        assert!((robot_state(&agent).heading - PI).abs() < 1e-9);
    }

    #[test]
    fn test_markers_ignored_during_cool_down() {
        let mut bench = bench();
        bench.rules.robots.heading_change_probability = 0.0;
        bench.env.add_marker(Marker::hazard(DVec2::new(100.0, 120.0)));
        let mut robot = Robot::new(10.0, 30.0, 0.0);
        robot.counter = 3;
        let (mut agent, mut pos) = robot_at(&mut bench, &robot, DVec2::new(100.0, 100.0));

        bench.turn(1, &mut agent, &mut pos);
        assert!((pos.0 - DVec2::new(110.0, 100.0)).length() < 1e-9);
        assert_eq!(robot_state(&agent).counter, 2);
    }

    #[test]
    fn test_marker_consumed_on_arrival() {
        let mut bench = bench();
        bench.rules.robots.heading_change_probability = 0.0;
        bench.env.add_marker(Marker::indication(DVec2::new(50.0, 50.0), 0.0));
        let (mut agent, mut pos) = robot_at(&mut bench, &Robot::new(10.0, 20.0, 0.0), DVec2::new(50.0, 50.0));

        bench.turn(1, &mut agent, &mut pos);
        assert_eq!(bench.env.markers().count(), 0);
    }

    #[test]
    fn test_blocked_robot_never_enters_obstacle() {
        let mut bench = bench();
        bench.env = std::mem::take(&mut bench.env).with_obstacles(vec![Obstacle {
            center: DVec2::new(130.0, 100.0),
            radius: 20.0,
        }]);
        let (mut agent, mut pos) = robot_at(&mut bench, &Robot::new(15.0, 30.0, 0.0), DVec2::new(100.0, 100.0));

        for _ in 0..20 {
            bench.observe(&[(1, pos.0, &agent)]);
            bench.turn(1, &mut agent, &mut pos);
            assert!(!bench.env.is_obstructed(pos.0));
            assert!(bench.space.contains(pos.0));
        }
    }

    #[test]
    fn test_keeps_clear_of_other_robots() {
        let mut bench = bench();
        bench.rules.robots.heading_change_probability = 0.0;
        let me = Agent::Robot(Robot::new(10.0, 40.0, 0.0));
        let other = Agent::Robot(Robot::new(10.0, 40.0, 0.0));
        bench.observe(&[(1, DVec2::new(100.0, 100.0), &me), (2, DVec2::new(115.0, 100.0), &other)]);

        let mut agent = me.clone();
        let mut pos = Position::new(100.0, 100.0);
        bench.turn(1, &mut agent, &mut pos);
        assert!(pos.0.distance(DVec2::new(115.0, 100.0)) > 10.0);
        assert!(pos.0 != DVec2::new(110.0, 100.0));
    }
}
