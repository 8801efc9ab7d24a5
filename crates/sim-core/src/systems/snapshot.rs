//! Snapshot System
//!
//! Captures every live agent at tick start into a uniform-grid spatial
//! index. All neighbour queries during the tick read this snapshot, so
//! an agent never sees a partially moved world.

use bevy_ecs::prelude::*;
use glam::DVec2;
use std::collections::HashMap;

use crate::components::agent::{Agent, AgentId, AgentKind, Position, Team};

/// Kind-specific data other agents may sense
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sensed {
    /// Infection state stays private to the villager
    Villager,
    Healer,
    Hunter,
    /// Robots keep a safety radius equal to their speed
    Robot { speed: f64 },
    Cow { weight: f64 },
    Dog { team: Team, weight: f64 },
}

impl Sensed {
    pub fn of(agent: &Agent) -> Self {
        match agent {
            Agent::Villager(_) => Sensed::Villager,
            Agent::Cleric { .. } => Sensed::Healer,
            Agent::Hunter { .. } => Sensed::Hunter,
            Agent::Robot(r) => Sensed::Robot { speed: r.speed },
            Agent::Cow(c) => Sensed::Cow { weight: c.weight },
            Agent::Dog(d) => Sensed::Dog {
                team: d.team,
                weight: d.weight,
            },
        }
    }
}

/// One agent as it was at tick start
#[derive(Debug, Clone, Copy)]
pub struct SnapshotEntry {
    pub id: AgentId,
    pub entity: Entity,
    pub position: DVec2,
    pub kind: AgentKind,
    pub sensed: Sensed,
}

/// Resource: tick-start spatial index over all live agents
#[derive(Resource, Debug, Clone)]
pub struct WorldSnapshot {
    cell_size: f64,
    /// Sorted by id
    entries: Vec<SnapshotEntry>,
    by_id: HashMap<AgentId, usize>,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl WorldSnapshot {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: if cell_size > 0.0 { cell_size } else { 1.0 },
            entries: Vec::new(),
            by_id: HashMap::new(),
            buckets: HashMap::new(),
        }
    }

    fn bucket_of(&self, p: DVec2) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    /// Replace the contents with a fresh capture
    pub fn rebuild(&mut self, mut entries: Vec<SnapshotEntry>) {
        entries.sort_by_key(|e| e.id);
        self.by_id.clear();
        self.buckets.clear();
        for (idx, entry) in entries.iter().enumerate() {
            self.by_id.insert(entry.id, idx);
            let bucket = self.bucket_of(entry.position);
            self.buckets.entry(bucket).or_default().push(idx);
        }
        self.entries = entries;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in id order
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// All ids in ascending order
    pub fn ids(&self) -> Vec<AgentId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn get(&self, id: AgentId) -> Option<&SnapshotEntry> {
        self.by_id.get(&id).map(|&idx| &self.entries[idx])
    }

    /// Indices of entries whose bucket overlaps the square around `center`
    fn candidates(&self, center: DVec2, reach: f64) -> Vec<usize> {
        if !reach.is_finite() {
            return (0..self.entries.len()).collect();
        }
        let lo = self.bucket_of(center - DVec2::splat(reach));
        let hi = self.bucket_of(center + DVec2::splat(reach));
        let span_x = hi.0.saturating_sub(lo.0).saturating_add(1);
        let span_y = hi.1.saturating_sub(lo.1).saturating_add(1);
        // Scanning every entry is cheaper than probing mostly empty buckets
        if span_x.saturating_mul(span_y) > self.buckets.len() as i64 {
            return (0..self.entries.len()).collect();
        }
        let mut out = Vec::new();
        for bx in lo.0..=hi.0 {
            for by in lo.1..=hi.1 {
                if let Some(bucket) = self.buckets.get(&(bx, by)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out
    }

    fn sorted_by_distance(&self, center: DVec2, mut hits: Vec<usize>) -> Vec<&SnapshotEntry> {
        hits.sort_by(|&a, &b| {
            let ea = &self.entries[a];
            let eb = &self.entries[b];
            ea.position
                .distance_squared(center)
                .total_cmp(&eb.position.distance_squared(center))
                .then(ea.id.cmp(&eb.id))
        });
        hits.into_iter().map(|idx| &self.entries[idx]).collect()
    }

    /// Agents within Euclidean `radius` of `center`, nearest first, ties by id
    pub fn neighbors(&self, center: DVec2, radius: f64) -> Vec<&SnapshotEntry> {
        let hits = self
            .candidates(center, radius)
            .into_iter()
            .filter(|&idx| self.entries[idx].position.distance(center) <= radius)
            .collect();
        self.sorted_by_distance(center, hits)
    }

    /// Agents inside the axis-aligned square `|dx|, |dy| <= half_extent`
    pub fn within_box(&self, center: DVec2, half_extent: f64) -> Vec<&SnapshotEntry> {
        let hits = self
            .candidates(center, half_extent)
            .into_iter()
            .filter(|&idx| {
                let d = self.entries[idx].position - center;
                d.x.abs() <= half_extent && d.y.abs() <= half_extent
            })
            .collect();
        self.sorted_by_distance(center, hits)
    }
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self::new(50.0)
    }
}

/// System to capture the tick-start snapshot
/// This runs first so every behaviour reads the same world
pub fn capture_snapshot(
    mut snapshot: ResMut<WorldSnapshot>,
    query: Query<(Entity, &AgentId, &Position, &Agent)>,
) {
    let entries = query
        .iter()
        .map(|(entity, id, position, agent)| SnapshotEntry {
            id: *id,
            entity,
            position: position.0,
            kind: agent.kind(),
            sensed: Sensed::of(agent),
        })
        .collect();
    snapshot.rebuild(entries);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::Villager;

    fn entry(world: &mut World, id: u64, x: f64, y: f64) -> SnapshotEntry {
        SnapshotEntry {
            id: AgentId(id),
            entity: world.spawn_empty().id(),
            position: DVec2::new(x, y),
            kind: AgentKind::Hunter,
            sensed: Sensed::Hunter,
        }
    }

    #[test]
    fn test_neighbors_ties_break_by_id() {
        let mut world = World::new();
        let mut snapshot = WorldSnapshot::new(10.0);
        snapshot.rebuild(vec![
            entry(&mut world, 9, 5.0, 0.0),
            entry(&mut world, 2, -5.0, 0.0),
            entry(&mut world, 4, 0.0, 3.0),
            entry(&mut world, 7, 0.0, 40.0),
        ]);

        let ids: Vec<AgentId> = snapshot
            .neighbors(DVec2::ZERO, 5.0)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![AgentId(4), AgentId(2), AgentId(9)]);
        assert_eq!(snapshot.ids(), vec![AgentId(2), AgentId(4), AgentId(7), AgentId(9)]);
    }

    #[test]
    fn test_bucketed_query_matches_brute_force() {
        let mut world = World::new();
        let mut small = WorldSnapshot::new(3.0);
        let mut huge = WorldSnapshot::new(10_000.0);
        let mut entries = Vec::new();
        for i in 0..40u64 {
            let x = ((i * 37) % 100) as f64;
            let y = ((i * 53) % 100) as f64;
            entries.push(entry(&mut world, i + 1, x, y));
        }
        small.rebuild(entries.clone());
        huge.rebuild(entries);

        for (cx, cy, r) in [(50.0, 50.0, 20.0), (0.0, 0.0, 35.0), (99.0, 10.0, 5.0)] {
            let a: Vec<AgentId> = small.neighbors(DVec2::new(cx, cy), r).iter().map(|e| e.id).collect();
            let b: Vec<AgentId> = huge.neighbors(DVec2::new(cx, cy), r).iter().map(|e| e.id).collect();
            assert_eq!(a, b);
        }

        let all = small.neighbors(DVec2::ZERO, f64::INFINITY);
        assert_eq!(all.len(), 40);
    }

    #[test]
    fn test_within_box_is_chebyshev() {
        let mut world = World::new();
        let mut snapshot = WorldSnapshot::new(4.0);
        snapshot.rebuild(vec![
            entry(&mut world, 1, 4.0, 4.0),
            entry(&mut world, 2, 5.0, 0.0),
            entry(&mut world, 3, -4.0, 0.0),
        ]);

        let ids: Vec<AgentId> = snapshot
            .within_box(DVec2::ZERO, 4.0)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![AgentId(3), AgentId(1)]);
    }

    #[test]
    fn test_capture_snapshot_system() {
        let mut world = World::new();
        world.insert_resource(WorldSnapshot::new(10.0));
        world.spawn((
            AgentId(5),
            Position::new(1.0, 2.0),
            Agent::Villager(Villager::werewolf(10.0)),
        ));
        world.spawn((AgentId(3), Position::new(8.0, 8.0), Agent::Hunter { speed: 10.0 }));

        let mut schedule = Schedule::default();
        schedule.add_systems(capture_snapshot);
        schedule.run(&mut world);

        let snapshot = world.resource::<WorldSnapshot>();
        assert_eq!(snapshot.ids(), vec![AgentId(3), AgentId(5)]);
        let villager = snapshot.get(AgentId(5)).unwrap();
        assert_eq!(villager.kind, AgentKind::Villager);
        assert_eq!(villager.sensed, Sensed::Villager);
        let hunter = snapshot.get(AgentId(3)).unwrap();
        assert_eq!(hunter.sensed, Sensed::Hunter);
    }
}
