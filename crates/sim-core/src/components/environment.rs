//! Environment Components
//!
//! Static and semi-static non-agent state: obstacles, slow zones,
//! collectible items, markers, and goal zones.
//!
//! Items and markers live in arenas with stable ids. Removing one
//! tombstones its slot, which hides it from every later read at once;
//! the slots themselves are only dropped by `compact()` at tick end.

use bevy_ecs::prelude::*;
use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::components::agent::Team;
use crate::components::space::same_point;
use crate::error::{SimError, SimResult};

/// Stable id of an arena entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub u64);

#[derive(Debug, Clone)]
struct Slot<T> {
    id: FeatureId,
    value: T,
    live: bool,
}

/// Append-only storage with tombstoned removal
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    next_id: u64,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
            live: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> FeatureId {
        let id = FeatureId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            value,
            live: true,
        });
        self.live += 1;
        id
    }

    /// Tombstone an entry; false if it was already gone
    pub fn remove(&mut self, id: FeatureId) -> bool {
        // Slots stay sorted by id, so a binary search finds the entry
        let Ok(idx) = self.slots.binary_search_by_key(&id, |s| s.id) else {
            return false;
        };
        let slot = &mut self.slots[idx];
        if !slot.live {
            return false;
        }
        slot.live = false;
        self.live -= 1;
        true
    }

    pub fn get(&self, id: FeatureId) -> Option<&T> {
        self.slots
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|idx| &self.slots[idx])
            .filter(|s| s.live)
            .map(|s| &s.value)
    }

    /// Live entries in id order
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &T)> {
        self.slots.iter().filter(|s| s.live).map(|s| (s.id, &s.value))
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Drop tombstoned slots
    pub fn compact(&mut self) {
        self.slots.retain(|s| s.live);
    }

    /// Number of slots including tombstones
    pub fn capacity_used(&self) -> usize {
        self.slots.len()
    }
}

/// Impassable disc (or single cell on a grid, radius 0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: DVec2,
    pub radius: f64,
}

impl Obstacle {
    pub fn contains(&self, p: DVec2) -> bool {
        self.center.distance(p) <= self.radius
    }
}

/// Disc that halves the speed of agents inside it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlowZone {
    pub center: DVec2,
    pub radius: f64,
}

impl SlowZone {
    pub fn contains(&self, p: DVec2) -> bool {
        self.center.distance(p) <= self.radius
    }
}

/// Collectible item, removed when an agent reaches it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub position: DVec2,
}

/// What a marker tells the agents that find it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPurpose {
    /// Turn back
    Hazard,
    /// Keep searching roughly along the stored heading
    Indication,
}

/// Signal left in the environment by an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: DVec2,
    pub purpose: MarkerPurpose,
    heading: Option<f64>,
}

impl Marker {
    /// Indication markers require a heading; hazard markers ignore it
    pub fn new(position: DVec2, purpose: MarkerPurpose, heading: Option<f64>) -> SimResult<Self> {
        match (purpose, heading) {
            (MarkerPurpose::Indication, None) => Err(SimError::config(
                "indication marker requires a heading",
            )),
            (MarkerPurpose::Indication, Some(h)) => Ok(Self {
                position,
                purpose,
                heading: Some(h),
            }),
            (MarkerPurpose::Hazard, _) => Ok(Self {
                position,
                purpose,
                heading: None,
            }),
        }
    }

    pub fn hazard(position: DVec2) -> Self {
        Self {
            position,
            purpose: MarkerPurpose::Hazard,
            heading: None,
        }
    }

    pub fn indication(position: DVec2, heading: f64) -> Self {
        Self {
            position,
            purpose: MarkerPurpose::Indication,
            heading: Some(heading),
        }
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }
}

/// Inclusive rectangle of cells where a team scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalZone {
    pub team: Team,
    pub min: IVec2,
    pub max: IVec2,
}

impl GoalZone {
    /// Square of side `size` centred on `center`
    pub fn square(team: Team, center: IVec2, size: i32) -> Self {
        let half = size / 2;
        Self {
            team,
            min: center - IVec2::splat(half),
            max: center + IVec2::splat(half),
        }
    }

    pub fn center(&self) -> IVec2 {
        (self.min + self.max) / 2
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (self.min.x..=self.max.x).flat_map(move |x| (self.min.y..=self.max.y).map(move |y| IVec2::new(x, y)))
    }
}

/// Resource: everything in the world that is not an agent
#[derive(Resource, Debug, Clone, Default)]
pub struct Environment {
    obstacles: Vec<Obstacle>,
    slow_zones: Vec<SlowZone>,
    goal_zones: Vec<GoalZone>,
    items: Arena<Item>,
    markers: Arena<Marker>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_obstacles(mut self, obstacles: Vec<Obstacle>) -> Self {
        self.obstacles = obstacles;
        self
    }

    pub fn with_slow_zones(mut self, zones: Vec<SlowZone>) -> Self {
        self.slow_zones = zones;
        self
    }

    pub fn with_goal_zones(mut self, zones: Vec<GoalZone>) -> Self {
        self.goal_zones = zones;
        self
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn slow_zones(&self) -> &[SlowZone] {
        &self.slow_zones
    }

    pub fn goal_zones(&self) -> &[GoalZone] {
        &self.goal_zones
    }

    pub fn items(&self) -> impl Iterator<Item = (FeatureId, &Item)> {
        self.items.iter()
    }

    pub fn markers(&self) -> impl Iterator<Item = (FeatureId, &Marker)> {
        self.markers.iter()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn marker_count(&self, purpose: MarkerPurpose) -> usize {
        self.markers.iter().filter(|(_, m)| m.purpose == purpose).count()
    }

    pub fn add_item(&mut self, item: Item) -> FeatureId {
        self.items.insert(item)
    }

    pub fn remove_item(&mut self, id: FeatureId) -> bool {
        self.items.remove(id)
    }

    pub fn add_marker(&mut self, marker: Marker) -> FeatureId {
        self.markers.insert(marker)
    }

    /// Remove every marker within `tolerance` of `position` on both axes
    pub fn remove_markers_at(&mut self, position: DVec2, tolerance: f64) -> usize {
        let hits: Vec<FeatureId> = self
            .markers
            .iter()
            .filter(|(_, m)| {
                (m.position.x - position.x).abs() < tolerance
                    && (m.position.y - position.y).abs() < tolerance
            })
            .map(|(id, _)| id)
            .collect();
        for id in &hits {
            self.markers.remove(*id);
        }
        hits.len()
    }

    /// Items lying on `position`
    pub fn items_at(&self, position: DVec2) -> Vec<(FeatureId, Item)> {
        self.items
            .iter()
            .filter(|(_, item)| same_point(item.position, position))
            .map(|(id, item)| (id, *item))
            .collect()
    }

    /// Items within `radius`, nearest first, ties by id
    pub fn items_within(&self, position: DVec2, radius: f64) -> Vec<(FeatureId, Item)> {
        let mut found: Vec<(f64, FeatureId, Item)> = self
            .items
            .iter()
            .map(|(id, item)| (item.position.distance(position), id, *item))
            .filter(|(d, _, _)| *d <= radius)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(_, id, item)| (id, item)).collect()
    }

    /// Markers within `radius`, nearest first, ties by id
    pub fn markers_within(&self, position: DVec2, radius: f64) -> Vec<(FeatureId, Marker)> {
        let mut found: Vec<(f64, FeatureId, Marker)> = self
            .markers
            .iter()
            .map(|(id, m)| (m.position.distance(position), id, *m))
            .filter(|(d, _, _)| *d <= radius)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(_, id, m)| (id, m)).collect()
    }

    pub fn is_obstructed(&self, position: DVec2) -> bool {
        self.obstacles.iter().any(|o| o.contains(position))
    }

    pub fn obstacle_at_cell(&self, cell: IVec2) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.center.x == f64::from(cell.x) && o.center.y == f64::from(cell.y))
    }

    pub fn slow_zones_containing(&self, position: DVec2) -> usize {
        self.slow_zones.iter().filter(|z| z.contains(position)).count()
    }

    pub fn goal_zone_at(&self, cell: IVec2) -> Option<&GoalZone> {
        self.goal_zones.iter().find(|z| z.contains(cell))
    }

    pub fn goal_zone_of(&self, team: Team) -> Option<&GoalZone> {
        self.goal_zones.iter().find(|z| z.team == team)
    }

    /// Drop tombstoned items and markers
    pub fn compact(&mut self) {
        self.items.compact();
        self.markers.compact();
    }
}
