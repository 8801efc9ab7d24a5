//! ECS Systems
//!
//! The per-tick pipeline: snapshot capture, agent turns, removals, tick
//! bookkeeping, and metrics sampling.

pub mod metrics;
pub mod snapshot;
pub mod tick;
pub mod turns;

use bevy_ecs::prelude::*;

// Re-export commonly used systems
pub use metrics::{measure, sample_metrics, MetricsLog};
pub use snapshot::{capture_snapshot, Sensed, SnapshotEntry, WorldSnapshot};
pub use tick::{apply_removals, finish_tick, goal_reached};
pub use turns::run_agent_turns;

/// Build the schedule for one tick
///
/// Chaining inserts a command flush after `apply_removals`, so the
/// terminal check already sees despawned agents.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            capture_snapshot,
            run_agent_turns,
            apply_removals,
            finish_tick,
            sample_metrics,
        )
            .chain(),
    );
    schedule
}
