//! Metrics System
//!
//! Samples named counters after every tick. Which counters exist depends
//! on the model running.

use bevy_ecs::prelude::*;
use sim_view::MetricsSample;

use crate::components::agent::{Agent, Team};
use crate::components::environment::{Environment, MarkerPurpose};
use crate::components::simulation::{ModelKind, SimulationState, Tally};

/// Resource: every sample taken so far, oldest first
#[derive(Resource, Debug, Clone, Default)]
pub struct MetricsLog {
    samples: Vec<MetricsSample>,
}

impl MetricsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: MetricsSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[MetricsSample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&MetricsSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

}

/// Compute the counters for the current world state
///
/// Villagers fall into exactly one of `humans`, `werewolves` (latent) and
/// `transformed_werewolves`.
pub fn measure<'a>(
    tick: u64,
    model: ModelKind,
    env: &Environment,
    tally: &Tally,
    agents: impl Iterator<Item = &'a Agent>,
) -> MetricsSample {
    let sample = MetricsSample::new(tick);
    match model {
        ModelKind::Village => {
            let mut population = 0usize;
            let mut humans = 0usize;
            let mut werewolves = 0usize;
            let mut transformed = 0usize;
            let mut clerics = 0usize;
            let mut hunters = 0usize;
            for agent in agents {
                match agent {
                    Agent::Villager(v) => {
                        population += 1;
                        match (v.lycanthrope, v.transformed) {
                            (false, _) => humans += 1,
                            (true, false) => werewolves += 1,
                            (true, true) => transformed += 1,
                        }
                    }
                    Agent::Cleric { .. } => clerics += 1,
                    Agent::Hunter { .. } => hunters += 1,
                    _ => {}
                }
            }
            sample
                .with("population", population as f64)
                .with("humans", humans as f64)
                .with("werewolves", werewolves as f64)
                .with("transformed_werewolves", transformed as f64)
                .with("clerics", clerics as f64)
                .with("hunters", hunters as f64)
        }
        ModelKind::Robots => {
            let remaining = env.item_count();
            let collected = tally.initial_items.saturating_sub(remaining);
            sample
                .with("items_remaining", remaining as f64)
                .with("items_collected", collected as f64)
                .with("hazard_markers", env.marker_count(MarkerPurpose::Hazard) as f64)
                .with("indication_markers", env.marker_count(MarkerPurpose::Indication) as f64)
                .with("slow_zone_steps", tally.slow_zone_steps as f64)
        }
        ModelKind::Barn => {
            let cows = agents.filter(|a| matches!(a, Agent::Cow(_))).count();
            sample
                .with("score_team_1", tally.team_score(Team::One) as f64)
                .with("score_team_2", tally.team_score(Team::Two) as f64)
                .with("remaining_cows", cows as f64)
        }
    }
}

/// System to record the post-tick sample
pub fn sample_metrics(
    state: Res<SimulationState>,
    model: Res<ModelKind>,
    env: Res<Environment>,
    tally: Res<Tally>,
    agents: Query<&Agent>,
    mut log: ResMut<MetricsLog>,
) {
    let sample = measure(state.tick(), *model, &env, &tally, agents.iter());
    log.push(sample);
}
