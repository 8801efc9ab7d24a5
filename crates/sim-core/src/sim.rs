//! Simulation Runner
//!
//! Owns one ECS world for one model and drives it tick by tick.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use sim_view::{MetricsSample, RunSummary, ViewSnapshot};

use crate::behaviors::Rules;
use crate::components::agent::{Agent, AgentId, IdAllocator, Position};
use crate::components::environment::Environment;
use crate::components::simulation::{ModelKind, SimulationState, Tally, Tombstones};
use crate::components::space::{Space, SpaceKind};
use crate::config::Config;
use crate::error::SimResult;
use crate::output::generate_view;
use crate::setup::{build_layout, get_spawn_summary, spawn_agents, Layout, SpawnSummary};
use crate::systems::{sample_metrics, tick_schedule, MetricsLog, WorldSnapshot};
use crate::SimRng;

/// A seeded, self-contained run of one model
pub struct Simulation {
    world: World,
    schedule: Schedule,
    model: ModelKind,
    seed: u64,
}

impl Simulation {
    /// Build the world for `model` from a validated configuration
    ///
    /// Every random draw, from layout to activation order, comes from one
    /// generator seeded with `config.simulation.seed`.
    pub fn new(config: &Config, model: ModelKind) -> SimResult<Self> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(config.simulation.seed);
        let layout = build_layout(model, config, &mut rng)?;
        Self::assemble(config, model, layout, rng)
    }

    /// Build a world from a hand-made layout instead of a random one
    pub fn with_layout(config: &Config, model: ModelKind, layout: Layout) -> SimResult<Self> {
        config.validate()?;
        let rng = SmallRng::seed_from_u64(config.simulation.seed);
        Self::assemble(config, model, layout, rng)
    }

    fn assemble(config: &Config, model: ModelKind, layout: Layout, rng: SmallRng) -> SimResult<Self> {
        let seed = config.simulation.seed;
        let space = layout.space;
        let initial_items = layout.environment.item_count();

        let mut world = World::new();
        let mut ids = IdAllocator::new();
        let initial_agents = spawn_agents(&mut world, &mut ids, &space, layout.agents)?;

        let cell_size = match space.kind {
            SpaceKind::Continuous => config.spatial.cell_size,
            SpaceKind::Grid => config.spatial.grid_cell_size,
        };

        world.insert_resource(space);
        world.insert_resource(layout.environment);
        world.insert_resource(Rules {
            village: config.village.clone(),
            robots: config.robots.clone(),
            barn: config.barn.clone(),
            empty_weight: layout.empty_weight,
        });
        world.insert_resource(model);
        world.insert_resource(SimulationState::new(config.simulation.max_ticks));
        world.insert_resource(Tally {
            initial_items,
            initial_agents,
            ..Tally::default()
        });
        world.insert_resource(Tombstones::new());
        world.insert_resource(WorldSnapshot::new(cell_size));
        world.insert_resource(MetricsLog::new());
        world.insert_resource(SimRng(rng));
        world.insert_resource(ids);

        // Tick 0 sample, before anyone moves
        let mut initial = Schedule::default();
        initial.add_systems(sample_metrics);
        initial.run(&mut world);

        tracing::info!(
            model = model.as_str(),
            seed,
            agents = initial_agents,
            items = initial_items,
            "simulation created"
        );

        Ok(Self {
            world,
            schedule: tick_schedule(),
            model,
            seed,
        })
    }

    /// Run one tick; returns false once the run has terminated
    pub fn step(&mut self) -> bool {
        if self.terminated() {
            return false;
        }
        self.schedule.run(&mut self.world);
        true
    }

    /// Step until termination, returning the number of ticks run
    pub fn run(&mut self) -> u64 {
        let start = self.tick();
        while self.step() {}
        self.tick() - start
    }

    pub fn tick(&self) -> u64 {
        self.world.resource::<SimulationState>().tick()
    }

    pub fn terminated(&self) -> bool {
        self.world.resource::<SimulationState>().terminated()
    }

    pub fn metrics(&self) -> &[MetricsSample] {
        self.world.resource::<MetricsLog>().samples()
    }

    pub fn latest_metrics(&self) -> Option<&MetricsSample> {
        self.world.resource::<MetricsLog>().latest()
    }

    pub fn view(&mut self) -> ViewSnapshot {
        generate_view(&mut self.world)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            model: self.model.as_str().to_string(),
            seed: self.seed,
            ticks_run: self.tick(),
            terminated: self.terminated(),
            final_counters: self
                .latest_metrics()
                .map(|sample| sample.counters.clone())
                .unwrap_or_default(),
        }
    }

    pub fn environment(&self) -> &Environment {
        self.world.resource::<Environment>()
    }

    pub fn tally(&self) -> &Tally {
        self.world.resource::<Tally>()
    }

    pub fn space(&self) -> Space {
        *self.world.resource::<Space>()
    }

    /// Every live agent, in id order
    pub fn agents(&mut self) -> Vec<(AgentId, Position, Agent)> {
        let mut query = self.world.query::<(&AgentId, &Position, &Agent)>();
        let mut agents: Vec<_> = query
            .iter(&self.world)
            .map(|(id, position, agent)| (*id, *position, agent.clone()))
            .collect();
        agents.sort_by_key(|(id, _, _)| *id);
        agents
    }

    /// Live agents counted by kind
    pub fn spawn_summary(&mut self) -> SpawnSummary {
        get_spawn_summary(&mut self.world)
    }
}
