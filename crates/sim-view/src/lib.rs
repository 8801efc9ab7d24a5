//! Shared view and reporting types for the field simulations.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is the contract between the simulation core and whatever renders
//! or records it: per-tick portrayals of agents and environment features,
//! and named metric counters.

pub mod metrics;
pub mod portrayal;
pub mod snapshot;

pub use metrics::{MetricsSample, RunSummary};
pub use portrayal::{Color, Portrayal, Shape};
pub use snapshot::{generate_view_id, ViewSnapshot};
