//! ECS Components
//!
//! Agent components and the world resources they act on.

pub mod agent;
pub mod environment;
pub mod simulation;
pub mod space;

pub use agent::*;
pub use environment::*;
pub use simulation::*;
pub use space::*;
