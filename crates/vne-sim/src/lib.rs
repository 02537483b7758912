#![doc = include_str!("../README.md")]

pub mod config;
pub mod context;
pub mod events;
pub mod log;
pub mod metrics;
pub mod simulation;

pub use colored;

pub use config::{ConfigError, SimulationConfig};
pub use context::SimulationContext;
pub use events::TieBreak;
pub use metrics::{MetricsSummary, UtilizationSnapshot};
pub use simulation::VneSimulation;
