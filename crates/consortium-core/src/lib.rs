pub mod category;
pub mod config;
pub mod error;
pub mod money;
pub mod types;

#[cfg(feature = "simulation")]
pub mod simulation;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "presentation")]
pub mod presentation;

pub use category::{Category, FeeSchedule, FeeTable};
pub use config::{BidPayablePolicy, ConfigOverrides, SimulationConfig, SimulationPolicy};
pub use error::ConsortiumError;
pub use types::*;

/// Standard result type for all consortium operations
pub type ConsortiumResult<T> = Result<T, ConsortiumError>;
