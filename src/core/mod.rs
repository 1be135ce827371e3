pub mod config;
pub mod error;
pub mod types;

pub use config::{OrganLimits, PlannerConfig, RelevanceThresholds, RunParameters};
pub use error::{PlannerError, Result};
pub use types::{EffectId, ItemId, Organ};
