use thiserror::Error;

use crate::core::types::ItemId;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("No feasible plan: {0}")]
    NoFeasiblePlan(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Price lookup failed for {item}: {reason}")]
    PriceLookup { item: ItemId, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
