//! Run configuration with documented defaults
//!
//! Every number the planner needs from its caller lives here. Defaults
//! mirror a typical day: 200 banked turns, 15 points of capacity in each
//! organ and a farming payoff of 6500 per turn.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlannerError, Result};
use crate::core::types::Organ;
use crate::diet::registry::OrganRegistry;

/// Capacity available in each organ before any cleansing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganLimits {
    pub stomach: u32,
    pub liver: u32,
    pub spleen: u32,
}

impl OrganLimits {
    pub fn uniform(limit: u32) -> Self {
        Self { stomach: limit, liver: limit, spleen: limit }
    }

    pub fn get(&self, organ: Organ) -> u32 {
        match organ {
            Organ::Stomach => self.stomach,
            Organ::Liver => self.liver,
            Organ::Spleen => self.spleen,
        }
    }

    pub fn set(&mut self, organ: Organ, limit: u32) {
        match organ {
            Organ::Stomach => self.stomach = limit,
            Organ::Liver => self.liver = limit,
            Organ::Spleen => self.spleen = limit,
        }
    }
}

impl Default for OrganLimits {
    fn default() -> Self {
        Self::uniform(15)
    }
}

/// Economic parameters for a single optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParameters {
    /// Turns already banked before anything is consumed
    ///
    /// Contributes `starting_turns * meat_per_turn` to the objective and
    /// seeds the horizon used by the effect-duration bound.
    pub starting_turns: u32,

    /// Payoff per unit of yield (one adventure is worth this much)
    pub meat_per_turn: f64,

    /// Base payoff scaled by meat-drop modifiers on bonus effects
    pub base_meat: f64,

    /// Probability that a turn triggers the bonus effect
    ///
    /// Must lie in [0, 1]. At 0.7, seven turns in ten benefit from a
    /// meat-drop effect.
    pub combat_chance: f64,

    /// Per-organ capacity before cleansing
    pub organ_limits: OrganLimits,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            starting_turns: 200,
            meat_per_turn: 6500.0,
            base_meat: 250.0,
            combat_chance: 0.7,
            organ_limits: OrganLimits::default(),
        }
    }
}

impl RunParameters {
    /// Validate parameters for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !self.meat_per_turn.is_finite() || self.meat_per_turn < 0.0 {
            return Err(PlannerError::Config(format!(
                "meat_per_turn ({}) must be a non-negative number",
                self.meat_per_turn
            )));
        }

        if !self.base_meat.is_finite() || self.base_meat < 0.0 {
            return Err(PlannerError::Config(format!(
                "base_meat ({}) must be a non-negative number",
                self.base_meat
            )));
        }

        if !(0.0..=1.0).contains(&self.combat_chance) {
            return Err(PlannerError::Config(format!(
                "combat_chance ({}) must lie in [0, 1]",
                self.combat_chance
            )));
        }

        Ok(())
    }

    /// Value already banked before any purchase
    pub fn baseline(&self) -> f64 {
        self.starting_turns as f64 * self.meat_per_turn
    }
}

/// Minimum yield per capacity point for a resource to be modeled
///
/// Spleen items rarely yield much directly, so the default admits
/// marginal ones there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceThresholds {
    pub stomach: f64,
    pub liver: f64,
    pub spleen: f64,
}

impl RelevanceThresholds {
    pub const DEFAULT: f64 = 5.0;

    pub fn get(&self, organ: Organ) -> f64 {
        match organ {
            Organ::Stomach => self.stomach,
            Organ::Liver => self.liver,
            Organ::Spleen => self.spleen,
        }
    }
}

impl Default for RelevanceThresholds {
    fn default() -> Self {
        Self {
            stomach: Self::DEFAULT,
            liver: Self::DEFAULT,
            spleen: 1.5,
        }
    }
}

/// Number of recent sales averaged for each price lookup
pub const DEFAULT_PRICE_SAMPLE: u32 = 10;

fn default_price_sample() -> u32 {
    DEFAULT_PRICE_SAMPLE
}

/// Everything a planner run needs besides the catalog and the solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub run: RunParameters,

    #[serde(default)]
    pub thresholds: RelevanceThresholds,

    #[serde(default = "default_price_sample")]
    pub price_sample_size: u32,

    /// Worker threads used for price lookups; 1 keeps population sequential
    #[serde(default = "default_jobs")]
    pub price_jobs: usize,

    #[serde(default = "OrganRegistry::with_defaults")]
    pub registry: OrganRegistry,
}

fn default_jobs() -> usize {
    1
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            run: RunParameters::default(),
            thresholds: RelevanceThresholds::default(),
            price_sample_size: DEFAULT_PRICE_SAMPLE,
            price_jobs: default_jobs(),
            registry: OrganRegistry::with_defaults(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.run.validate()?;
        if self.price_sample_size == 0 {
            return Err(PlannerError::Config("price_sample_size must be positive".into()));
        }
        if self.price_jobs == 0 {
            return Err(PlannerError::Config("price_jobs must be positive".into()));
        }
        self.registry.validate()
    }
}
