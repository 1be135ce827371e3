//! Diet optimization - from catalog resources to an optimal consumption plan

pub mod consumable;
pub mod model;
pub mod plan;
pub mod planner;
pub mod prices;
pub mod registry;
pub mod relevance;
pub mod solver;

pub use consumable::{Amplifier, Consumable, ConsumableKey, Expander};
pub use model::{Constraint, ConstraintKind, DietModel, LinearExpr};
pub use plan::{DietPlan, PlanEntry};
pub use planner::{DietPlanner, DietRun, PreparedModel};
pub use prices::PriceCache;
pub use registry::{AmplifierRule, ItemRef, NoteBonus, NoteFactor, OrganCleaner, OrganRegistry, PurchaseLimit, SpaceOverride, SyntheticSource};
pub use relevance::RelevanceFilter;
pub use solver::{MicroLpSolver, Solver};
