//! Diet Planner - organ-constrained consumable optimization

pub mod catalog;
pub mod core;
pub mod diet;
