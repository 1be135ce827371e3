//! Diet model - the integer program, independent of any solver
//!
//! One non-negative integer variable per distinct consumable, a linear
//! objective, and `lhs <= rhs` rows for organ capacity, purchase limits and
//! effect-duration bounds. Rows are kept with both sides intact so they can
//! be evaluated against any assignment and dumped for inspection.

use std::collections::BTreeMap;
use std::io::Write;

use ahash::AHashMap;

use crate::catalog::Item;
use crate::core::config::RunParameters;
use crate::core::types::{EffectId, Organ};
use crate::diet::consumable::{Consumable, ConsumableKey, Expander};
use crate::diet::prices::PriceCache;
use crate::diet::registry::{ItemRef, OrganRegistry};

/// Slack allowed when checking rows against solver output
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Sum of `coefficient * variable` terms plus a constant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(usize, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Add to a variable's coefficient, merging repeated variables
    pub fn add_term(&mut self, var: usize, coefficient: f64) {
        if coefficient == 0.0 {
            return;
        }
        match self.terms.iter_mut().find(|(v, _)| *v == var) {
            Some((_, c)) => *c += coefficient,
            None => self.terms.push((var, coefficient)),
        }
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn terms(&self) -> &[(usize, f64)] {
        &self.terms
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    pub fn coefficient(&self, var: usize) -> f64 {
        self.terms
            .iter()
            .find(|(v, _)| *v == var)
            .map_or(0.0, |(_, c)| *c)
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, c)| c * values.get(var).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

/// What a constraint row enforces
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    OrganCapacity(Organ),
    PurchaseLimit(ItemRef),
    EffectDuration(EffectId),
}

/// A row `lhs <= rhs`
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub lhs: LinearExpr,
    pub rhs: LinearExpr,
}

impl Constraint {
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        self.lhs.evaluate(values) <= self.rhs.evaluate(values) + FEASIBILITY_TOLERANCE
    }

    /// Move every variable left and every constant right
    pub fn normalized(&self) -> (LinearExpr, f64) {
        let mut lhs = LinearExpr::new();
        for &(var, c) in self.lhs.terms() {
            lhs.add_term(var, c);
        }
        for &(var, c) in self.rhs.terms() {
            lhs.add_term(var, -c);
        }
        (lhs, self.rhs.constant_term() - self.lhs.constant_term())
    }
}

#[derive(Debug, Clone)]
pub struct DietModel {
    consumables: Vec<Consumable>,
    index: AHashMap<ConsumableKey, usize>,
    objective: LinearExpr,
    constraints: Vec<Constraint>,
}

impl DietModel {
    /// Expand filtered resources and synthetics, then build the program
    pub fn build(
        items: &[Item],
        registry: &OrganRegistry,
        prices: &PriceCache,
        params: &RunParameters,
    ) -> Self {
        let expander = Expander::new(registry, items);
        let mut consumables: Vec<Consumable> = items.iter().flat_map(|item| expander.expand(item)).collect();
        consumables.extend(expander.synthetics());
        Self::from_consumables(consumables, registry, prices, params)
    }

    /// Build the program over an explicit consumable list
    ///
    /// Consumables repeating an earlier key are dropped.
    pub fn from_consumables(
        consumables: Vec<Consumable>,
        registry: &OrganRegistry,
        prices: &PriceCache,
        params: &RunParameters,
    ) -> Self {
        let mut model = Self {
            consumables: Vec::with_capacity(consumables.len()),
            index: AHashMap::new(),
            objective: LinearExpr::new(),
            constraints: Vec::new(),
        };

        for consumable in consumables {
            let key = consumable.key();
            if model.index.contains_key(&key) {
                tracing::debug!("Skipping duplicate consumable {}", consumable);
                continue;
            }
            model.index.insert(key, model.consumables.len());
            model.consumables.push(consumable);
        }

        model.add_objective(prices, params);
        for organ in Organ::ALL {
            model.add_organ_constraint(organ, params.organ_limits.get(organ), registry);
        }
        model.add_limit_constraints(registry);
        model.add_duration_constraints(params);

        tracing::info!(
            "Built diet model: {} variables, {} constraints",
            model.consumables.len(),
            model.constraints.len()
        );
        model
    }

    fn add_objective(&mut self, prices: &PriceCache, params: &RunParameters) {
        let mut objective = LinearExpr::constant(params.baseline());
        for (var, consumable) in self.consumables.iter().enumerate() {
            objective.add_term(var, consumable.unit_profit(prices, params));
        }
        self.objective = objective;
    }

    /// Capacity used must not exceed the limit plus capacity freed by cleaners
    fn add_organ_constraint(&mut self, organ: Organ, limit: u32, registry: &OrganRegistry) {
        let mut lhs = LinearExpr::new();
        for (var, consumable) in self.consumables.iter().enumerate() {
            lhs.add_term(var, consumable.space(organ) as f64);
        }

        let mut rhs = LinearExpr::constant(limit as f64);
        for cleaner in registry.cleaners_for(organ) {
            for var in self.variants_of(&cleaner.item) {
                rhs.add_term(var, cleaner.amount as f64);
            }
        }

        self.constraints.push(Constraint {
            name: format!("{}_capacity", organ),
            kind: ConstraintKind::OrganCapacity(organ),
            lhs,
            rhs,
        });
    }

    /// Limits apply to a resource across all its variants
    fn add_limit_constraints(&mut self, registry: &OrganRegistry) {
        for limit in &registry.limits {
            let variants = self.variants_of(&limit.item);
            if variants.is_empty() {
                tracing::debug!("Limited resource {} not modeled", limit.item);
                continue;
            }

            let mut lhs = LinearExpr::new();
            for var in variants {
                lhs.add_term(var, 1.0);
            }
            self.constraints.push(Constraint {
                name: format!("limit_{}", self.constraints.len()),
                kind: ConstraintKind::PurchaseLimit(limit.item.clone()),
                lhs,
                rhs: LinearExpr::constant(limit.limit as f64),
            });
        }
    }

    /// Bound repeated effects by the turns available to use them
    ///
    /// For consumables sharing an effect with differing durations, total
    /// granted duration may exceed the horizon by at most one shortest
    /// duration minus one turn. The horizon grows with the yield of
    /// everything consumed.
    fn add_duration_constraints(&mut self, params: &RunParameters) {
        let mut groups: BTreeMap<EffectId, Vec<usize>> = BTreeMap::new();
        for (var, consumable) in self.consumables.iter().enumerate() {
            if let Some(effect) = consumable.effect() {
                groups.entry(effect.id).or_default().push(var);
            }
        }

        let mut total_turns = LinearExpr::constant(params.starting_turns as f64);
        for (var, consumable) in self.consumables.iter().enumerate() {
            total_turns.add_term(var, consumable.adventures());
        }

        for (effect, members) in groups {
            let durations: Vec<f64> = members
                .iter()
                .map(|&var| self.consumables[var].effect_duration())
                .collect();
            let unit = durations.iter().copied().fold(f64::INFINITY, f64::min);
            let longest = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            // Variants of one food share a duration and need no row
            if members.len() < 2 || longest - unit <= FEASIBILITY_TOLERANCE {
                continue;
            }

            let mut lhs = LinearExpr::new();
            for &var in &members {
                lhs.add_term(var, self.consumables[var].effect_duration());
            }

            let mut rhs = total_turns.clone();
            rhs.add_constant(unit - 1.0);

            tracing::debug!("Effect {} shared by {} consumables, unit {}", effect, members.len(), unit);
            self.constraints.push(Constraint {
                name: format!("duration_{}", effect.0),
                kind: ConstraintKind::EffectDuration(effect),
                lhs,
                rhs,
            });
        }
    }

    /// Variables backed by a resource, across every variant
    fn variants_of(&self, item: &ItemRef) -> Vec<usize> {
        self.consumables
            .iter()
            .enumerate()
            .filter(|(_, c)| c.item().map_or(false, |i| item.matches(i)))
            .map(|(var, _)| var)
            .collect()
    }

    pub fn consumables(&self) -> &[Consumable] {
        &self.consumables
    }

    pub fn variable_count(&self) -> usize {
        self.consumables.len()
    }

    pub fn index_of(&self, key: &ConsumableKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Rows violated by an assignment
    pub fn violations(&self, values: &[f64]) -> Vec<&Constraint> {
        self.constraints.iter().filter(|c| !c.is_satisfied(values)).collect()
    }

    pub fn variable_name(&self, var: usize) -> String {
        format!("x{}", var)
    }

    /// Write a plain-text LP dump of the program
    pub fn write_lp<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(
            out,
            "\\ Diet: {} variables, {} constraints",
            self.variable_count(),
            self.constraints.len()
        )?;
        writeln!(out, "Maximize")?;
        writeln!(
            out,
            " obj: {}",
            self.format_terms(self.objective.terms(), Some(self.objective.constant_term()))
        )?;

        writeln!(out, "Subject To")?;
        for constraint in &self.constraints {
            let (lhs, bound) = constraint.normalized();
            writeln!(out, " {}: {} <= {}", constraint.name, self.format_terms(lhs.terms(), None), bound)?;
        }

        writeln!(out, "Bounds")?;
        for var in 0..self.variable_count() {
            writeln!(out, " {} >= 0", self.variable_name(var))?;
        }

        writeln!(out, "Generals")?;
        for var in 0..self.variable_count() {
            writeln!(out, " {}", self.variable_name(var))?;
        }
        writeln!(out, "End")?;

        for (var, consumable) in self.consumables.iter().enumerate() {
            writeln!(out, "\\ {} = {}", self.variable_name(var), consumable)?;
        }
        Ok(())
    }

    fn format_terms(&self, terms: &[(usize, f64)], constant: Option<f64>) -> String {
        let mut parts: Vec<String> = terms
            .iter()
            .map(|&(var, c)| format!("{} {}", c, self.variable_name(var)))
            .collect();
        if let Some(c) = constant {
            parts.push(c.to_string());
        }
        if parts.is_empty() {
            return "0".to_string();
        }
        parts.join(" + ").replace("+ -", "- ")
    }
}
