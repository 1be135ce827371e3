//! Solver seam - hands a `DietModel` to an integer-programming backend
//!
//! The backend is opaque: it returns optimal variable values or reports
//! that no solution exists. No partial results cross this boundary.

use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};

use crate::core::error::{PlannerError, Result};
use crate::diet::model::{DietModel, LinearExpr};

pub trait Solver {
    /// Optimal value of each model variable, in model order
    fn solve(&self, model: &DietModel) -> Result<Vec<f64>>;
}

/// Branch-and-bound over the pure-Rust `microlp` simplex
#[derive(Debug, Default, Clone, Copy)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for MicroLpSolver {
    fn solve(&self, model: &DietModel) -> Result<Vec<f64>> {
        if model.variable_count() == 0 {
            return solve_empty(model);
        }

        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = (0..model.variable_count())
            .map(|var| problem.add(variable().integer().min(0).name(model.variable_name(var))))
            .collect();

        let objective = to_expression(model.objective(), &vars);
        let mut program = problem.maximise(objective).using(good_lp::microlp);
        for row in model.constraints() {
            let (lhs, bound) = row.normalized();
            let lhs = to_expression(&lhs, &vars);
            program = program.with(constraint!(lhs <= bound));
        }

        let solution = program.solve().map_err(|e| match e {
            ResolutionError::Infeasible => PlannerError::NoFeasiblePlan("model is infeasible".into()),
            ResolutionError::Unbounded => PlannerError::NoFeasiblePlan("objective is unbounded".into()),
            other => PlannerError::NoFeasiblePlan(other.to_string()),
        })?;

        Ok(vars.iter().map(|&v| solution.value(v)).collect())
    }
}

/// A model with no variables is feasible iff every constant row holds
fn solve_empty(model: &DietModel) -> Result<Vec<f64>> {
    match model.violations(&[]).first() {
        Some(row) => Err(PlannerError::NoFeasiblePlan(format!("{} cannot hold", row.name))),
        None => Ok(Vec::new()),
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms().len());
    out += expr.constant_term();
    for &(var, coefficient) in expr.terms() {
        out += coefficient * vars[var];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;
    use crate::core::config::{OrganLimits, RunParameters};
    use crate::core::types::ItemId;
    use crate::diet::prices::PriceCache;
    use crate::diet::registry::OrganRegistry;

    fn params(limit: u32) -> RunParameters {
        RunParameters {
            starting_turns: 0,
            meat_per_turn: 100.0,
            organ_limits: OrganLimits::uniform(limit),
            ..RunParameters::default()
        }
    }

    #[test]
    fn test_fills_capacity_with_best_item() {
        let mut big = Item::new(ItemId(1), "big");
        big.fullness = Some(3);
        big.adventures = Some(18.0);
        let mut small = Item::new(ItemId(2), "small");
        small.fullness = Some(1);
        small.adventures = Some(5.0);

        let prices = PriceCache::from_prices([(ItemId(1), 0.0), (ItemId(2), 0.0)]);
        let model = DietModel::build(&[big, small], &OrganRegistry::new(), &prices, &params(7));
        let values = MicroLpSolver.solve(&model).unwrap();

        // Two big (36) plus one small (5) beats every other packing of 7
        assert_eq!(values[0].round(), 2.0);
        assert_eq!(values[1].round(), 1.0);
    }

    #[test]
    fn test_empty_model_solves() {
        let model = DietModel::build(&[], &OrganRegistry::new(), &PriceCache::empty(), &params(15));
        assert!(MicroLpSolver.solve(&model).unwrap().is_empty());
    }
}
