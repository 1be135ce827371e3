//! Planner pipeline - catalog to plan in one synchronous pass
//!
//! Catalog -> relevance filter -> price cache -> expansion and model ->
//! solver -> extraction. Any collaborator failure or an infeasible model
//! ends the run with an error.

use crate::catalog::{Catalog, Item};
use crate::core::config::PlannerConfig;
use crate::core::error::{PlannerError, Result};
use crate::diet::model::DietModel;
use crate::diet::plan::DietPlan;
use crate::diet::prices::PriceCache;
use crate::diet::relevance::RelevanceFilter;
use crate::diet::solver::Solver;

/// A built model together with the prices it was built from
#[derive(Debug, Clone)]
pub struct PreparedModel {
    pub items: Vec<Item>,
    pub prices: PriceCache,
    pub model: DietModel,
}

/// A solved run
#[derive(Debug, Clone)]
pub struct DietRun {
    pub prices: PriceCache,
    pub model: DietModel,
    pub plan: DietPlan,
}

pub struct DietPlanner {
    config: PlannerConfig,
}

impl DietPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Enumerate the catalog and keep relevant resources
    pub fn select(&self, catalog: &dyn Catalog) -> Result<Vec<Item>> {
        let all = catalog.items()?;
        let total = all.len();
        let filter = RelevanceFilter::new(&self.config.registry);
        let items = filter.select(all, &self.config.thresholds);
        tracing::info!("Selected {} of {} catalog resources", items.len(), total);
        Ok(items)
    }

    /// Filter, price and build the model without solving it
    pub fn prepare(&self, catalog: &dyn Catalog) -> Result<PreparedModel> {
        let items = self.select(catalog)?;
        let prices = PriceCache::populate_parallel(
            catalog,
            &items,
            self.config.price_sample_size,
            self.config.price_jobs,
        )?;
        let model = DietModel::build(&items, &self.config.registry, &prices, &self.config.run);
        Ok(PreparedModel { items, prices, model })
    }

    /// Solve a prepared model and extract the plan
    pub fn solve(&self, prepared: PreparedModel, solver: &dyn Solver) -> Result<DietRun> {
        let PreparedModel { prices, model, .. } = prepared;
        let solution = solver.solve(&model)?;
        if solution.len() != model.variable_count() {
            return Err(PlannerError::NoFeasiblePlan(format!(
                "solver returned {} values for {} variables",
                solution.len(),
                model.variable_count()
            )));
        }

        let plan = DietPlan::extract(&model, &solution);
        for row in model.violations(plan.assignment()) {
            tracing::warn!("Rounded plan violates {}", row.name);
        }
        tracing::info!(
            "Planned {} consumables, objective {:.0}",
            plan.entries().len(),
            plan.objective()
        );

        Ok(DietRun { prices, model, plan })
    }

    pub fn plan(&self, catalog: &dyn Catalog, solver: &dyn Solver) -> Result<DietRun> {
        let prepared = self.prepare(catalog)?;
        self.solve(prepared, solver)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::core::config::DEFAULT_PRICE_SAMPLE;
    use crate::core::types::ItemId;
    use crate::diet::registry::OrganRegistry;
    use crate::diet::solver::MicroLpSolver;

    struct BrokenCatalog;

    impl Catalog for BrokenCatalog {
        fn items(&self) -> Result<Vec<Item>> {
            Err(PlannerError::Catalog("login failed".into()))
        }

        fn historical_price(&self, _id: ItemId, _sample_size: u32, _historical: bool) -> Result<Option<f64>> {
            Ok(None)
        }
    }

    /// Serves fixed items and records every price lookup it receives
    struct RecordingCatalog {
        items: Vec<Item>,
        lookups: Mutex<Vec<(ItemId, u32, bool)>>,
    }

    impl Catalog for RecordingCatalog {
        fn items(&self) -> Result<Vec<Item>> {
            Ok(self.items.clone())
        }

        fn historical_price(&self, id: ItemId, sample_size: u32, historical: bool) -> Result<Option<f64>> {
            self.lookups.lock().unwrap().push((id, sample_size, historical));
            Ok(Some(50.0))
        }
    }

    #[test]
    fn test_prices_each_selected_item_once() {
        let mut hot_dog = Item::new(ItemId(1), "hot dog");
        hot_dog.fullness = Some(1);
        hot_dog.adventures = Some(8.0);
        let mut pie = Item::new(ItemId(2), "pie");
        pie.fullness = Some(2);
        pie.adventures = Some(12.0);
        let lint = Item::new(ItemId(3), "pocket lint");

        let catalog = RecordingCatalog {
            items: vec![hot_dog, pie, lint],
            lookups: Mutex::new(Vec::new()),
        };
        let config = PlannerConfig {
            registry: OrganRegistry::new(),
            ..PlannerConfig::default()
        };
        let prepared = DietPlanner::new(config).unwrap().prepare(&catalog).unwrap();
        assert_eq!(prepared.prices.len(), 2);

        let mut lookups = catalog.lookups.into_inner().unwrap();
        lookups.sort_by_key(|(id, _, _)| *id);
        assert_eq!(
            lookups,
            vec![
                (ItemId(1), DEFAULT_PRICE_SAMPLE, true),
                (ItemId(2), DEFAULT_PRICE_SAMPLE, true),
            ]
        );
        assert_eq!(DEFAULT_PRICE_SAMPLE, 10);
    }

    #[test]
    fn test_catalog_failure_propagates() {
        let planner = DietPlanner::new(PlannerConfig::default()).unwrap();
        let result = planner.plan(&BrokenCatalog, &MicroLpSolver);
        assert!(matches!(result, Err(PlannerError::Catalog(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PlannerConfig::default();
        config.run.combat_chance = -0.1;
        assert!(DietPlanner::new(config).is_err());
    }

    #[test]
    fn test_prepare_skips_irrelevant() {
        let mut food = Item::new(ItemId(1), "hot dog");
        food.fullness = Some(1);
        food.adventures = Some(8.0);
        let junk = Item::new(ItemId(2), "pocket lint");
        let catalog = StaticCatalog::new()
            .with_item(food, Some(10.0))
            .with_item(junk, Some(1.0));

        let config = PlannerConfig {
            registry: OrganRegistry::new(),
            ..PlannerConfig::default()
        };
        let prepared = DietPlanner::new(config).unwrap().prepare(&catalog).unwrap();
        assert_eq!(prepared.items.len(), 1);
        assert_eq!(prepared.prices.len(), 1);
        assert_eq!(prepared.model.variable_count(), 1);
    }
}
