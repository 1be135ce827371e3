//! Diet plan - the extracted solver result and its economics

use crate::core::config::RunParameters;
use crate::core::types::ItemId;
use crate::diet::consumable::{Consumable, ConsumableKey};
use crate::diet::model::DietModel;
use crate::diet::prices::PriceCache;

/// A consumable selected with a positive quantity
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub consumable: Consumable,
    pub quantity: u32,
}

impl PlanEntry {
    /// Turns this entry adds to the horizon
    pub fn adventures(&self) -> f64 {
        self.consumable.adventures() * self.quantity as f64
    }

    pub fn unit_price(&self, prices: &PriceCache) -> Option<f64> {
        self.consumable.price(prices)
    }

    /// Acquisition cost, zero when unpriced
    pub fn cost(&self, prices: &PriceCache) -> f64 {
        self.unit_price(prices).unwrap_or(0.0) * self.quantity as f64
    }

    /// Objective contribution, net of acquisition cost
    pub fn profit(&self, prices: &PriceCache, params: &RunParameters) -> f64 {
        self.consumable.profit(self.quantity as f64, prices, params)
    }
}

#[derive(Debug, Clone)]
pub struct DietPlan {
    entries: Vec<PlanEntry>,
    values: Vec<f64>,
    objective: f64,
}

impl DietPlan {
    /// Round solver output and keep consumables with positive quantity
    pub fn extract(model: &DietModel, solution: &[f64]) -> Self {
        let values: Vec<f64> = (0..model.variable_count())
            .map(|var| solution.get(var).copied().unwrap_or(0.0).round().max(0.0))
            .collect();

        let entries = model
            .consumables()
            .iter()
            .zip(&values)
            .filter(|(_, q)| **q > 0.0)
            .map(|(consumable, &q)| PlanEntry {
                consumable: consumable.clone(),
                quantity: q as u32,
            })
            .collect();

        let objective = model.objective().evaluate(&values);
        Self {
            entries,
            values,
            objective,
        }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Integer quantity of every model variable, in model order
    pub fn assignment(&self) -> &[f64] {
        &self.values
    }

    /// Achieved objective, including the banked baseline
    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn quantity_of(&self, key: &ConsumableKey) -> u32 {
        self.entries
            .iter()
            .find(|e| &e.consumable.key() == key)
            .map_or(0, |e| e.quantity)
    }

    /// Quantity of a base resource summed over its variants
    pub fn quantity_of_item(&self, id: ItemId) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.consumable.item().map_or(false, |i| i.id == id))
            .map(|e| e.quantity)
            .sum()
    }

    pub fn total_adventures(&self) -> f64 {
        self.entries.iter().map(PlanEntry::adventures).sum()
    }

    pub fn total_cost(&self, prices: &PriceCache) -> f64 {
        self.entries.iter().map(|e| e.cost(prices)).sum()
    }

    /// Objective before subtracting acquisition cost
    pub fn gross_profit(&self, prices: &PriceCache) -> f64 {
        self.objective + self.total_cost(prices)
    }

    pub fn net_profit(&self) -> f64 {
        self.objective
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;
    use crate::diet::registry::OrganRegistry;

    #[test]
    fn test_extract_rounds_and_filters() {
        let mut a = Item::new(ItemId(1), "a");
        a.fullness = Some(1);
        a.adventures = Some(4.0);
        let mut b = Item::new(ItemId(2), "b");
        b.fullness = Some(1);
        b.adventures = Some(2.0);

        let prices = PriceCache::from_prices([(ItemId(1), 50.0), (ItemId(2), 10.0)]);
        let params = RunParameters {
            starting_turns: 1,
            meat_per_turn: 100.0,
            ..RunParameters::default()
        };
        let model = DietModel::build(&[a, b], &OrganRegistry::new(), &prices, &params);
        let plan = DietPlan::extract(&model, &[2.9999999, 1e-9]);

        assert_eq!(plan.entries().len(), 1);
        assert_eq!(plan.quantity_of_item(ItemId(1)), 3);
        assert_eq!(plan.quantity_of_item(ItemId(2)), 0);
        assert_eq!(plan.total_adventures(), 12.0);
        assert_eq!(plan.total_cost(&prices), 150.0);
        // 100 banked + 3 * (400 - 50)
        assert_eq!(plan.net_profit(), 1150.0);
        assert_eq!(plan.gross_profit(&prices), 1300.0);
    }
}
