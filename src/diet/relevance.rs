//! Relevance filter - prunes the catalog to resources worth modeling
//!
//! Each organ is judged independently: a resource can qualify through one
//! organ's threshold and fail another's.

use crate::catalog::{Item, Modifier};
use crate::core::config::RelevanceThresholds;
use crate::core::types::Organ;
use crate::diet::registry::OrganRegistry;

pub struct RelevanceFilter<'a> {
    registry: &'a OrganRegistry,
}

impl<'a> RelevanceFilter<'a> {
    pub fn new(registry: &'a OrganRegistry) -> Self {
        Self { registry }
    }

    /// Decide whether a resource belongs in the model
    ///
    /// Resources named by the registry are always relevant. Otherwise a
    /// target organ is required, and the resource must occupy it, list a
    /// yield, be tradeable, not be excluded by notes and not be virtual.
    /// It then qualifies on yield per capacity point or on a valuable
    /// effect modifier.
    pub fn is_relevant(&self, item: &Item, organ: Option<Organ>, threshold: f64) -> bool {
        if self.registry.is_enumerated(item) {
            return true;
        }

        let Some(organ) = organ else {
            return false;
        };

        let space = item.space(organ);
        let Some(adventures) = item.adventures else {
            return false;
        };
        if space == 0 || item.is_untradeable() {
            return false;
        }

        if self.registry.is_excluded(item) || item.is_virtual {
            return false;
        }

        if adventures / space as f64 >= threshold {
            return true;
        }

        item.effect
            .as_ref()
            .map_or(false, |effect| effect.has_any(&Modifier::VALUABLE))
    }

    /// Keep every resource relevant to at least one organ or to the registry
    pub fn select(&self, items: Vec<Item>, thresholds: &RelevanceThresholds) -> Vec<Item> {
        items
            .into_iter()
            .filter(|item| {
                Organ::ALL
                    .iter()
                    .any(|&organ| self.is_relevant(item, Some(organ), thresholds.get(organ)))
                    || self.is_relevant(item, None, RelevanceThresholds::DEFAULT)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Effect;
    use crate::core::types::{EffectId, ItemId};

    fn food(id: u32, fullness: u32, adventures: f64) -> Item {
        let mut item = Item::new(ItemId(id), format!("food {}", id));
        item.fullness = Some(fullness);
        item.adventures = Some(adventures);
        item.tradeable = Some(true);
        item
    }

    #[test]
    fn test_high_yield_food_relevant() {
        let registry = OrganRegistry::new();
        let filter = RelevanceFilter::new(&registry);
        let item = food(1, 2, 12.0);

        assert!(filter.is_relevant(&item, Some(Organ::Stomach), 5.0));
        // Does not occupy the liver
        assert!(!filter.is_relevant(&item, Some(Organ::Liver), 5.0));
        assert!(!filter.is_relevant(&item, None, 5.0));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let registry = OrganRegistry::new();
        let filter = RelevanceFilter::new(&registry);
        let item = food(1, 2, 10.0);

        assert!(filter.is_relevant(&item, Some(Organ::Stomach), 5.0));
        assert!(!filter.is_relevant(&item, Some(Organ::Stomach), 5.1));
    }

    #[test]
    fn test_lower_threshold_admits_marginal_spleen_item() {
        let registry = OrganRegistry::new();
        let filter = RelevanceFilter::new(&registry);
        let mut item = Item::new(ItemId(2), "spleen toy");
        item.spleen_hit = Some(4);
        item.adventures = Some(7.0);

        assert!(!filter.is_relevant(&item, Some(Organ::Spleen), 5.0));
        assert!(filter.is_relevant(&item, Some(Organ::Spleen), 1.5));
    }

    #[test]
    fn test_exclusions() {
        let registry = OrganRegistry::with_defaults();
        let filter = RelevanceFilter::new(&registry);

        let mut untradeable = food(1, 1, 10.0);
        untradeable.tradeable = Some(false);
        assert!(!filter.is_relevant(&untradeable, Some(Organ::Stomach), 5.0));

        let mut excluded = food(2, 1, 10.0);
        excluded.notes = "Vampyre only".into();
        assert!(!filter.is_relevant(&excluded, Some(Organ::Stomach), 5.0));

        let mut virtual_item = food(3, 1, 10.0);
        virtual_item.is_virtual = true;
        assert!(!filter.is_relevant(&virtual_item, Some(Organ::Stomach), 5.0));

        let mut no_yield = food(4, 1, 10.0);
        no_yield.adventures = None;
        assert!(!filter.is_relevant(&no_yield, Some(Organ::Stomach), 0.0));
    }

    #[test]
    fn test_valuable_effect_rescues_low_yield() {
        let registry = OrganRegistry::new();
        let filter = RelevanceFilter::new(&registry);

        let mut item = food(5, 4, 2.0);
        assert!(!filter.is_relevant(&item, Some(Organ::Stomach), 5.0));

        item.effect = Some(Effect::new(EffectId(1), "Fat Leon's").with_modifier(Modifier::ItemDrop, 0.3));
        assert!(filter.is_relevant(&item, Some(Organ::Stomach), 5.0));

        item.effect = Some(Effect::new(EffectId(2), "Strong").with_modifier(Modifier::Other("Muscle".into()), 10.0));
        assert!(!filter.is_relevant(&item, Some(Organ::Stomach), 5.0));
    }

    #[test]
    fn test_registry_items_always_relevant() {
        let registry = OrganRegistry::with_defaults();
        let filter = RelevanceFilter::new(&registry);

        let mut filter_item = Item::new(ItemId(3), "mojo filter");
        filter_item.tradeable = Some(false);
        assert!(filter.is_relevant(&filter_item, None, 5.0));
        assert!(filter.is_relevant(&filter_item, Some(Organ::Liver), 5.0));
    }

    #[test]
    fn test_select_combines_organs() {
        let registry = OrganRegistry::with_defaults();
        let filter = RelevanceFilter::new(&registry);

        let mut spleen = Item::new(ItemId(10), "spleen toy");
        spleen.spleen_hit = Some(2);
        spleen.adventures = Some(4.0);

        let items = vec![
            food(1, 1, 10.0),
            food(2, 5, 1.0),
            spleen,
            Item::new(ItemId(11), "mojo filter"),
            Item::new(ItemId(12), "seal tooth"),
        ];

        let selected: Vec<ItemId> = filter
            .select(items, &RelevanceThresholds::default())
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(selected, vec![ItemId(1), ItemId(10), ItemId(11)]);
    }
}
