//! Price cache - memoized average acquisition cost per base resource
//!
//! Populated once per run, before model expansion, and read-only after.
//! A missing entry means the resource is unpriced, which is not the same
//! as a price of zero.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::catalog::{Catalog, Item};
use crate::core::error::{PlannerError, Result};
use crate::core::types::ItemId;

#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    prices: AHashMap<ItemId, f64>,
}

impl PriceCache {
    /// A cache with no priced resources
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cache from prices the caller already holds
    pub fn from_prices(prices: impl IntoIterator<Item = (ItemId, f64)>) -> Self {
        let mut cache = Self::default();
        for (id, price) in prices {
            cache.prices.entry(id).or_insert(price);
        }
        cache
    }

    /// Look up every resource once, in order
    pub fn populate(catalog: &dyn Catalog, items: &[Item], sample_size: u32) -> Result<Self> {
        let mut cache = Self::default();
        for (n, item) in items.iter().enumerate() {
            tracing::debug!("[{}/{}] pricing {}", n + 1, items.len(), item.name);
            if let Some(price) = lookup(catalog, item, sample_size)? {
                cache.prices.entry(item.id).or_insert(price);
            }
        }
        tracing::info!("Priced {} of {} resources", cache.len(), items.len());
        Ok(cache)
    }

    /// Look up resources on a pool of at most `jobs` threads
    ///
    /// Lookup order does not matter; the first failure aborts the run.
    pub fn populate_parallel(
        catalog: &dyn Catalog,
        items: &[Item],
        sample_size: u32,
        jobs: usize,
    ) -> Result<Self> {
        if jobs <= 1 {
            return Self::populate(catalog, items, sample_size);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| PlannerError::Config(format!("price lookup pool: {}", e)))?;

        let found: Vec<(ItemId, Option<f64>)> = pool.install(|| {
            items
                .par_iter()
                .map(|item| lookup(catalog, item, sample_size).map(|price| (item.id, price)))
                .collect::<Result<Vec<_>>>()
        })?;

        let cache = Self::from_prices(found.into_iter().filter_map(|(id, price)| price.map(|p| (id, p))));
        tracing::info!("Priced {} of {} resources on {} threads", cache.len(), items.len(), jobs);
        Ok(cache)
    }

    pub fn get(&self, id: ItemId) -> Option<f64> {
        self.prices.get(&id).copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.prices.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

fn lookup(catalog: &dyn Catalog, item: &Item, sample_size: u32) -> Result<Option<f64>> {
    let price = catalog
        .historical_price(item.id, sample_size, true)
        .map_err(|e| match e {
            PlannerError::PriceLookup { .. } => e,
            other => PlannerError::PriceLookup {
                item: item.id,
                reason: other.to_string(),
            },
        })?;

    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(PlannerError::PriceLookup {
            item: item.id,
            reason: format!("catalog returned invalid price {}", p),
        }),
        _ => Ok(price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    struct FailingCatalog;

    impl Catalog for FailingCatalog {
        fn items(&self) -> Result<Vec<Item>> {
            Ok(Vec::new())
        }

        fn historical_price(&self, _id: ItemId, _sample_size: u32, _historical: bool) -> Result<Option<f64>> {
            Err(PlannerError::Catalog("market unreachable".into()))
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_item(Item::new(ItemId(1), "free"), Some(0.0))
            .with_item(Item::new(ItemId(2), "pricey"), Some(3500.0))
            .with_item(Item::new(ItemId(3), "unsold"), None)
    }

    #[test]
    fn test_unpriced_distinct_from_zero() {
        let catalog = catalog();
        let items = catalog.items().unwrap();
        let cache = PriceCache::populate(&catalog, &items, 10).unwrap();

        assert_eq!(cache.get(ItemId(1)), Some(0.0));
        assert_eq!(cache.get(ItemId(2)), Some(3500.0));
        assert_eq!(cache.get(ItemId(3)), None);
        assert!(!cache.contains(ItemId(3)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let catalog = catalog();
        let items = catalog.items().unwrap();
        let sequential = PriceCache::populate(&catalog, &items, 10).unwrap();
        let parallel = PriceCache::populate_parallel(&catalog, &items, 10, 3).unwrap();

        for item in &items {
            assert_eq!(sequential.get(item.id), parallel.get(item.id));
        }
    }

    #[test]
    fn test_lookup_failure_is_fatal() {
        let items = vec![Item::new(ItemId(7), "anything")];
        let result = PriceCache::populate(&FailingCatalog, &items, 10);
        assert!(matches!(result, Err(PlannerError::PriceLookup { item: ItemId(7), .. })));

        let result = PriceCache::populate_parallel(&FailingCatalog, &items, 10, 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_first_price_wins() {
        let cache = PriceCache::from_prices([(ItemId(1), 5.0), (ItemId(1), 9.0)]);
        assert_eq!(cache.get(ItemId(1)), Some(5.0));
    }
}
