//! Catalog collaborator - enumeration and historical pricing
//!
//! The live catalog (login, per-item lookups, market history) sits behind
//! the `Catalog` trait. `StaticCatalog` is an in-memory snapshot that can
//! be loaded from TOML or JSON.

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::Item;
use crate::core::error::{PlannerError, Result};
use crate::core::types::ItemId;

/// Source of base resources and their market prices
pub trait Catalog: Send + Sync {
    /// Every base resource the catalog knows about
    fn items(&self) -> Result<Vec<Item>>;

    /// Average unit price over the last `sample_size` sales
    ///
    /// Returns `Ok(None)` when the resource has no market history. Errors
    /// are collaborator failures and abort the run.
    fn historical_price(&self, id: ItemId, sample_size: u32, historical: bool) -> Result<Option<f64>>;
}

/// In-memory catalog snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    items: Vec<Item>,
    /// Average unit prices keyed by item identity
    #[serde(default)]
    prices: AHashMap<ItemId, f64>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: Item, price: Option<f64>) -> Self {
        self.add(item, price);
        self
    }

    /// Add an item, optionally with a known average price
    pub fn add(&mut self, item: Item, price: Option<f64>) {
        if let Some(price) = price {
            self.prices.insert(item.id, price);
        }
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Load a snapshot, choosing the format by file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&content),
            Some("toml") => Self::parse_toml(&content),
            other => Err(PlannerError::Catalog(format!(
                "unsupported catalog format {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    pub fn parse_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        snapshot.into_catalog()
    }

    pub fn parse_toml(content: &str) -> Result<Self> {
        let snapshot: Snapshot = toml::from_str(content)?;
        snapshot.into_catalog()
    }
}

impl Catalog for StaticCatalog {
    fn items(&self) -> Result<Vec<Item>> {
        Ok(self.items.clone())
    }

    fn historical_price(&self, id: ItemId, _sample_size: u32, _historical: bool) -> Result<Option<f64>> {
        Ok(self.prices.get(&id).copied())
    }
}

/// File representation: prices sit next to each item
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    items: Vec<SnapshotItem>,
}

#[derive(Debug, Deserialize)]
struct SnapshotItem {
    #[serde(flatten)]
    item: Item,
    #[serde(default)]
    price: Option<f64>,
}

impl Snapshot {
    fn into_catalog(self) -> Result<StaticCatalog> {
        let mut catalog = StaticCatalog::new();
        let mut seen = ahash::AHashSet::new();
        for entry in self.items {
            if !seen.insert(entry.item.id) {
                return Err(PlannerError::Catalog(format!(
                    "duplicate item identity {} ({})",
                    entry.item.id, entry.item.name
                )));
            }
            if let Some(price) = entry.price {
                if !price.is_finite() || price < 0.0 {
                    return Err(PlannerError::Catalog(format!(
                        "invalid price {} for {}",
                        price, entry.item.name
                    )));
                }
            }
            catalog.add(entry.item, entry.price);
        }
        Ok(catalog)
    }
}
