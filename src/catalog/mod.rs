//! Catalog types - base resources and the bonus effects they grant
//!
//! These are owned by the catalog collaborator and only read by the
//! planner. Missing numeric attributes read as zero through the accessors.

pub mod source;

pub use source::{Catalog, StaticCatalog};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{EffectId, ItemId, Organ};

/// Kind of numeric modifier carried by an item or effect
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Modifier {
    MeatDrop,
    ItemDrop,
    FamiliarWeight,
    EffectDuration,
    Other(String),
}

impl Modifier {
    /// Modifiers that make an effect worth modeling even at low yield
    pub const VALUABLE: [Modifier; 3] = [Modifier::MeatDrop, Modifier::ItemDrop, Modifier::FamiliarWeight];

    pub fn as_str(&self) -> &str {
        match self {
            Modifier::MeatDrop => "Meat Drop",
            Modifier::ItemDrop => "Item Drop",
            Modifier::FamiliarWeight => "Familiar Weight",
            Modifier::EffectDuration => "Effect Duration",
            Modifier::Other(name) => name,
        }
    }
}

impl From<String> for Modifier {
    fn from(name: String) -> Self {
        match name.to_lowercase().replace(['_', '-'], " ").as_str() {
            "meat drop" => Modifier::MeatDrop,
            "item drop" => Modifier::ItemDrop,
            "familiar weight" => Modifier::FamiliarWeight,
            "effect duration" => Modifier::EffectDuration,
            _ => Modifier::Other(name),
        }
    }
}

impl From<Modifier> for String {
    fn from(modifier: Modifier) -> Self {
        modifier.as_str().to_string()
    }
}

/// A named, time-bounded bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub name: String,
    #[serde(default)]
    pub modifiers: AHashMap<Modifier, f64>,
}

impl Effect {
    pub fn new(id: EffectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            modifiers: AHashMap::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier, magnitude: f64) -> Self {
        self.modifiers.insert(modifier, magnitude);
        self
    }

    /// Magnitude of a modifier, zero when absent
    pub fn modifier(&self, modifier: &Modifier) -> f64 {
        self.modifiers.get(modifier).copied().unwrap_or(0.0)
    }

    pub fn has_any(&self, modifiers: &[Modifier]) -> bool {
        modifiers.iter().any(|m| self.modifiers.contains_key(m))
    }
}

/// A purchasable base resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub fullness: Option<u32>,
    #[serde(default)]
    pub inebriety: Option<u32>,
    #[serde(default)]
    pub spleen_hit: Option<u32>,
    /// Turns gained on consumption; `None` when the catalog lists no value
    #[serde(default)]
    pub adventures: Option<f64>,
    #[serde(default)]
    pub effect: Option<Effect>,
    /// `Some(false)` marks an explicitly untradeable resource
    #[serde(default)]
    pub tradeable: Option<bool>,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub modifiers: AHashMap<Modifier, f64>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fullness: None,
            inebriety: None,
            spleen_hit: None,
            adventures: None,
            effect: None,
            tradeable: None,
            is_virtual: false,
            notes: String::new(),
            modifiers: AHashMap::new(),
        }
    }

    /// Capacity this resource occupies in an organ
    pub fn space(&self, organ: Organ) -> u32 {
        let cost = match organ {
            Organ::Stomach => self.fullness,
            Organ::Liver => self.inebriety,
            Organ::Spleen => self.spleen_hit,
        };
        cost.unwrap_or(0)
    }

    pub fn occupies(&self, organ: Organ) -> bool {
        self.space(organ) > 0
    }

    /// Yield with a missing value read as zero
    pub fn yield_value(&self) -> f64 {
        self.adventures.unwrap_or(0.0)
    }

    /// Turns of effect granted per unit consumed
    pub fn effect_duration(&self) -> f64 {
        self.modifiers.get(&Modifier::EffectDuration).copied().unwrap_or(0.0)
    }

    pub fn has_note(&self, tag: &str) -> bool {
        self.notes.contains(tag)
    }

    pub fn is_untradeable(&self) -> bool {
        self.tradeable == Some(false)
    }

    /// Case-insensitive display name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
