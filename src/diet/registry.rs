//! Organ registry - static tables that route resources into the model
//!
//! Cleaners, purchase limits, amplifiers and note bonuses are plain data.
//! `with_defaults()` carries the tables used against the live game; any of
//! them can be replaced from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{Effect, Item};
use crate::core::error::{PlannerError, Result};
use crate::core::types::{ItemId, Organ};

/// Reference to a base resource by identity or by case-insensitive name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Id(ItemId),
    Name(String),
}

impl ItemRef {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ItemRef::Id(id) => item.id == *id,
            ItemRef::Name(name) => item.name_matches(name),
        }
    }
}

impl From<&str> for ItemRef {
    fn from(name: &str) -> Self {
        ItemRef::Name(name.to_string())
    }
}

impl From<ItemId> for ItemRef {
    fn from(id: ItemId) -> Self {
        ItemRef::Id(id)
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRef::Id(id) => write!(f, "{}", id),
            ItemRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A resource whose consumption frees capacity in an organ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganCleaner {
    pub organ: Organ,
    pub item: ItemRef,
    /// Capacity freed per unit consumed
    pub amount: u32,
}

/// Maximum quantity of a resource across all its variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLimit {
    pub item: ItemRef,
    pub limit: u32,
}

/// Yield factor applied when the notes carry a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteFactor {
    pub note: String,
    pub factor: f64,
}

/// An amplifier usable with resources occupying one organ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplifierRule {
    pub organ: Organ,
    pub item: ItemRef,
    pub factor: f64,
    /// Overrides `factor` when the paired resource's notes match
    #[serde(default)]
    pub conditional: Option<NoteFactor>,
}

impl AmplifierRule {
    /// Yield multiplier for a given base resource
    pub fn factor_for(&self, item: &Item) -> f64 {
        match &self.conditional {
            Some(cond) if item.has_note(&cond.note) => cond.factor,
            _ => self.factor,
        }
    }
}

/// Flat yield added to resources whose notes carry a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteBonus {
    pub note: String,
    pub adventures: f64,
}

/// Explicit per-organ capacity, overriding any backing resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceOverride {
    pub stomach: Option<u32>,
    pub liver: Option<u32>,
    pub spleen: Option<u32>,
}

impl SpaceOverride {
    pub fn get(&self, organ: Organ) -> Option<u32> {
        match organ {
            Organ::Stomach => self.stomach,
            Organ::Liver => self.liver,
            Organ::Spleen => self.spleen,
        }
    }

    pub fn set(&mut self, organ: Organ, space: u32) {
        match organ {
            Organ::Stomach => self.stomach = Some(space),
            Organ::Liver => self.liver = Some(space),
            Organ::Spleen => self.spleen = Some(space),
        }
    }
}

/// A bonus source with no purchasable backing resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSource {
    pub name: String,
    #[serde(default)]
    pub effect: Option<Effect>,
    #[serde(default)]
    pub effect_duration: f64,
    /// Capacity overrides; organs not listed cost nothing
    #[serde(default)]
    pub space: SpaceOverride,
}

fn default_excluded_note() -> Option<String> {
    Some("Vampyre".to_string())
}

/// Static routing tables for the diet model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganRegistry {
    #[serde(default)]
    pub cleaners: Vec<OrganCleaner>,
    #[serde(default)]
    pub limits: Vec<PurchaseLimit>,
    #[serde(default)]
    pub amplifiers: Vec<AmplifierRule>,
    #[serde(default)]
    pub note_bonuses: Vec<NoteBonus>,
    /// Notes tag that excludes a resource by policy
    #[serde(default = "default_excluded_note")]
    pub excluded_note: Option<String>,
    /// Resources always modeled regardless of organ thresholds
    #[serde(default)]
    pub allow: Vec<ItemRef>,
    #[serde(default)]
    pub synthetics: Vec<SyntheticSource>,
}

impl Default for OrganRegistry {
    fn default() -> Self {
        Self {
            cleaners: Vec::new(),
            limits: Vec::new(),
            amplifiers: Vec::new(),
            note_bonuses: Vec::new(),
            excluded_note: default_excluded_note(),
            allow: Vec::new(),
            synthetics: Vec::new(),
        }
    }
}

impl OrganRegistry {
    /// Empty registry: no cleaners, limits or amplifiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables used against the live game
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let cleaners: [(Organ, &str, u32); 17] = [
            (Organ::Spleen, "extra-greasy slider", 5),
            (Organ::Spleen, "jar of fermented pickle juice", 5),
            (Organ::Spleen, "mojo filter", 1),
            (Organ::Liver, "Alien plant pod", 3),
            (Organ::Liver, "cuppa Sobrie tea", 1),
            (Organ::Liver, "Mr. Burnsger", 2),
            (Organ::Liver, "spice melange", 3),
            (Organ::Liver, "The Plumber's mushroom stew", 1),
            (Organ::Liver, "Ultra Mega Sour Ball", 3),
            (Organ::Stomach, "alien animal milk", 3),
            (Organ::Stomach, "Cuppa Voraci tea", 1),
            (Organ::Stomach, "Doc Clock's thyme cocktail", 2),
            (Organ::Stomach, "lupine appetite hormones", 3),
            (Organ::Stomach, "spice melange", 3),
            (Organ::Stomach, "sweet tooth", 1),
            (Organ::Stomach, "The Mad Liquor", 1),
            (Organ::Stomach, "Ultra Mega Sour Ball", 3),
        ];
        for (organ, name, amount) in cleaners {
            registry.add_cleaner(organ, name, amount);
        }

        let limits: [(&str, u32); 13] = [
            ("alien animal milk", 1),
            ("alien plant pod", 1),
            ("cuppa Sobrie tea", 1),
            ("cuppa Voraci tea", 1),
            ("Doc Clock's thyme cocktail", 2),
            ("lupine appetite hormones", 1),
            ("mojo filter", 3),
            ("Mr. Burnsger", 2),
            ("spice melange", 1),
            ("sweet tooth", 1),
            ("The Mad Liquor", 1),
            ("The Plumber's mushroom stew", 1),
            ("ultra mega sour ball", 1),
        ];
        for (name, limit) in limits {
            registry.add_limit(name, limit);
        }

        registry.amplifiers.push(AmplifierRule {
            organ: Organ::Stomach,
            item: "Ol' Scratch's salad fork".into(),
            factor: 1.3,
            conditional: Some(NoteFactor {
                note: "SALAD".into(),
                factor: 1.5,
            }),
        });
        registry.amplifiers.push(AmplifierRule {
            organ: Organ::Liver,
            item: "Frosty's frosty mug".into(),
            factor: 1.3,
            conditional: None,
        });

        registry.note_bonuses.push(NoteBonus {
            note: "MARTINI".into(),
            adventures: 2.0,
        });

        registry
    }

    pub fn add_cleaner(&mut self, organ: Organ, item: impl Into<ItemRef>, amount: u32) {
        self.cleaners.push(OrganCleaner {
            organ,
            item: item.into(),
            amount,
        });
    }

    pub fn add_limit(&mut self, item: impl Into<ItemRef>, limit: u32) {
        self.limits.push(PurchaseLimit {
            item: item.into(),
            limit,
        });
    }

    /// Load a registry from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a registry from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let registry: OrganRegistry = toml::from_str(content)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Check the tables for entries the model cannot express
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for rule in &self.amplifiers {
            if !rule.organ.is_amplifiable() {
                errors.push(format!("amplifier {} targets {}, which takes no amplifier", rule.item, rule.organ));
            }
            let factors = std::iter::once(rule.factor).chain(rule.conditional.as_ref().map(|c| c.factor));
            for factor in factors {
                if !factor.is_finite() || factor <= 0.0 {
                    errors.push(format!("amplifier {} has invalid factor {}", rule.item, factor));
                }
            }
        }

        for bonus in &self.note_bonuses {
            if bonus.note.is_empty() {
                errors.push("note bonus with empty tag".to_string());
            }
        }

        let mut names = ahash::AHashSet::new();
        for synthetic in &self.synthetics {
            if synthetic.name.is_empty() {
                errors.push("synthetic consumable with empty name".to_string());
            }
            if !names.insert(synthetic.name.as_str()) {
                errors.push(format!("duplicate synthetic consumable {}", synthetic.name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PlannerError::Config(errors.join(", ")))
        }
    }

    /// Whether the registry names this resource in any table
    pub fn is_enumerated(&self, item: &Item) -> bool {
        self.cleaners.iter().any(|c| c.item.matches(item))
            || self.limits.iter().any(|l| l.item.matches(item))
            || self.amplifiers.iter().any(|a| a.item.matches(item))
            || self.allow.iter().any(|r| r.matches(item))
    }

    pub fn cleaners_for(&self, organ: Organ) -> impl Iterator<Item = &OrganCleaner> {
        self.cleaners.iter().filter(move |c| c.organ == organ)
    }

    pub fn amplifiers_for(&self, organ: Organ) -> impl Iterator<Item = &AmplifierRule> {
        self.amplifiers.iter().filter(move |a| a.organ == organ)
    }

    /// Flat yield bonus from note tags
    pub fn note_bonus(&self, item: &Item) -> f64 {
        self.note_bonuses
            .iter()
            .filter(|b| item.has_note(&b.note))
            .map(|b| b.adventures)
            .sum()
    }

    pub fn is_excluded(&self, item: &Item) -> bool {
        self.excluded_note
            .as_deref()
            .map_or(false, |tag| item.has_note(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let registry = OrganRegistry::with_defaults();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.cleaners_for(Organ::Spleen).count(), 3);
        assert_eq!(registry.cleaners_for(Organ::Liver).count(), 6);
        assert_eq!(registry.cleaners_for(Organ::Stomach).count(), 8);
        assert_eq!(registry.limits.len(), 13);
    }

    #[test]
    fn test_limited_item_is_enumerated_by_name() {
        let registry = OrganRegistry::with_defaults();
        let item = Item::new(ItemId(9), "Ultra Mega Sour Ball");
        assert!(registry.is_enumerated(&item));
        let other = Item::new(ItemId(10), "hot dog");
        assert!(!registry.is_enumerated(&other));
    }

    #[test]
    fn test_conditional_factor() {
        let registry = OrganRegistry::with_defaults();
        let fork = registry.amplifiers_for(Organ::Stomach).next().unwrap();

        let mut salad = Item::new(ItemId(1), "Caesar salad");
        salad.notes = "SALAD".into();
        let steak = Item::new(ItemId(2), "steak");

        assert_eq!(fork.factor_for(&salad), 1.5);
        assert_eq!(fork.factor_for(&steak), 1.3);
    }

    #[test]
    fn test_parse_toml_with_ids_and_names() {
        let registry = OrganRegistry::parse_toml(
            r#"
            excluded_note = "Vampyre"

            [[cleaners]]
            organ = "spleen"
            item = 1455
            amount = 1

            [[limits]]
            item = "mojo filter"
            limit = 3

            [[amplifiers]]
            organ = "liver"
            item = "Frosty's frosty mug"
            factor = 1.3

            [[synthetics]]
            name = "Daily Affirmation"
            effect_duration = 20

            [synthetics.effect]
            id = 2001
            name = "Always Be Collecting"
            modifiers = { "Meat Drop" = 0.3 }

            [synthetics.space]
            spleen = 1
            "#,
        )
        .unwrap();

        assert_eq!(registry.cleaners[0].item, ItemRef::Id(ItemId(1455)));
        assert_eq!(registry.limits[0].item, ItemRef::Name("mojo filter".into()));
        assert_eq!(registry.synthetics[0].space.get(Organ::Spleen), Some(1));
        assert!(registry.note_bonuses.is_empty());
    }

    #[test]
    fn test_spleen_amplifier_rejected() {
        let result = OrganRegistry::parse_toml(
            r#"
            [[amplifiers]]
            organ = "spleen"
            item = "mojo filter"
            factor = 2.0
            "#,
        );
        assert!(matches!(result, Err(PlannerError::Config(_))));
    }

    #[test]
    fn test_note_bonus_and_exclusion() {
        let registry = OrganRegistry::with_defaults();
        let mut martini = Item::new(ItemId(5), "dry martini");
        martini.notes = "MARTINI, BOOZE".into();
        assert_eq!(registry.note_bonus(&martini), 2.0);

        let mut vamp = Item::new(ItemId(6), "blood bag");
        vamp.notes = "Vampyre".into();
        assert!(registry.is_excluded(&vamp));
        assert!(!registry.is_excluded(&martini));
    }
}
