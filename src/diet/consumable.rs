//! Consumable model - the unit the optimizer decides on
//!
//! A consumable is a base resource on its own, a base resource paired with
//! one amplifier, or a named synthetic bonus with no backing resource.
//! Identity comes from `ConsumableKey` only; two consumables with the same
//! key are the same decision variable whatever their other fields hold.

use std::hash::{Hash, Hasher};

use crate::catalog::{Effect, Item, Modifier};
use crate::core::config::RunParameters;
use crate::core::types::{ItemId, Organ};
use crate::diet::prices::PriceCache;
use crate::diet::registry::{AmplifierRule, OrganRegistry, SpaceOverride, SyntheticSource};

/// Tolerance applied before ceiling-rounding amplified yields
const CEIL_EPSILON: f64 = 1e-9;

/// Identity of a consumable in the model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConsumableKey {
    Item { item: ItemId, amplifier: Option<ItemId> },
    Synthetic(String),
}

impl std::fmt::Display for ConsumableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsumableKey::Item { item, amplifier: Some(amp) } => write!(f, "{}+{}", item.0, amp.0),
            ConsumableKey::Item { item, amplifier: None } => write!(f, "{}", item.0),
            ConsumableKey::Synthetic(name) => write!(f, "{}", name),
        }
    }
}

/// An amplifier item resolved against the catalog
#[derive(Debug, Clone)]
pub struct Amplifier {
    pub item: Item,
    pub rule: AmplifierRule,
}

#[derive(Debug, Clone)]
pub struct Consumable {
    item: Option<Item>,
    amplifier: Option<Amplifier>,
    name: Option<String>,
    effect: Option<Effect>,
    effect_duration: Option<f64>,
    space: SpaceOverride,
    note_bonus: f64,
}

impl Consumable {
    /// A base resource with no amplifier
    pub fn from_item(item: Item) -> Self {
        Self {
            item: Some(item),
            amplifier: None,
            name: None,
            effect: None,
            effect_duration: None,
            space: SpaceOverride::default(),
            note_bonus: 0.0,
        }
    }

    /// A named bonus source with no backing resource
    pub fn synthetic(source: &SyntheticSource) -> Self {
        Self {
            item: None,
            amplifier: None,
            name: Some(source.name.clone()),
            effect: source.effect.clone(),
            effect_duration: Some(source.effect_duration),
            space: source.space,
            note_bonus: 0.0,
        }
    }

    pub fn with_amplifier(mut self, amplifier: Amplifier) -> Self {
        self.amplifier = Some(amplifier);
        self
    }

    /// Flat yield added after any amplifier adjustment
    pub fn with_note_bonus(mut self, bonus: f64) -> Self {
        self.note_bonus = bonus;
        self
    }

    pub fn key(&self) -> ConsumableKey {
        match (&self.name, &self.item) {
            (Some(name), None) => ConsumableKey::Synthetic(name.clone()),
            (_, Some(item)) => ConsumableKey::Item {
                item: item.id,
                amplifier: self.amplifier.as_ref().map(|a| a.item.id),
            },
            (None, None) => ConsumableKey::Synthetic(String::new()),
        }
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn amplifier(&self) -> Option<&Amplifier> {
        self.amplifier.as_ref()
    }

    /// Capacity occupied in an organ
    pub fn space(&self, organ: Organ) -> u32 {
        if let Some(space) = self.space.get(organ) {
            return space;
        }
        self.item.as_ref().map_or(0, |item| item.space(organ))
    }

    pub fn effect(&self) -> Option<&Effect> {
        self.effect
            .as_ref()
            .or_else(|| self.item.as_ref().and_then(|item| item.effect.as_ref()))
    }

    /// Turns of effect per unit consumed
    pub fn effect_duration(&self) -> f64 {
        match (self.effect_duration, &self.item) {
            (Some(duration), _) => duration,
            (None, Some(item)) => item.effect_duration(),
            (None, None) => 0.0,
        }
    }

    /// Turns gained per unit consumed
    pub fn adventures(&self) -> f64 {
        let Some(item) = &self.item else {
            return 0.0;
        };

        let mut adventures = item.yield_value();
        if let Some(amplifier) = &self.amplifier {
            adventures = ceil_scaled(adventures, amplifier.rule.factor_for(item));
        }

        adventures + self.note_bonus
    }

    /// Acquisition cost per unit
    ///
    /// `None` when the backing resource or the amplifier is unpriced.
    /// Synthetic consumables cost nothing.
    pub fn price(&self, prices: &PriceCache) -> Option<f64> {
        let Some(item) = &self.item else {
            return Some(0.0);
        };

        let base = prices.get(item.id)?;
        match &self.amplifier {
            Some(amplifier) => prices.get(amplifier.item.id).map(|p| base + p),
            None => Some(base),
        }
    }

    /// Objective contribution of one unit
    ///
    /// Unpriced consumables contribute exactly zero, though they stay
    /// selectable for cleansing and limit rows.
    pub fn unit_profit(&self, prices: &PriceCache, params: &RunParameters) -> f64 {
        let Some(price) = self.price(prices) else {
            return 0.0;
        };

        let mut gain = self.adventures() * params.meat_per_turn - price;
        if let Some(effect) = self.effect() {
            gain += effect.modifier(&Modifier::MeatDrop)
                * params.base_meat
                * self.effect_duration()
                * params.combat_chance;
        }

        gain
    }

    pub fn profit(&self, quantity: f64, prices: &PriceCache, params: &RunParameters) -> f64 {
        quantity * self.unit_profit(prices, params)
    }
}

impl PartialEq for Consumable {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Consumable {}

impl Hash for Consumable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for Consumable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.item, &self.amplifier, &self.name) {
            (Some(item), Some(amplifier), _) => write!(f, "{} with {}", item.name, amplifier.item.name),
            (Some(item), None, _) => write!(f, "{}", item.name),
            (None, _, Some(name)) => write!(f, "{}", name),
            (None, _, None) => write!(f, "<unnamed>"),
        }
    }
}

fn ceil_scaled(value: f64, factor: f64) -> f64 {
    (value * factor - CEIL_EPSILON).ceil()
}

/// Turns base resources into consumable variants
///
/// Amplifier rules are resolved once against the modeled resources;
/// rules whose item is not present are dropped with a warning.
pub struct Expander<'a> {
    registry: &'a OrganRegistry,
    amplifiers: Vec<Amplifier>,
}

impl<'a> Expander<'a> {
    pub fn new(registry: &'a OrganRegistry, items: &[Item]) -> Self {
        let mut amplifiers = Vec::new();
        for rule in &registry.amplifiers {
            match items.iter().find(|item| rule.item.matches(item)) {
                Some(item) => amplifiers.push(Amplifier {
                    item: item.clone(),
                    rule: rule.clone(),
                }),
                None => tracing::warn!("Amplifier {} not in catalog, skipping", rule.item),
            }
        }
        Self { registry, amplifiers }
    }

    pub fn amplifiers(&self) -> &[Amplifier] {
        &self.amplifiers
    }

    /// All variants of a base resource
    ///
    /// Resources occupying an amplifiable organ get one variant per
    /// amplifier of the first such organ, then the plain variant.
    pub fn expand(&self, item: &Item) -> Vec<Consumable> {
        let note_bonus = self.registry.note_bonus(item);
        let plain = Consumable::from_item(item.clone()).with_note_bonus(note_bonus);

        let Some(organ) = Organ::AMPLIFIABLE.into_iter().find(|&o| item.occupies(o)) else {
            return vec![plain];
        };

        let mut variants: Vec<Consumable> = self
            .amplifiers
            .iter()
            .filter(|a| a.rule.organ == organ)
            .map(|a| {
                Consumable::from_item(item.clone())
                    .with_amplifier(a.clone())
                    .with_note_bonus(note_bonus)
            })
            .collect();
        variants.push(plain);
        variants
    }

    /// Synthetic consumables declared by the registry
    pub fn synthetics(&self) -> Vec<Consumable> {
        self.registry.synthetics.iter().map(Consumable::synthetic).collect()
    }
}
