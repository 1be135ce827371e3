//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Stable catalog identity of a base resource
///
/// Display names are not unique across variants of the same text, so every
/// map keyed by a resource uses this instead of the name.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "#{}", _0)]
#[serde(transparent)]
pub struct ItemId(pub u32);

/// Stable catalog identity of an effect
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display(fmt = "effect #{}", _0)]
#[serde(transparent)]
pub struct EffectId(pub u32);

/// Independent capacity pools a consumable can occupy
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Organ {
    #[display(fmt = "stomach")]
    #[serde(alias = "fullness")]
    Stomach,
    #[display(fmt = "liver")]
    #[serde(alias = "inebriety")]
    Liver,
    #[display(fmt = "spleen")]
    #[serde(alias = "spleen_hit")]
    Spleen,
}

impl Organ {
    /// Every organ, in constraint order
    pub const ALL: [Organ; 3] = [Organ::Stomach, Organ::Liver, Organ::Spleen];

    /// Organs that accept an amplifier, in the order expansion checks them
    pub const AMPLIFIABLE: [Organ; 2] = [Organ::Stomach, Organ::Liver];

    pub fn is_amplifiable(&self) -> bool {
        Organ::AMPLIFIABLE.contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organ_aliases_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            organ: Organ,
        }

        let w: Wrapper = toml::from_str("organ = \"spleen_hit\"").unwrap();
        assert_eq!(w.organ, Organ::Spleen);
        let w: Wrapper = toml::from_str("organ = \"liver\"").unwrap();
        assert_eq!(w.organ, Organ::Liver);
    }

    #[test]
    fn test_only_stomach_and_liver_amplifiable() {
        assert!(Organ::Stomach.is_amplifiable());
        assert!(Organ::Liver.is_amplifiable());
        assert!(!Organ::Spleen.is_amplifiable());
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId(42).to_string(), "#42");
    }

    #[test]
    fn test_organ_display_names_capacity_rows() {
        assert_eq!(Organ::Stomach.to_string(), "stomach");
        assert_eq!(format!("{}_capacity", Organ::Spleen), "spleen_capacity");
    }
}
