//! Read-only game data service.
//!
//! Records and the conversion pipeline never embed personal tables or
//! localized names; they query a [`GameData`] passed in by the caller.
//! [`StaticGameData`] is a JSON-backed implementation loaded once and
//! never mutated afterwards.
//!
//! ```json
//! {
//!   "personal": [
//!     { "generation": "IV", "species": 1, "form": 0,
//!       "base_stats": [45, 49, 49, 45, 65, 65], "abilities": [65, 65, 0],
//!       "gender_ratio": 31, "growth_rate": "MediumSlow" }
//!   ],
//!   "species_names": { "2": { "1": "Bulbasaur" } },
//!   "move_pp": { "33": 35 }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DataError;
use crate::exp::GrowthRate;
use crate::types::{Ability, Generation, Language, Move, Species};

/// Personal table row for one species form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    /// HP, Atk, Def, Spe, SpA, SpD.
    pub base_stats:   [u8; 6],
    /// Slot 0, slot 1, hidden slot. Unused slots hold 0.
    pub abilities:    [u16; 3],
    pub gender_ratio: u8,
    pub growth_rate:  GrowthRate,
}

impl PersonalInfo {
    pub fn ability(&self, slot: usize) -> Ability {
        Ability(self.abilities[slot.min(2)])
    }

    /// Slot holding `ability`, preferring the regular slots.
    pub fn ability_slot(&self, ability: Ability) -> Option<usize> {
        if ability == Ability::NONE {
            return None;
        }
        self.abilities.iter().position(|&a| a == ability.0)
    }
}

pub trait GameData {
    fn personal(&self, generation: Generation, species: Species, form: u8) -> Option<PersonalInfo>;

    fn species_name(&self, species: Species, language: Language) -> Option<String>;

    fn move_base_pp(&self, mv: Move) -> Option<u8>;
}

/// A data service that knows nothing. Conversions still succeed; derived
/// fields fall back to their raw or default values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoData;

impl GameData for NoData {
    fn personal(&self, _: Generation, _: Species, _: u8) -> Option<PersonalInfo> { None }
    fn species_name(&self, _: Species, _: Language) -> Option<String> { None }
    fn move_base_pp(&self, _: Move) -> Option<u8> { None }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalEntry {
    /// `None` applies to every generation without a more specific row.
    #[serde(default)]
    pub generation: Option<Generation>,
    pub species:    u16,
    #[serde(default)]
    pub form:       u8,
    #[serde(flatten)]
    pub info:       PersonalInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticGameData {
    #[serde(default)]
    pub personal:      Vec<PersonalEntry>,
    /// language code → species → name
    #[serde(default)]
    pub species_names: HashMap<u8, HashMap<u16, String>>,
    #[serde(default)]
    pub move_pp:       HashMap<u16, u8>,
}

impl StaticGameData {
    pub fn from_json(bytes: &[u8]) -> Result<Self, DataError> {
        let data: StaticGameData = serde_json::from_slice(bytes)?;
        debug!(
            personal = data.personal.len(),
            languages = data.species_names.len(),
            "loaded game data"
        );
        Ok(data)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        Self::from_json(&fs::read(path)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, DataError> {
        Ok(serde_json::to_vec(self)?)
    }

    fn find(&self, generation: Option<Generation>, species: Species, form: u8) -> Option<&PersonalEntry> {
        self.personal
            .iter()
            .find(|e| e.generation == generation && e.species == species.0 && e.form == form)
    }
}

impl GameData for StaticGameData {
    fn personal(&self, generation: Generation, species: Species, form: u8) -> Option<PersonalInfo> {
        self.find(Some(generation), species, form)
            .or_else(|| self.find(Some(generation), species, 0))
            .or_else(|| self.find(None, species, form))
            .or_else(|| self.find(None, species, 0))
            .map(|e| e.info.clone())
    }

    fn species_name(&self, species: Species, language: Language) -> Option<String> {
        self.species_names
            .get(&language.0)
            .and_then(|names| names.get(&species.0))
            .cloned()
    }

    fn move_base_pp(&self, mv: Move) -> Option<u8> {
        self.move_pp.get(&mv.0).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "personal": [
            { "generation": "IV", "species": 1, "form": 0,
              "base_stats": [45, 49, 49, 45, 65, 65], "abilities": [65, 65, 0],
              "gender_ratio": 31, "growth_rate": "MediumSlow" },
            { "species": 1,
              "base_stats": [45, 49, 49, 45, 65, 65], "abilities": [65, 65, 34],
              "gender_ratio": 31, "growth_rate": "MediumSlow" }
        ],
        "species_names": { "2": { "1": "Bulbasaur" } },
        "move_pp": { "33": 35 }
    }"#;

    #[test]
    fn test_lookup_prefers_specific_generation() {
        let data = StaticGameData::from_json(SAMPLE.as_bytes()).unwrap();
        let g4 = data.personal(Generation::IV, Species::BULBASAUR, 0).unwrap();
        assert_eq!(g4.abilities[2], 0);
        let g6 = data.personal(Generation::VI, Species::BULBASAUR, 0).unwrap();
        assert_eq!(g6.abilities[2], 34);
        assert_eq!(g6.ability_slot(Ability(34)), Some(2));
        assert!(data.personal(Generation::VI, Species(4), 0).is_none());
    }

    #[test]
    fn test_names_and_pp() {
        let data = StaticGameData::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.species_name(Species::BULBASAUR, Language::ENG).as_deref(), Some("Bulbasaur"));
        assert_eq!(data.species_name(Species::BULBASAUR, Language::JPN), None);
        assert_eq!(data.move_base_pp(Move(33)), Some(35));
    }

    #[test]
    fn test_json_roundtrip() {
        let data = StaticGameData::from_json(SAMPLE.as_bytes()).unwrap();
        let again = StaticGameData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(again.personal.len(), 2);
    }
}
