//! Named ribbons and their per-generation bit positions.
//!
//! A ribbon is looked up by name in the table of the record's generation;
//! the same ribbon lives at different bits in different generations, so
//! conversion always copies ribbons by name.
//!
//! Generation III stores each contest category as a 3-bit tier count; the
//! four tiers of a category are exposed as separate named ribbons whose
//! value is `count > tier`.

use serde::{Deserialize, Serialize};

use crate::types::Generation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ribbon {
    // Hoenn contest tiers
    G3Cool, G3CoolSuper, G3CoolHyper, G3CoolMaster,
    G3Beauty, G3BeautySuper, G3BeautyHyper, G3BeautyMaster,
    G3Cute, G3CuteSuper, G3CuteHyper, G3CuteMaster,
    G3Smart, G3SmartSuper, G3SmartHyper, G3SmartMaster,
    G3Tough, G3ToughSuper, G3ToughHyper, G3ToughMaster,
    // Sinnoh contest tiers
    G4Cool, G4CoolGreat, G4CoolUltra, G4CoolMaster,
    G4Beauty, G4BeautyGreat, G4BeautyUltra, G4BeautyMaster,
    G4Cute, G4CuteGreat, G4CuteUltra, G4CuteMaster,
    G4Smart, G4SmartGreat, G4SmartUltra, G4SmartMaster,
    G4Tough, G4ToughGreat, G4ToughUltra, G4ToughMaster,

    ChampionG3,
    Winning,
    Victory,
    Artist,
    Effort,
    ChampionBattle,
    ChampionRegional,
    ChampionNational,
    Country,
    National,
    Earth,
    World,

    ChampionSinnoh,
    Ability,
    AbilityGreat,
    AbilityDouble,
    AbilityMulti,
    AbilityPair,
    AbilityWorld,
    Alert,
    Shock,
    Downcast,
    Careless,
    Relax,
    Snooze,
    Smile,
    Gorgeous,
    Royal,
    GorgeousRoyal,
    Footprint,
    Record,
    Event,
    Legend,
    ChampionWorld,
    Birthday,
    Special,
    Souvenir,
    Wishing,
    Classic,
    Premier,

    ChampionKalos,
    ChampionG6Hoenn,
    BestFriends,
    Training,
    BattlerSkillful,
    BattlerExpert,
    ContestStar,
    MasterCoolness,
    MasterBeauty,
    MasterCuteness,
    MasterCleverness,
    MasterToughness,
    /// Set while the contest memory count is nonzero.
    ContestMemory,
    /// Set while the battle memory count is nonzero.
    BattleMemory,

    ChampionAlola,
    BattleRoyale,
    BattleTreeGreat,
    BattleTreeMaster,

    ChampionGalar,
    TowerMaster,
    MasterRank,
}

/// Hoenn contest ribbons in (category, tier) order.
pub const G3_CONTEST: [Ribbon; 20] = [
    Ribbon::G3Cool, Ribbon::G3CoolSuper, Ribbon::G3CoolHyper, Ribbon::G3CoolMaster,
    Ribbon::G3Beauty, Ribbon::G3BeautySuper, Ribbon::G3BeautyHyper, Ribbon::G3BeautyMaster,
    Ribbon::G3Cute, Ribbon::G3CuteSuper, Ribbon::G3CuteHyper, Ribbon::G3CuteMaster,
    Ribbon::G3Smart, Ribbon::G3SmartSuper, Ribbon::G3SmartHyper, Ribbon::G3SmartMaster,
    Ribbon::G3Tough, Ribbon::G3ToughSuper, Ribbon::G3ToughHyper, Ribbon::G3ToughMaster,
];

/// Sinnoh contest ribbons in (category, tier) order.
pub const G4_CONTEST: [Ribbon; 20] = [
    Ribbon::G4Cool, Ribbon::G4CoolGreat, Ribbon::G4CoolUltra, Ribbon::G4CoolMaster,
    Ribbon::G4Beauty, Ribbon::G4BeautyGreat, Ribbon::G4BeautyUltra, Ribbon::G4BeautyMaster,
    Ribbon::G4Cute, Ribbon::G4CuteGreat, Ribbon::G4CuteUltra, Ribbon::G4CuteMaster,
    Ribbon::G4Smart, Ribbon::G4SmartGreat, Ribbon::G4SmartUltra, Ribbon::G4SmartMaster,
    Ribbon::G4Tough, Ribbon::G4ToughGreat, Ribbon::G4ToughUltra, Ribbon::G4ToughMaster,
];

/// Ribbons folded into the battle memory count from generation VI on.
pub const BATTLE_MEMORY: [Ribbon; 8] = [
    Ribbon::Winning,
    Ribbon::Victory,
    Ribbon::Ability,
    Ribbon::AbilityGreat,
    Ribbon::AbilityDouble,
    Ribbon::AbilityMulti,
    Ribbon::AbilityPair,
    Ribbon::AbilityWorld,
];

impl Ribbon {
    /// `(category, tier)` of a Hoenn contest ribbon.
    pub fn g3_contest_tier(self) -> Option<(usize, u8)> {
        G3_CONTEST
            .iter()
            .position(|&r| r == self)
            .map(|i| (i / 4, (i % 4) as u8))
    }
}

/// `(ribbon, byte offset, bit)`.
type Entry = (Ribbon, usize, u8);

// Boolean ribbons of generation III, inside the ribbon word at 0x4C.
// Bits 0..=14 hold the contest tier counts.
const G3: &[Entry] = &[
    (Ribbon::ChampionG3,       0x4D, 7),
    (Ribbon::Winning,          0x4E, 0),
    (Ribbon::Victory,          0x4E, 1),
    (Ribbon::Artist,           0x4E, 2),
    (Ribbon::Effort,           0x4E, 3),
    (Ribbon::ChampionBattle,   0x4E, 4),
    (Ribbon::ChampionRegional, 0x4E, 5),
    (Ribbon::ChampionNational, 0x4E, 6),
    (Ribbon::Country,          0x4E, 7),
    (Ribbon::National,         0x4F, 0),
    (Ribbon::Earth,            0x4F, 1),
    (Ribbon::World,            0x4F, 2),
];

// Generations IV and V share their layout.
const G45: &[Entry] = &[
    (Ribbon::ChampionSinnoh, 0x24, 0),
    (Ribbon::Ability,        0x24, 1),
    (Ribbon::AbilityGreat,   0x24, 2),
    (Ribbon::AbilityDouble,  0x24, 3),
    (Ribbon::AbilityMulti,   0x24, 4),
    (Ribbon::AbilityPair,    0x24, 5),
    (Ribbon::AbilityWorld,   0x24, 6),
    (Ribbon::Alert,          0x24, 7),
    (Ribbon::Shock,          0x25, 0),
    (Ribbon::Downcast,       0x25, 1),
    (Ribbon::Careless,       0x25, 2),
    (Ribbon::Relax,          0x25, 3),
    (Ribbon::Snooze,         0x25, 4),
    (Ribbon::Smile,          0x25, 5),
    (Ribbon::Gorgeous,       0x25, 6),
    (Ribbon::Royal,          0x25, 7),
    (Ribbon::GorgeousRoyal,  0x26, 0),
    (Ribbon::Footprint,      0x26, 1),
    (Ribbon::Record,         0x26, 2),
    (Ribbon::Event,          0x26, 3),
    (Ribbon::Legend,         0x26, 4),
    (Ribbon::ChampionWorld,  0x26, 5),
    (Ribbon::Birthday,       0x26, 6),
    (Ribbon::Special,        0x26, 7),
    (Ribbon::Souvenir,       0x27, 0),
    (Ribbon::Wishing,        0x27, 1),
    (Ribbon::Classic,        0x27, 2),
    (Ribbon::Premier,        0x27, 3),

    (Ribbon::G3Cool,         0x3C, 0),
    (Ribbon::G3CoolSuper,    0x3C, 1),
    (Ribbon::G3CoolHyper,    0x3C, 2),
    (Ribbon::G3CoolMaster,   0x3C, 3),
    (Ribbon::G3Beauty,       0x3C, 4),
    (Ribbon::G3BeautySuper,  0x3C, 5),
    (Ribbon::G3BeautyHyper,  0x3C, 6),
    (Ribbon::G3BeautyMaster, 0x3C, 7),
    (Ribbon::G3Cute,         0x3D, 0),
    (Ribbon::G3CuteSuper,    0x3D, 1),
    (Ribbon::G3CuteHyper,    0x3D, 2),
    (Ribbon::G3CuteMaster,   0x3D, 3),
    (Ribbon::G3Smart,        0x3D, 4),
    (Ribbon::G3SmartSuper,   0x3D, 5),
    (Ribbon::G3SmartHyper,   0x3D, 6),
    (Ribbon::G3SmartMaster,  0x3D, 7),
    (Ribbon::G3Tough,        0x3E, 0),
    (Ribbon::G3ToughSuper,   0x3E, 1),
    (Ribbon::G3ToughHyper,   0x3E, 2),
    (Ribbon::G3ToughMaster,  0x3E, 3),
    (Ribbon::ChampionG3,     0x3E, 4),
    (Ribbon::Winning,        0x3E, 5),
    (Ribbon::Victory,        0x3E, 6),
    (Ribbon::Artist,         0x3E, 7),
    (Ribbon::Effort,         0x3F, 0),
    (Ribbon::ChampionBattle, 0x3F, 1),
    (Ribbon::ChampionRegional, 0x3F, 2),
    (Ribbon::ChampionNational, 0x3F, 3),
    (Ribbon::Country,        0x3F, 4),
    (Ribbon::National,       0x3F, 5),
    (Ribbon::Earth,          0x3F, 6),
    (Ribbon::World,          0x3F, 7),

    (Ribbon::G4Cool,         0x60, 0),
    (Ribbon::G4CoolGreat,    0x60, 1),
    (Ribbon::G4CoolUltra,    0x60, 2),
    (Ribbon::G4CoolMaster,   0x60, 3),
    (Ribbon::G4Beauty,       0x60, 4),
    (Ribbon::G4BeautyGreat,  0x60, 5),
    (Ribbon::G4BeautyUltra,  0x60, 6),
    (Ribbon::G4BeautyMaster, 0x60, 7),
    (Ribbon::G4Cute,         0x61, 0),
    (Ribbon::G4CuteGreat,    0x61, 1),
    (Ribbon::G4CuteUltra,    0x61, 2),
    (Ribbon::G4CuteMaster,   0x61, 3),
    (Ribbon::G4Smart,        0x61, 4),
    (Ribbon::G4SmartGreat,   0x61, 5),
    (Ribbon::G4SmartUltra,   0x61, 6),
    (Ribbon::G4SmartMaster,  0x61, 7),
    (Ribbon::G4Tough,        0x62, 0),
    (Ribbon::G4ToughGreat,   0x62, 1),
    (Ribbon::G4ToughUltra,   0x62, 2),
    (Ribbon::G4ToughMaster,  0x62, 3),
];

/// `(ribbon, byte offset relative to the ribbon base, bit, first generation)`.
const G6_FAMILY: &[(Ribbon, usize, u8, u8)] = &[
    (Ribbon::ChampionKalos,    0, 0, 6),
    (Ribbon::ChampionG3,       0, 1, 6),
    (Ribbon::ChampionSinnoh,   0, 2, 6),
    (Ribbon::BestFriends,      0, 3, 6),
    (Ribbon::Training,         0, 4, 6),
    (Ribbon::BattlerSkillful,  0, 5, 6),
    (Ribbon::BattlerExpert,    0, 6, 6),
    (Ribbon::Effort,           0, 7, 6),
    (Ribbon::Alert,            1, 0, 6),
    (Ribbon::Shock,            1, 1, 6),
    (Ribbon::Downcast,         1, 2, 6),
    (Ribbon::Careless,         1, 3, 6),
    (Ribbon::Relax,            1, 4, 6),
    (Ribbon::Snooze,           1, 5, 6),
    (Ribbon::Smile,            1, 6, 6),
    (Ribbon::Gorgeous,         1, 7, 6),
    (Ribbon::Royal,            2, 0, 6),
    (Ribbon::GorgeousRoyal,    2, 1, 6),
    (Ribbon::Artist,           2, 2, 6),
    (Ribbon::Footprint,        2, 3, 6),
    (Ribbon::Record,           2, 4, 6),
    (Ribbon::Legend,           2, 5, 6),
    (Ribbon::Country,          2, 6, 6),
    (Ribbon::National,         2, 7, 6),
    (Ribbon::Earth,            3, 0, 6),
    (Ribbon::World,            3, 1, 6),
    (Ribbon::Classic,          3, 2, 6),
    (Ribbon::Premier,          3, 3, 6),
    (Ribbon::Event,            3, 4, 6),
    (Ribbon::Birthday,         3, 5, 6),
    (Ribbon::Special,          3, 6, 6),
    (Ribbon::Souvenir,         3, 7, 6),
    (Ribbon::Wishing,          4, 0, 6),
    (Ribbon::ChampionBattle,   4, 1, 6),
    (Ribbon::ChampionRegional, 4, 2, 6),
    (Ribbon::ChampionNational, 4, 3, 6),
    (Ribbon::ChampionWorld,    4, 4, 6),
    (Ribbon::ContestMemory,    4, 5, 6),
    (Ribbon::BattleMemory,     4, 6, 6),
    (Ribbon::ChampionG6Hoenn,  4, 7, 6),
    (Ribbon::ContestStar,      5, 0, 6),
    (Ribbon::MasterCoolness,   5, 1, 6),
    (Ribbon::MasterBeauty,     5, 2, 6),
    (Ribbon::MasterCuteness,   5, 3, 6),
    (Ribbon::MasterCleverness, 5, 4, 6),
    (Ribbon::MasterToughness,  5, 5, 6),
    (Ribbon::ChampionAlola,    5, 6, 7),
    (Ribbon::BattleRoyale,     5, 7, 7),
    (Ribbon::BattleTreeGreat,  6, 0, 7),
    (Ribbon::BattleTreeMaster, 6, 1, 7),
    (Ribbon::ChampionGalar,    6, 2, 8),
    (Ribbon::TowerMaster,      6, 3, 8),
    (Ribbon::MasterRank,       6, 4, 8),
];

/// Base offset of the ribbon bytes for the generation VI family.
fn g6_base(generation: Generation) -> Option<usize> {
    match generation {
        Generation::VI | Generation::VII => Some(0x30),
        Generation::VIII => Some(0x34),
        _ => None,
    }
}

/// Byte offset and bit of `ribbon` in a decrypted record of `generation`.
///
/// `None` when the generation has no such flag. Generation III contest
/// tiers are not flags and also report `None`.
pub fn ribbon_offset(generation: Generation, ribbon: Ribbon) -> Option<(usize, u8)> {
    let lookup = |table: &[Entry]| {
        table
            .iter()
            .find(|(r, _, _)| *r == ribbon)
            .map(|&(_, offset, bit)| (offset, bit))
    };
    match generation {
        Generation::III => lookup(G3),
        Generation::IV | Generation::V => lookup(G45),
        Generation::LGPE => None,
        _ => {
            let base = g6_base(generation)?;
            let number = generation.number();
            G6_FAMILY
                .iter()
                .find(|(r, _, _, first)| *r == ribbon && *first <= number)
                .map(|&(_, rel, bit, _)| (base + rel, bit))
        }
    }
}

/// Every ribbon that has a flag in `generation`.
pub fn ribbons_of(generation: Generation) -> Vec<Ribbon> {
    match generation {
        Generation::III => {
            let mut all: Vec<Ribbon> = G3_CONTEST.to_vec();
            all.extend(G3.iter().map(|e| e.0));
            all
        }
        Generation::IV | Generation::V => G45.iter().map(|e| e.0).collect(),
        Generation::LGPE => Vec::new(),
        _ => {
            let number = generation.number();
            G6_FAMILY
                .iter()
                .filter(|e| e.3 <= number)
                .map(|e| e.0)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effort_offsets_differ_by_generation() {
        assert_eq!(ribbon_offset(Generation::III, Ribbon::Effort), Some((0x4E, 3)));
        assert_eq!(ribbon_offset(Generation::IV, Ribbon::Effort), Some((0x3F, 0)));
        assert_eq!(ribbon_offset(Generation::VI, Ribbon::Effort), Some((0x30, 7)));
        assert_eq!(ribbon_offset(Generation::VIII, Ribbon::Effort), Some((0x34, 7)));
    }

    #[test]
    fn test_memory_flags_sit_beside_world_champion() {
        assert_eq!(ribbon_offset(Generation::VI, Ribbon::ContestMemory), Some((0x34, 5)));
        assert_eq!(ribbon_offset(Generation::VII, Ribbon::BattleMemory), Some((0x34, 6)));
        assert_eq!(ribbon_offset(Generation::VIII, Ribbon::ContestMemory), Some((0x38, 5)));
        assert_eq!(ribbon_offset(Generation::VIII, Ribbon::BattleMemory), Some((0x38, 6)));
        assert_eq!(ribbon_offset(Generation::V, Ribbon::ContestMemory), None);
    }

    #[test]
    fn test_generation_gated_ribbons() {
        assert_eq!(ribbon_offset(Generation::VI, Ribbon::ChampionAlola), None);
        assert_eq!(ribbon_offset(Generation::VII, Ribbon::ChampionAlola), Some((0x35, 6)));
        assert_eq!(ribbon_offset(Generation::VII, Ribbon::ChampionGalar), None);
        assert!(ribbons_of(Generation::LGPE).is_empty());
    }

    #[test]
    fn test_no_two_ribbons_share_a_bit() {
        for generation in Generation::ALL {
            let mut seen = std::collections::HashSet::new();
            for ribbon in ribbons_of(generation) {
                if let Some(pos) = ribbon_offset(generation, ribbon) {
                    assert!(seen.insert(pos), "{generation:?} {ribbon:?} collides at {pos:?}");
                }
            }
        }
    }

    #[test]
    fn test_contest_tier_lookup() {
        assert_eq!(Ribbon::G3BeautyHyper.g3_contest_tier(), Some((1, 2)));
        assert_eq!(Ribbon::Effort.g3_contest_tier(), None);
    }
}
