//! Static identifier tables: generation III species and item numbering,
//! per-generation bounds, transfer locations and non-transferable moves.

use crate::types::{Generation, Item, Move, Species};

// ── Per-generation bounds ────────────────────────────────────────────────────

/// Highest identifiers that exist in a generation's games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_species: u16,
    pub max_move:    u16,
    pub max_item:    u16,
    pub max_ability: u16,
    pub max_ball:    u8,
}

pub fn limits(generation: Generation) -> Limits {
    let (max_species, max_move, max_item, max_ability, max_ball) = match generation {
        Generation::III  => (386, 354, 376, 77, 12),
        Generation::IV   => (493, 467, 536, 123, 24),
        Generation::V    => (649, 559, 638, 164, 25),
        Generation::VI   => (721, 621, 775, 191, 25),
        Generation::VII  => (807, 728, 959, 233, 26),
        Generation::LGPE => (809, 742, 1057, 233, 26),
        Generation::VIII => (898, 826, 1607, 267, 26),
    };
    Limits { max_species, max_move, max_item, max_ability, max_ball }
}

/// Met location stamped on records arriving in `generation` by transfer.
pub fn transfer_location(generation: Generation) -> u16 {
    match generation {
        Generation::III  => 255,
        Generation::IV   => 55, // Pal Park
        Generation::V | Generation::VI | Generation::VII | Generation::LGPE => 30001,
        Generation::VIII => 30018,
    }
}

/// Friendship a transferred record starts with.
pub const TRANSFER_FRIENDSHIP: u8 = 70;

// ── Moves the transfer tools refuse ──────────────────────────────────────────

const CUT: u16 = 15;
const FLY: u16 = 19;
const SURF: u16 = 57;
const STRENGTH: u16 = 70;
const WATERFALL: u16 = 127;
const FLASH: u16 = 148;
const ROCK_SMASH: u16 = 249;
const WHIRLPOOL: u16 = 250;
const DIVE: u16 = 291;
const ROCK_CLIMB: u16 = 431;
const DEFOG: u16 = 432;

const HM_GEN3: &[u16] = &[CUT, FLY, SURF, STRENGTH, FLASH, ROCK_SMASH, WATERFALL, DIVE];
const HM_GEN4: &[u16] = &[CUT, FLY, SURF, STRENGTH, DEFOG, ROCK_SMASH, WATERFALL, ROCK_CLIMB, WHIRLPOOL];
const HM_GEN5: &[u16] = &[CUT, FLY, SURF, STRENGTH, WATERFALL, DIVE];

/// Moves that must be removed before a record may leave `source`.
pub fn transfer_deny_list(source: Generation) -> &'static [u16] {
    match source {
        Generation::III => HM_GEN3,
        Generation::IV  => HM_GEN4,
        Generation::V   => HM_GEN5,
        _ => &[],
    }
}

pub fn is_transfer_denied(source: Generation, mv: Move) -> bool {
    transfer_deny_list(source).contains(&mv.0)
}

// ── Generation III species numbering ────────────────────────────────────────

/// National dex numbers for internal indices 277..=411.
const G3_HOENN_TO_NATIONAL: [u16; 135] = [
    252, 253, 254, 255, 256, 257, 258, 259, 260, 261, 262, 263, 264, 265, 266, 267,
    268, 269, 270, 271, 272, 273, 274, 275, 290, 291, 292, 276, 277, 285, 286, 327,
    278, 279, 283, 284, 320, 321, 300, 301, 352, 343, 344, 299, 324, 302, 339, 340,
    370, 341, 342, 349, 350, 318, 319, 328, 329, 330, 296, 297, 309, 310, 322, 323,
    363, 364, 365, 331, 332, 361, 362, 337, 338, 298, 325, 326, 311, 312, 303, 307,
    308, 333, 334, 360, 355, 356, 315, 287, 288, 289, 316, 317, 357, 293, 294, 295,
    366, 367, 368, 359, 353, 354, 336, 335, 369, 304, 305, 306, 351, 313, 314, 345,
    346, 347, 348, 280, 281, 282, 371, 372, 373, 374, 375, 376, 377, 378, 379, 382,
    383, 384, 380, 381, 385, 386, 358,
];

const G3_HOENN_START: u16 = 277;

/// National dex number of a generation III internal species index.
/// Unused indices map to `Species::NONE`.
pub fn species_from_gen3(index: u16) -> Species {
    match index {
        0..=251 => Species(index),
        252..=276 => Species::NONE,
        i if i < G3_HOENN_START + G3_HOENN_TO_NATIONAL.len() as u16 => {
            Species(G3_HOENN_TO_NATIONAL[(i - G3_HOENN_START) as usize])
        }
        _ => Species::NONE,
    }
}

/// Generation III internal index of a national dex number, 0 when the
/// species did not exist in generation III.
pub fn species_to_gen3(species: Species) -> u16 {
    match species.0 {
        0..=251 => species.0,
        n => G3_HOENN_TO_NATIONAL
            .iter()
            .position(|&s| s == n)
            .map(|p| p as u16 + G3_HOENN_START)
            .unwrap_or(0),
    }
}

// ── Generation III item numbering ───────────────────────────────────────────

/// `(first gen3 id, last gen3 id, first gen4 id)` runs of items that
/// kept their relative order.
const G3_ITEM_RUNS: &[(u16, u16, u16)] = &[
    (1, 12, 1),       // balls
    (13, 38, 17),     // medicine
    (39, 43, 65),     // flutes
    (44, 45, 43),     // berry juice, sacred ash
    (46, 51, 70),     // shoal items, shards
    (63, 71, 45),     // vitamins, rare candy, pp up, zinc, pp max
    (73, 79, 55),     // battle items
    (80, 81, 63),     // poke doll, fluffy tail
    (83, 86, 76),     // repels, escape rope
    (93, 98, 80),     // evolution stones
    (103, 104, 86),   // mushrooms
    (106, 111, 88),   // valuables
    (121, 132, 137),  // mail
    (133, 167, 149),  // berries cheri..belue
    (168, 175, 201),  // berries liechi..enigma
    (179, 225, 213),  // held items
    (254, 258, 260),  // scarves
    (289, 338, 328),  // TM01..TM50
    (339, 346, 420),  // HM01..HM08
];

/// Generation IV item id of a generation III item; `Item::NONE` when the
/// item has no counterpart.
pub fn item_from_gen3(item: u16) -> Item {
    G3_ITEM_RUNS
        .iter()
        .find(|(first, last, _)| (*first..=*last).contains(&item))
        .map(|&(first, _, dest)| Item(dest + (item - first)))
        .unwrap_or(Item::NONE)
}

/// Generation III item id of a generation IV item, 0 when absent.
pub fn item_to_gen3(item: Item) -> u16 {
    G3_ITEM_RUNS
        .iter()
        .find(|(first, last, dest)| (*dest..=*dest + (last - first)).contains(&item.0))
        .map(|&(first, _, dest)| first + (item.0 - dest))
        .unwrap_or(0)
}

/// Item id valid in `generation`, or `Item::NONE`.
pub fn clamp_item(generation: Generation, item: Item) -> Item {
    if item.0 > limits(generation).max_item { Item::NONE } else { item }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen3_species_is_a_bijection() {
        let mut seen = [false; 387];
        for index in 277..=411 {
            let s = species_from_gen3(index);
            assert!((252..=386).contains(&s.0), "index {index} -> {}", s.0);
            assert!(!seen[s.0 as usize], "duplicate {}", s.0);
            seen[s.0 as usize] = true;
            assert_eq!(species_to_gen3(s), index);
        }
        assert!(seen[252..=386].iter().all(|&b| b));
    }

    #[test]
    fn test_gen3_species_examples() {
        assert_eq!(species_from_gen3(1), Species::BULBASAUR);
        assert_eq!(species_from_gen3(277), Species(252)); // Treecko
        assert_eq!(species_from_gen3(411), Species(358)); // Chimecho
        assert_eq!(species_from_gen3(260), Species::NONE);
        assert_eq!(species_to_gen3(Species(387)), 0);
    }

    #[test]
    fn test_gen3_items() {
        assert_eq!(item_from_gen3(4), Item(4));       // poke ball
        assert_eq!(item_from_gen3(13), Item(17));     // potion
        assert_eq!(item_from_gen3(200), Item(234));   // leftovers
        assert_eq!(item_from_gen3(339), Item(420));   // HM01
        assert_eq!(item_from_gen3(260), Item::NONE);  // key item
        assert_eq!(item_to_gen3(Item(234)), 200);
        assert_eq!(item_to_gen3(Item(500)), 0);
    }

    #[test]
    fn test_deny_lists() {
        assert!(is_transfer_denied(Generation::III, Move(57)));
        assert!(!is_transfer_denied(Generation::VI, Move(57)));
        assert!(is_transfer_denied(Generation::IV, Move(432)));
    }
}
