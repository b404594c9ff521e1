//! Closed value types shared by every record generation.
//!
//! Each identifier is an opaque integral code. `INVALID` is the single
//! sentinel for "not a value"; `NONE` is the in-game code for absence
//! where the games have one (an empty move slot, no held item).

use serde::{Deserialize, Serialize};

// ── Generation / mode ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Generation {
    III,
    IV,
    V,
    VI,
    VII,
    /// Let's Go Pikachu / Eevee.
    LGPE,
    VIII,
}

impl Generation {
    pub const ALL: [Generation; 7] = [
        Generation::III,
        Generation::IV,
        Generation::V,
        Generation::VI,
        Generation::VII,
        Generation::LGPE,
        Generation::VIII,
    ];

    pub fn box_size(self) -> usize {
        match self {
            Generation::III => 80,
            Generation::IV | Generation::V => 136,
            Generation::VI | Generation::VII | Generation::LGPE => 232,
            Generation::VIII => 328,
        }
    }

    pub fn party_size(self) -> usize {
        match self {
            Generation::III => 100,
            Generation::IV => 236,
            Generation::V => 220,
            Generation::VI | Generation::VII | Generation::LGPE => 260,
            Generation::VIII => 344,
        }
    }

    pub fn size(self, mode: RecordMode) -> usize {
        match mode {
            RecordMode::Box   => self.box_size(),
            RecordMode::Party => self.party_size(),
        }
    }

    /// Position in the transfer chain; LGPE sits beside VII, off the chain.
    pub fn number(self) -> u8 {
        match self {
            Generation::III  => 3,
            Generation::IV   => 4,
            Generation::V    => 5,
            Generation::VI   => 6,
            Generation::VII | Generation::LGPE => 7,
            Generation::VIII => 8,
        }
    }

    /// Next generation along the transfer chain.
    pub fn successor(self) -> Option<Generation> {
        match self {
            Generation::III  => Some(Generation::IV),
            Generation::IV   => Some(Generation::V),
            Generation::V    => Some(Generation::VI),
            Generation::VI   => Some(Generation::VII),
            Generation::VII  => Some(Generation::VIII),
            Generation::LGPE | Generation::VIII => None,
        }
    }

    pub fn predecessor(self) -> Option<Generation> {
        match self {
            Generation::IV   => Some(Generation::III),
            Generation::V    => Some(Generation::IV),
            Generation::VI   => Some(Generation::V),
            Generation::VII  => Some(Generation::VI),
            Generation::VIII => Some(Generation::VII),
            Generation::III | Generation::LGPE => None,
        }
    }

    /// Right shift applied to the shiny XOR (3 up to V, 4 from VI).
    pub fn shiny_shift(self) -> u32 {
        if self.number() <= 5 { 3 } else { 4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordMode {
    Box,
    Party,
}

impl RecordMode {
    /// Mode whose size for `generation` equals `len`.
    pub fn for_len(generation: Generation, len: usize) -> Option<RecordMode> {
        if len == generation.box_size() {
            Some(RecordMode::Box)
        } else if len == generation.party_size() {
            Some(RecordMode::Party)
        } else {
            None
        }
    }
}

// ── Identifier newtypes ──────────────────────────────────────────────────────

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $repr:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $repr);

        impl $name {
            pub const INVALID: $name = $name(<$repr>::MAX);

            #[inline]
            pub fn id(self) -> $repr { self.0 }

            #[inline]
            pub fn is_valid(self) -> bool { self != Self::INVALID }
        }

        impl From<$repr> for $name {
            fn from(v: $repr) -> Self { $name(v) }
        }
    };
}

id_type!(
    /// National dex number.
    Species, u16
);
id_type!(Ability, u16);
id_type!(Move, u16);
id_type!(Item, u16);
id_type!(Ball, u8);
id_type!(Language, u8);
id_type!(
    /// Origin game code.
    GameVersion, u8
);
id_type!(Nature, u8);

impl Species {
    pub const NONE: Species = Species(0);
    pub const BULBASAUR: Species = Species(1);
    pub const UNOWN: Species = Species(201);
    pub const DEOXYS: Species = Species(386);
}

impl Ability {
    pub const NONE: Ability = Ability(0);
}

impl Move {
    pub const NONE: Move = Move(0);
}

impl Item {
    pub const NONE: Item = Item(0);
}

impl Ball {
    pub const NONE: Ball = Ball(0);
    pub const MASTER: Ball = Ball(1);
    pub const POKE: Ball = Ball(4);
}

impl Language {
    pub const NONE: Language = Language(0);
    pub const JPN: Language = Language(1);
    pub const ENG: Language = Language(2);
    pub const FRE: Language = Language(3);
    pub const ITA: Language = Language(4);
    pub const GER: Language = Language(5);
    pub const SPA: Language = Language(7);
    pub const KOR: Language = Language(8);
    pub const CHS: Language = Language(9);
    pub const CHT: Language = Language(10);
}

impl GameVersion {
    pub const NONE: GameVersion = GameVersion(0);
    pub const SAPPHIRE: GameVersion = GameVersion(1);
    pub const RUBY: GameVersion = GameVersion(2);
    pub const EMERALD: GameVersion = GameVersion(3);
    pub const FIRE_RED: GameVersion = GameVersion(4);
    pub const LEAF_GREEN: GameVersion = GameVersion(5);
    pub const COLOSSEUM_XD: GameVersion = GameVersion(15);
    pub const DIAMOND: GameVersion = GameVersion(10);
    pub const PEARL: GameVersion = GameVersion(11);
    pub const PLATINUM: GameVersion = GameVersion(12);
    pub const HEART_GOLD: GameVersion = GameVersion(7);
    pub const SOUL_SILVER: GameVersion = GameVersion(8);
    pub const WHITE: GameVersion = GameVersion(20);
    pub const BLACK: GameVersion = GameVersion(21);
    pub const WHITE2: GameVersion = GameVersion(22);
    pub const BLACK2: GameVersion = GameVersion(23);
    pub const X: GameVersion = GameVersion(24);
    pub const Y: GameVersion = GameVersion(25);
    pub const ALPHA_SAPPHIRE: GameVersion = GameVersion(26);
    pub const OMEGA_RUBY: GameVersion = GameVersion(27);
    pub const SUN: GameVersion = GameVersion(30);
    pub const MOON: GameVersion = GameVersion(31);
    pub const ULTRA_SUN: GameVersion = GameVersion(32);
    pub const ULTRA_MOON: GameVersion = GameVersion(33);
    pub const GO: GameVersion = GameVersion(34);
    pub const LETS_GO_PIKACHU: GameVersion = GameVersion(42);
    pub const LETS_GO_EEVEE: GameVersion = GameVersion(43);
    pub const SWORD: GameVersion = GameVersion(44);
    pub const SHIELD: GameVersion = GameVersion(45);
}

impl Nature {
    pub const COUNT: u8 = 25;
    pub const HARDY: Nature = Nature(0);
    pub const ADAMANT: Nature = Nature(3);
    pub const MODEST: Nature = Nature(15);

    /// Nature implied by a personality value (generations III and IV).
    pub fn from_pid(pid: u32) -> Nature {
        Nature((pid % Nature::COUNT as u32) as u8)
    }

    /// Stat boost multiplier in tenths (9, 10 or 11) for a non-HP stat.
    pub fn modifier(self, stat: Stat) -> u32 {
        if stat == Stat::Hp || self.0 >= Nature::COUNT {
            return 10;
        }
        let up = self.0 / 5;
        let down = self.0 % 5;
        if up == down {
            return 10;
        }
        let idx = stat.nature_index();
        if idx == up { 11 } else if idx == down { 9 } else { 10 }
    }
}

// ── Small closed enums ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Genderless,
}

impl Gender {
    /// Two-bit storage code.
    pub fn code(self) -> u8 {
        match self {
            Gender::Male       => 0,
            Gender::Female     => 1,
            Gender::Genderless => 2,
        }
    }

    pub fn from_code(code: u8) -> Gender {
        match code & 3 {
            0 => Gender::Male,
            1 => Gender::Female,
            _ => Gender::Genderless,
        }
    }

    /// Gender implied by a personality value and a species gender ratio.
    /// Ratio 255 is genderless, 254 female only, 0 male only.
    pub fn from_pid(pid: u32, ratio: u8) -> Gender {
        match ratio {
            255 => Gender::Genderless,
            254 => Gender::Female,
            0   => Gender::Male,
            r if (pid & 0xFF) < r as u32 => Gender::Female,
            _   => Gender::Male,
        }
    }
}

/// Stat order used by IV and EV storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    Atk,
    Def,
    Spe,
    SpA,
    SpD,
}

impl Stat {
    pub const ALL: [Stat; 6] = [Stat::Hp, Stat::Atk, Stat::Def, Stat::Spe, Stat::SpA, Stat::SpD];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Position in the nature table (Atk, Def, Spe, SpA, SpD).
    fn nature_index(self) -> u8 {
        match self {
            Stat::Hp  => u8::MAX,
            Stat::Atk => 0,
            Stat::Def => 1,
            Stat::Spe => 2,
            Stat::SpA => 3,
            Stat::SpD => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Type {
    Normal = 0,
    Fighting = 1,
    Flying = 2,
    Poison = 3,
    Ground = 4,
    Rock = 5,
    Bug = 6,
    Ghost = 7,
    Steel = 8,
    Fire = 9,
    Water = 10,
    Grass = 11,
    Electric = 12,
    Psychic = 13,
    Ice = 14,
    Dragon = 15,
    Dark = 16,
    Fairy = 17,
    Invalid = 255,
}

impl Type {
    pub fn from_index(index: u8) -> Type {
        match index {
            0 => Type::Normal,
            1 => Type::Fighting,
            2 => Type::Flying,
            3 => Type::Poison,
            4 => Type::Ground,
            5 => Type::Rock,
            6 => Type::Bug,
            7 => Type::Ghost,
            8 => Type::Steel,
            9 => Type::Fire,
            10 => Type::Water,
            11 => Type::Grass,
            12 => Type::Electric,
            13 => Type::Psychic,
            14 => Type::Ice,
            15 => Type::Dragon,
            16 => Type::Dark,
            17 => Type::Fairy,
            _ => Type::Invalid,
        }
    }
}

/// Hidden Power type from the low bit of each IV, in storage order.
pub fn hidden_power_type(ivs: [u8; 6]) -> Type {
    let bits = ivs
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, iv)| acc | (((*iv & 1) as u32) << i));
    Type::from_index((bits * 15 / 63) as u8 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(Generation::III.size(RecordMode::Party), 100);
        assert_eq!(Generation::V.party_size(), 220);
        assert_eq!(RecordMode::for_len(Generation::IV, 236), Some(RecordMode::Party));
        assert_eq!(RecordMode::for_len(Generation::IV, 220), None);
    }

    #[test]
    fn test_nature_modifier() {
        assert_eq!(Nature::ADAMANT.modifier(Stat::Atk), 11);
        assert_eq!(Nature::ADAMANT.modifier(Stat::SpA), 9);
        assert_eq!(Nature::ADAMANT.modifier(Stat::Spe), 10);
        assert_eq!(Nature::HARDY.modifier(Stat::Atk), 10);
        assert_eq!(Nature::from_pid(0x12345678), Nature((0x12345678u32 % 25) as u8));
    }

    #[test]
    fn test_gender_from_pid() {
        assert_eq!(Gender::from_pid(0x10, 31), Gender::Female);
        assert_eq!(Gender::from_pid(0x1F, 31), Gender::Male);
        assert_eq!(Gender::from_pid(0, 255), Gender::Genderless);
    }

    #[test]
    fn test_hidden_power_type_bounds() {
        assert_eq!(hidden_power_type([0; 6]), Type::Fighting);
        assert_eq!(hidden_power_type([31; 6]), Type::Dark);
    }
}
