//! Generation III record.
//!
//! ```text
//! 0x00  PID            0x1C  checksum (over 0x20..0x50)
//! 0x04  TID / SID      0x20  growth | attacks | EVs | misc  (4 × 12 bytes)
//! 0x08  nickname [10]  0x50  party extension (status, level, stats)
//! 0x12  language
//! 0x13  flags (bad egg, has species, egg name)
//! 0x14  OT name [7]
//! 0x1B  markings
//! ```
//!
//! Species and items use the generation III internal numbering on disk;
//! the accessors translate to national species and generation IV items.

use crate::checksum::additive_checksum16;
use crate::crypto::{decrypt_gen3, encrypt_gen3, GEN3_PAYLOAD_END, GEN3_PAYLOAD_START};
use crate::error::RecordError;
use crate::ribbon::{ribbon_offset, Ribbon};
use crate::tables::{item_from_gen3, item_to_gen3, species_from_gen3, species_to_gen3};
use crate::text::{decode_gen3, encode_gen3};
use crate::types::{
    Ability, Ball, GameVersion, Gender, Generation, Item, Language, Move, Nature, RecordMode,
    Species, Stat,
};

use super::{check_len, settle, Creature, Record, RecordBuf};

const NICKNAME: std::ops::Range<usize> = 0x08..0x12;
const OT_NAME: std::ops::Range<usize> = 0x14..0x1B;
const CHECKSUM: usize = 0x1C;
const ORIGINS: usize = 0x46;
const IV32: usize = 0x48;
const RIBBONS: usize = 0x4C;
const PARTY: usize = 0x50;

#[derive(Debug)]
pub struct Pk3<'a> {
    buf:       RecordBuf<'a>,
    encrypted: bool,
}

impl<'a> Pk3<'a> {
    pub fn new(buf: RecordBuf<'a>, mode: RecordMode) -> Result<Self, RecordError> {
        check_len(Generation::III, mode, buf.len())?;
        Ok(Self::load(buf))
    }

    /// Wrap a buffer known to hold plaintext.
    pub(crate) fn wrap(buf: RecordBuf<'a>) -> Self {
        Pk3 { buf, encrypted: false }
    }

    /// Wrap a buffer of unknown state, decrypting it if it looks encrypted.
    pub(crate) fn load(buf: RecordBuf<'a>) -> Self {
        let mut pk = Self::wrap(buf);
        pk.encrypted = pk.looks_encrypted();
        settle(&mut pk);
        pk
    }

    /// Species as stored, in the internal numbering.
    pub fn species_index(&self) -> u16 {
        self.buf.u16_at(0x20)
    }

    pub fn is_bad_egg(&self) -> bool {
        self.buf.flag(0x13, 0)
    }

    pub fn set_bad_egg(&mut self, value: bool) {
        self.buf.set_flag(0x13, 0, value);
    }

    /// Tier count (0..=4) of a contest category: cool, beauty, cute, smart, tough.
    pub fn contest_ribbon_count(&self, category: usize) -> u8 {
        self.buf.bits32(RIBBONS, category.min(4) as u32 * 3, 3) as u8
    }

    pub fn set_contest_ribbon_count(&mut self, category: usize, count: u8) {
        self.buf.set_bits32(RIBBONS, category.min(4) as u32 * 3, 3, count as u32);
    }

    fn party_ofs(&self, rel: usize) -> Option<usize> {
        let ofs = PARTY + rel;
        (ofs + 2 <= self.buf.len()).then_some(ofs)
    }

    fn stat_ofs(&self, stat: Stat) -> Option<usize> {
        self.party_ofs(0x08 + 2 * stat.index())
    }
}

impl<'a> Creature for Pk3<'a> {
    fn generation(&self) -> Generation {
        Generation::III
    }

    fn data(&self) -> &[u8] {
        &self.buf
    }

    fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn is_borrowed(&self) -> bool {
        self.buf.is_borrowed()
    }

    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn looks_encrypted(&self) -> bool {
        !self.is_checksum_valid()
    }

    fn encrypt(&mut self) {
        if self.encrypted {
            return;
        }
        self.refresh_checksum();
        encrypt_gen3(&mut self.buf);
        self.encrypted = true;
    }

    fn decrypt(&mut self) {
        if !self.encrypted {
            return;
        }
        decrypt_gen3(&mut self.buf);
        self.encrypted = false;
    }

    fn checksum(&self) -> u16 {
        self.buf.u16_at(CHECKSUM)
    }

    fn set_checksum(&mut self, value: u16) {
        self.buf.set_u16(CHECKSUM, value);
    }

    fn calc_checksum(&self) -> u16 {
        additive_checksum16(&self.buf, GEN3_PAYLOAD_START, GEN3_PAYLOAD_END)
    }

    fn clone_owned(&self) -> Record<'static> {
        Record::Pk3(Pk3 { buf: self.buf.to_owned_buf(), encrypted: self.encrypted })
    }

    fn encryption_constant(&self) -> u32 {
        self.pid()
    }

    fn set_encryption_constant(&mut self, value: u32) {
        self.set_pid(value);
    }

    fn pid(&self) -> u32 {
        self.buf.u32_at(0x00)
    }

    fn set_pid(&mut self, value: u32) {
        self.buf.set_u32(0x00, value);
    }

    fn species(&self) -> Species {
        species_from_gen3(self.species_index())
    }

    fn set_species(&mut self, value: Species) {
        let index = species_to_gen3(value);
        self.buf.set_u16(0x20, index);
        self.buf.set_flag(0x13, 1, index != 0);
    }

    fn held_item(&self) -> Item {
        item_from_gen3(self.buf.u16_at(0x22))
    }

    fn set_held_item(&mut self, value: Item) {
        self.buf.set_u16(0x22, item_to_gen3(value));
    }

    fn tid(&self) -> u16 {
        self.buf.u16_at(0x04)
    }

    fn set_tid(&mut self, value: u16) {
        self.buf.set_u16(0x04, value);
    }

    fn sid(&self) -> u16 {
        self.buf.u16_at(0x06)
    }

    fn set_sid(&mut self, value: u16) {
        self.buf.set_u16(0x06, value);
    }

    fn exp(&self) -> u32 {
        self.buf.u32_at(0x24)
    }

    fn set_exp(&mut self, value: u32) {
        self.buf.set_u32(0x24, value);
    }

    fn ability(&self) -> Option<Ability> {
        None
    }

    fn set_ability(&mut self, _value: Ability) {}

    fn ability_number(&self) -> u8 {
        self.buf.bits32(IV32, 31, 1) as u8
    }

    fn set_ability_number(&mut self, slot: u8) {
        self.buf.set_bits32(IV32, 31, 1, slot as u32);
    }

    fn markings(&self) -> u16 {
        self.buf.u8_at(0x1B) as u16
    }

    fn set_markings(&mut self, value: u16) {
        self.buf.set_u8(0x1B, value as u8);
    }

    fn nature(&self) -> Nature {
        Nature::from_pid(self.pid())
    }

    fn set_nature(&mut self, _value: Nature) {}

    fn gender(&self) -> Option<Gender> {
        None
    }

    fn set_gender(&mut self, _value: Gender) {}

    fn fateful_encounter(&self) -> bool {
        self.buf.flag(RIBBONS + 3, 7)
    }

    fn set_fateful_encounter(&mut self, value: bool) {
        self.buf.set_flag(RIBBONS + 3, 7, value);
    }

    /// Unown letter from the PID; 0 for every other species.
    fn form(&self) -> u8 {
        if self.species() != Species::UNOWN {
            return 0;
        }
        let pid = self.pid();
        let letter = ((pid >> 18) & 0xC0) | ((pid >> 12) & 0x30) | ((pid >> 6) & 0x0C) | (pid & 0x03);
        (letter % 28) as u8
    }

    fn set_form(&mut self, _value: u8) {}

    fn ev(&self, stat: Stat) -> u8 {
        self.buf.u8_at(0x38 + stat.index())
    }

    fn set_ev(&mut self, stat: Stat, value: u8) {
        self.buf.set_u8(0x38 + stat.index(), value);
    }

    fn iv(&self, stat: Stat) -> u8 {
        self.buf.bits32(IV32, 5 * stat.index() as u32, 5) as u8
    }

    fn set_iv(&mut self, stat: Stat, value: u8) {
        self.buf.set_bits32(IV32, 5 * stat.index() as u32, 5, value as u32);
    }

    fn contest(&self, index: usize) -> u8 {
        if index < 6 { self.buf.u8_at(0x3E + index) } else { 0 }
    }

    fn set_contest(&mut self, index: usize, value: u8) {
        if index < 6 {
            self.buf.set_u8(0x3E + index, value);
        }
    }

    fn pokerus(&self) -> u8 {
        self.buf.u8_at(0x44)
    }

    fn set_pokerus(&mut self, value: u8) {
        self.buf.set_u8(0x44, value);
    }

    fn is_egg(&self) -> bool {
        self.buf.bits32(IV32, 30, 1) == 1
    }

    fn set_egg(&mut self, value: bool) {
        self.buf.set_bits32(IV32, 30, 1, value as u32);
        self.buf.set_flag(0x13, 2, value);
    }

    fn is_nicknamed(&self) -> bool {
        false
    }

    fn set_nicknamed(&mut self, _value: bool) {}

    fn move_at(&self, slot: usize) -> Move {
        Move(self.buf.u16_at(0x2C + 2 * (slot & 3)))
    }

    fn set_move_at(&mut self, slot: usize, value: Move) {
        self.buf.set_u16(0x2C + 2 * (slot & 3), value.0);
    }

    fn pp(&self, slot: usize) -> u8 {
        self.buf.u8_at(0x34 + (slot & 3))
    }

    fn set_pp(&mut self, slot: usize, value: u8) {
        self.buf.set_u8(0x34 + (slot & 3), value);
    }

    fn pp_ups(&self, slot: usize) -> u8 {
        self.buf.bits8(0x28, 2 * (slot & 3) as u8, 2)
    }

    fn set_pp_ups(&mut self, slot: usize, value: u8) {
        self.buf.set_bits8(0x28, 2 * (slot & 3) as u8, 2, value);
    }

    fn nickname(&self) -> String {
        decode_gen3(&self.buf[NICKNAME])
    }

    fn set_nickname(&mut self, value: &str) {
        encode_gen3(value, &mut self.buf[NICKNAME]);
    }

    fn ot_name(&self) -> String {
        decode_gen3(&self.buf[OT_NAME])
    }

    fn set_ot_name(&mut self, value: &str) {
        encode_gen3(value, &mut self.buf[OT_NAME]);
    }

    fn ot_gender(&self) -> Gender {
        Gender::from_code(self.buf.bits16(ORIGINS, 15, 1) as u8)
    }

    fn set_ot_gender(&mut self, value: Gender) {
        self.buf.set_bits16(ORIGINS, 15, 1, value.code() as u16);
    }

    fn ot_friendship(&self) -> u8 {
        self.buf.u8_at(0x29)
    }

    fn set_ot_friendship(&mut self, value: u8) {
        self.buf.set_u8(0x29, value);
    }

    fn language(&self) -> Language {
        Language(self.buf.u8_at(0x12))
    }

    fn set_language(&mut self, value: Language) {
        self.buf.set_u8(0x12, value.0);
    }

    fn version(&self) -> GameVersion {
        GameVersion(self.buf.bits16(ORIGINS, 7, 4) as u8)
    }

    fn set_version(&mut self, value: GameVersion) {
        self.buf.set_bits16(ORIGINS, 7, 4, value.0 as u16);
    }

    fn ball(&self) -> Ball {
        Ball(self.buf.bits16(ORIGINS, 11, 4) as u8)
    }

    fn set_ball(&mut self, value: Ball) {
        self.buf.set_bits16(ORIGINS, 11, 4, value.0 as u16);
    }

    fn met_level(&self) -> u8 {
        self.buf.bits16(ORIGINS, 0, 7) as u8
    }

    fn set_met_level(&mut self, value: u8) {
        self.buf.set_bits16(ORIGINS, 0, 7, value as u16);
    }

    fn met_location(&self) -> u16 {
        self.buf.u8_at(0x45) as u16
    }

    fn set_met_location(&mut self, value: u16) {
        self.buf.set_u8(0x45, value as u8);
    }

    fn ribbon(&self, ribbon: Ribbon) -> bool {
        if let Some((category, tier)) = ribbon.g3_contest_tier() {
            return self.contest_ribbon_count(category) > tier;
        }
        ribbon_offset(Generation::III, ribbon).map_or(false, |(ofs, bit)| self.buf.flag(ofs, bit))
    }

    /// Contest tiers move the category count: setting tier `n` raises it to
    /// at least `n + 1`, clearing it lowers it to at most `n`.
    fn set_ribbon(&mut self, ribbon: Ribbon, value: bool) {
        if let Some((category, tier)) = ribbon.g3_contest_tier() {
            let count = self.contest_ribbon_count(category);
            let count = if value { count.max(tier + 1) } else { count.min(tier) };
            self.set_contest_ribbon_count(category, count);
            return;
        }
        if let Some((ofs, bit)) = ribbon_offset(Generation::III, ribbon) {
            self.buf.set_flag(ofs, bit, value);
        }
    }

    fn stat_level(&self) -> u8 {
        self.party_ofs(0x04).map_or(0, |ofs| self.buf.u8_at(ofs))
    }

    fn set_stat_level(&mut self, value: u8) {
        if let Some(ofs) = self.party_ofs(0x04) {
            self.buf.set_u8(ofs, value);
        }
    }

    fn stat_hp_current(&self) -> u16 {
        self.party_ofs(0x06).map_or(0, |ofs| self.buf.u16_at(ofs))
    }

    fn set_stat_hp_current(&mut self, value: u16) {
        if let Some(ofs) = self.party_ofs(0x06) {
            self.buf.set_u16(ofs, value);
        }
    }

    fn stat(&self, stat: Stat) -> u16 {
        self.stat_ofs(stat).map_or(0, |ofs| self.buf.u16_at(ofs))
    }

    fn set_stat(&mut self, stat: Stat, value: u16) {
        if let Some(ofs) = self.stat_ofs(stat) {
            self.buf.set_u16(ofs, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{empty, from_bytes, from_slice};

    fn sample() -> Record<'static> {
        let mut pk = empty(Generation::III, RecordMode::Box);
        pk.set_pid(0x1234_5678);
        pk.set_tid(1);
        pk.set_sid(2);
        pk.set_species(Species(252));
        pk.set_exp(135);
        pk.set_move_at(0, Move(33));
        pk.set_iv(Stat::SpD, 31);
        pk.set_nickname("TREECKO");
        pk.refresh_checksum();
        pk
    }

    #[test]
    fn test_species_is_stored_as_internal_index() {
        let pk = sample();
        assert_eq!(pk.species(), Species(252));
        assert_eq!(pk.data()[0x20], 0x15); // 277
        assert_eq!(pk.data()[0x21], 0x01);
        assert!(pk.data()[0x13] & 2 != 0);
    }

    #[test]
    fn test_encrypt_then_construct_decrypts() {
        let pk = sample();
        let cipher = pk.encrypted_bytes();
        assert_ne!(&cipher[0x20..0x50], &pk.data()[0x20..0x50]);
        assert_eq!(&cipher[..0x20], &pk.data()[..0x20]);

        let back = from_bytes(Generation::III, &cipher, RecordMode::Box).unwrap();
        assert_eq!(back.data(), pk.data());
        assert_eq!(back.nickname(), "TREECKO");
        assert_eq!(back.iv(Stat::SpD), 31);
    }

    #[test]
    fn test_encrypt_is_idempotent() {
        let mut pk = sample();
        pk.encrypt();
        let once = pk.data().to_vec();
        pk.encrypt();
        assert_eq!(pk.data(), &once[..]);
        pk.decrypt();
        pk.decrypt();
        assert!(!pk.is_encrypted());
    }

    #[test]
    fn test_contest_counts_as_tiers() {
        let mut pk = sample();
        let Record::Pk3(inner) = &mut pk else { unreachable!() };
        inner.set_contest_ribbon_count(1, 3);
        assert!(pk.ribbon(Ribbon::G3BeautyHyper));
        assert!(!pk.ribbon(Ribbon::G3BeautyMaster));
        pk.set_ribbon(Ribbon::G3BeautySuper, false);
        assert!(pk.ribbon(Ribbon::G3Beauty));
        assert!(!pk.ribbon(Ribbon::G3BeautySuper));
        pk.set_ribbon(Ribbon::Effort, true);
        assert_eq!(pk.data()[0x4E] & 0x08, 0x08);
    }

    #[test]
    fn test_origins_are_masked() {
        let mut pk = sample();
        pk.set_met_level(200);
        pk.set_ball(Ball(0x1F));
        assert_eq!(pk.met_level(), 200 & 0x7F);
        assert_eq!(pk.ball(), Ball(0x0F));
        assert_eq!(pk.ot_gender(), Gender::Male);
        pk.set_ot_gender(Gender::Female);
        assert_eq!(pk.ot_gender(), Gender::Female);
        assert_eq!(pk.met_level(), 200 & 0x7F);
    }

    #[test]
    fn test_aliased_record_writes_caller_memory() {
        let mut bytes = sample().encrypted_bytes();
        {
            let mut pk = from_slice(Generation::III, &mut bytes, RecordMode::Box).unwrap();
            assert!(pk.is_borrowed());
            pk.set_ot_friendship(99);
            pk.refresh_checksum();
        }
        assert_eq!(bytes[0x29], 99);
    }
}
