//! Generation VIII record.
//!
//! Four 80-byte blocks behind the 8-byte header, then a 16-byte party
//! extension. Ability and form widen to 16 bits, the ribbon bytes move to
//! 0x34, and current HP lives inside the blocks so box records keep it.

use std::ops::Range;

use chrono::NaiveDate;

use crate::checksum::additive_checksum16;
use crate::crypto::{decrypt_gen6, encrypt_gen6};
use crate::error::RecordError;
use crate::ribbon::Ribbon;
use crate::text::{decode_utf16, encode_utf16, G6_TERMINATOR};
use crate::types::{
    Ability, Ball, GameVersion, Gender, Generation, Item, Language, Move, Nature, RecordMode,
    Species, Stat,
};

use super::{check_len, settle, Creature, Record, RecordBuf};

const BLOCK_SIZE: usize = 80;
const PAYLOAD_END: usize = 0x148;
const CHECKSUM: usize = 0x06;
const IV32: usize = 0x8C;
const NICKNAME: Range<usize> = 0x58..0x72;
const HT_NAME: Range<usize> = 0xA8..0xC2;
const OT_NAME: Range<usize> = 0xF8..0x112;
const MET_LEVEL: usize = 0x125;
const PARTY: usize = 0x148;

const NICKNAME_TERMINATOR: usize = 0x70;
const OT_TERMINATOR: usize = 0x110;

#[derive(Debug)]
pub struct Pk8<'a> {
    buf:       RecordBuf<'a>,
    encrypted: bool,
}

impl<'a> Pk8<'a> {
    pub fn new(buf: RecordBuf<'a>, mode: RecordMode) -> Result<Self, RecordError> {
        check_len(Generation::VIII, mode, buf.len())?;
        Ok(Self::load(buf))
    }

    /// Wrap a buffer known to hold plaintext.
    pub(crate) fn wrap(buf: RecordBuf<'a>) -> Self {
        Pk8 { buf, encrypted: false }
    }

    /// Wrap a buffer of unknown state, decrypting it if it looks encrypted.
    pub(crate) fn load(buf: RecordBuf<'a>) -> Self {
        let mut pk = Self::wrap(buf);
        pk.encrypted = pk.looks_encrypted();
        settle(&mut pk);
        pk
    }

    /// Nature used for stat calculation; mints change it independently.
    pub fn stat_nature(&self) -> Nature {
        Nature(self.buf.u8_at(0x21))
    }

    pub fn set_stat_nature(&mut self, value: Nature) {
        self.buf.set_u8(0x21, value.0);
    }

    pub fn can_gigantamax(&self) -> bool {
        self.buf.flag(0x16, 4)
    }

    pub fn set_can_gigantamax(&mut self, value: bool) {
        self.buf.set_flag(0x16, 4, value);
    }

    pub fn dynamax_level(&self) -> u8 {
        self.buf.u8_at(0x90)
    }

    pub fn set_dynamax_level(&mut self, value: u8) {
        self.buf.set_u8(0x90, value);
    }

    pub fn ht_language(&self) -> Language {
        Language(self.buf.u8_at(0xC3))
    }

    pub fn set_ht_language(&mut self, value: Language) {
        self.buf.set_u8(0xC3, value.0);
    }

    pub fn hyper_trained(&self, stat: Stat) -> bool {
        self.buf.flag(0x126, stat.index() as u8)
    }

    pub fn set_hyper_trained(&mut self, stat: Stat, value: bool) {
        self.buf.set_flag(0x126, stat.index() as u8, value);
    }

    fn party_ofs(&self, rel: usize) -> Option<usize> {
        let ofs = PARTY + rel;
        (ofs + 2 <= self.buf.len()).then_some(ofs)
    }

    fn stat_ofs(&self, stat: Stat) -> Option<usize> {
        self.party_ofs(0x02 + 2 * stat.index())
    }
}

impl<'a> Creature for Pk8<'a> {
    fn generation(&self) -> Generation {
        Generation::VIII
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
        self.buf.u16_at(NICKNAME_TERMINATOR) != 0 || self.buf.u16_at(OT_TERMINATOR) != 0
    }

    fn encrypt(&mut self) {
        if self.encrypted {
            return;
        }
        self.refresh_checksum();
        encrypt_gen6(&mut self.buf, BLOCK_SIZE);
        self.encrypted = true;
    }

    fn decrypt(&mut self) {
        if !self.encrypted {
            return;
        }
        decrypt_gen6(&mut self.buf, BLOCK_SIZE);
        self.encrypted = false;
    }

    fn checksum(&self) -> u16 {
        self.buf.u16_at(CHECKSUM)
    }

    fn set_checksum(&mut self, value: u16) {
        self.buf.set_u16(CHECKSUM, value);
    }

    fn calc_checksum(&self) -> u16 {
        additive_checksum16(&self.buf, 0x08, PAYLOAD_END)
    }

    fn clone_owned(&self) -> Record<'static> {
        Record::Pk8(Pk8 { buf: self.buf.to_owned_buf(), encrypted: self.encrypted })
    }

    fn encryption_constant(&self) -> u32 {
        self.buf.u32_at(0x00)
    }

    fn set_encryption_constant(&mut self, value: u32) {
        self.buf.set_u32(0x00, value);
    }

    fn pid(&self) -> u32 {
        self.buf.u32_at(0x1C)
    }

    fn set_pid(&mut self, value: u32) {
        self.buf.set_u32(0x1C, value);
    }

    fn species(&self) -> Species {
        Species(self.buf.u16_at(0x08))
    }

    fn set_species(&mut self, value: Species) {
        self.buf.set_u16(0x08, value.0);
    }

    fn held_item(&self) -> Item {
        Item(self.buf.u16_at(0x0A))
    }

    fn set_held_item(&mut self, value: Item) {
        self.buf.set_u16(0x0A, value.0);
    }

    fn tid(&self) -> u16 {
        self.buf.u16_at(0x0C)
    }

    fn set_tid(&mut self, value: u16) {
        self.buf.set_u16(0x0C, value);
    }

    fn sid(&self) -> u16 {
        self.buf.u16_at(0x0E)
    }

    fn set_sid(&mut self, value: u16) {
        self.buf.set_u16(0x0E, value);
    }

    fn exp(&self) -> u32 {
        self.buf.u32_at(0x10)
    }

    fn set_exp(&mut self, value: u32) {
        self.buf.set_u32(0x10, value);
    }

    fn ability(&self) -> Option<Ability> {
        Some(Ability(self.buf.u16_at(0x14)))
    }

    fn set_ability(&mut self, value: Ability) {
        self.buf.set_u16(0x14, value.0);
    }

    fn ability_number(&self) -> u8 {
        match self.buf.bits8(0x16, 0, 3) {
            4 => 2,
            2 => 1,
            _ => 0,
        }
    }

    fn set_ability_number(&mut self, slot: u8) {
        self.buf.set_bits8(0x16, 0, 3, 1 << slot.min(2));
    }

    fn markings(&self) -> u16 {
        self.buf.u16_at(0x18)
    }

    fn set_markings(&mut self, value: u16) {
        self.buf.set_u16(0x18, value);
    }

    fn nature(&self) -> Nature {
        Nature(self.buf.u8_at(0x20))
    }

    /// Also resets the stat nature.
    fn set_nature(&mut self, value: Nature) {
        self.buf.set_u8(0x20, value.0);
        self.set_stat_nature(value);
    }

    fn gender(&self) -> Option<Gender> {
        Some(Gender::from_code(self.buf.bits8(0x22, 2, 2)))
    }

    fn set_gender(&mut self, value: Gender) {
        self.buf.set_bits8(0x22, 2, 2, value.code());
    }

    fn fateful_encounter(&self) -> bool {
        self.buf.flag(0x22, 0)
    }

    fn set_fateful_encounter(&mut self, value: bool) {
        self.buf.set_flag(0x22, 0, value);
    }

    fn form(&self) -> u8 {
        self.buf.u16_at(0x24) as u8
    }

    fn set_form(&mut self, value: u8) {
        self.buf.set_u16(0x24, value as u16);
    }

    fn ev(&self, stat: Stat) -> u8 {
        self.buf.u8_at(0x26 + stat.index())
    }

    fn set_ev(&mut self, stat: Stat, value: u8) {
        self.buf.set_u8(0x26 + stat.index(), value);
    }

    fn iv(&self, stat: Stat) -> u8 {
        self.buf.bits32(IV32, 5 * stat.index() as u32, 5) as u8
    }

    fn set_iv(&mut self, stat: Stat, value: u8) {
        self.buf.set_bits32(IV32, 5 * stat.index() as u32, 5, value as u32);
    }

    fn contest(&self, index: usize) -> u8 {
        if index < 6 { self.buf.u8_at(0x2C + index) } else { 0 }
    }

    fn set_contest(&mut self, index: usize, value: u8) {
        if index < 6 {
            self.buf.set_u8(0x2C + index, value);
        }
    }

    fn pokerus(&self) -> u8 {
        self.buf.u8_at(0x32)
    }

    fn set_pokerus(&mut self, value: u8) {
        self.buf.set_u8(0x32, value);
    }

    fn is_egg(&self) -> bool {
        self.buf.bits32(IV32, 30, 1) == 1
    }

    fn set_egg(&mut self, value: bool) {
        self.buf.set_bits32(IV32, 30, 1, value as u32);
    }

    fn is_nicknamed(&self) -> bool {
        self.buf.bits32(IV32, 31, 1) == 1
    }

    fn set_nicknamed(&mut self, value: bool) {
        self.buf.set_bits32(IV32, 31, 1, value as u32);
    }

    fn move_at(&self, slot: usize) -> Move {
        Move(self.buf.u16_at(0x72 + 2 * (slot & 3)))
    }

    fn set_move_at(&mut self, slot: usize, value: Move) {
        self.buf.set_u16(0x72 + 2 * (slot & 3), value.0);
    }

    fn pp(&self, slot: usize) -> u8 {
        self.buf.u8_at(0x7A + (slot & 3))
    }

    fn set_pp(&mut self, slot: usize, value: u8) {
        self.buf.set_u8(0x7A + (slot & 3), value);
    }

    fn pp_ups(&self, slot: usize) -> u8 {
        self.buf.u8_at(0x7E + (slot & 3))
    }

    fn set_pp_ups(&mut self, slot: usize, value: u8) {
        self.buf.set_u8(0x7E + (slot & 3), value);
    }

    fn relearn_move(&self, slot: usize) -> Move {
        Move(self.buf.u16_at(0x82 + 2 * (slot & 3)))
    }

    fn set_relearn_move(&mut self, slot: usize, value: Move) {
        self.buf.set_u16(0x82 + 2 * (slot & 3), value.0);
    }

    fn nickname(&self) -> String {
        decode_utf16(&self.buf[NICKNAME], G6_TERMINATOR)
    }

    fn set_nickname(&mut self, value: &str) {
        encode_utf16(value, &mut self.buf[NICKNAME], G6_TERMINATOR, 0);
    }

    fn ot_name(&self) -> String {
        decode_utf16(&self.buf[OT_NAME], G6_TERMINATOR)
    }

    fn set_ot_name(&mut self, value: &str) {
        encode_utf16(value, &mut self.buf[OT_NAME], G6_TERMINATOR, 0);
    }

    fn ot_gender(&self) -> Gender {
        Gender::from_code(self.buf.bits8(MET_LEVEL, 7, 1))
    }

    fn set_ot_gender(&mut self, value: Gender) {
        self.buf.set_bits8(MET_LEVEL, 7, 1, value.code());
    }

    fn ot_friendship(&self) -> u8 {
        self.buf.u8_at(0x112)
    }

    fn set_ot_friendship(&mut self, value: u8) {
        self.buf.set_u8(0x112, value);
    }

    fn ht_name(&self) -> String {
        decode_utf16(&self.buf[HT_NAME], G6_TERMINATOR)
    }

    fn set_ht_name(&mut self, value: &str) {
        encode_utf16(value, &mut self.buf[HT_NAME], G6_TERMINATOR, 0);
    }

    fn ht_gender(&self) -> Gender {
        Gender::from_code(self.buf.u8_at(0xC2) & 1)
    }

    fn set_ht_gender(&mut self, value: Gender) {
        self.buf.set_u8(0xC2, value.code() & 1);
    }

    fn ht_friendship(&self) -> u8 {
        self.buf.u8_at(0xC8)
    }

    fn set_ht_friendship(&mut self, value: u8) {
        self.buf.set_u8(0xC8, value);
    }

    fn current_handler(&self) -> u8 {
        self.buf.u8_at(0xC4)
    }

    fn set_current_handler(&mut self, value: u8) {
        self.buf.set_u8(0xC4, value);
    }

    fn language(&self) -> Language {
        Language(self.buf.u8_at(0xE2))
    }

    fn set_language(&mut self, value: Language) {
        self.buf.set_u8(0xE2, value.0);
    }

    fn version(&self) -> GameVersion {
        GameVersion(self.buf.u8_at(0xDE))
    }

    fn set_version(&mut self, value: GameVersion) {
        self.buf.set_u8(0xDE, value.0);
    }

    fn ball(&self) -> Ball {
        Ball(self.buf.u8_at(0x124))
    }

    fn set_ball(&mut self, value: Ball) {
        self.buf.set_u8(0x124, value.0);
    }

    fn met_level(&self) -> u8 {
        self.buf.bits8(MET_LEVEL, 0, 7)
    }

    fn set_met_level(&mut self, value: u8) {
        self.buf.set_bits8(MET_LEVEL, 0, 7, value);
    }

    fn met_location(&self) -> u16 {
        self.buf.u16_at(0x122)
    }

    fn set_met_location(&mut self, value: u16) {
        self.buf.set_u16(0x122, value);
    }

    fn egg_location(&self) -> u16 {
        self.buf.u16_at(0x120)
    }

    fn set_egg_location(&mut self, value: u16) {
        self.buf.set_u16(0x120, value);
    }

    fn met_date(&self) -> Option<NaiveDate> {
        self.buf.date_at(0x11C)
    }

    fn set_met_date(&mut self, value: Option<NaiveDate>) {
        self.buf.set_date(0x11C, value);
    }

    fn egg_date(&self) -> Option<NaiveDate> {
        self.buf.date_at(0x119)
    }

    fn set_egg_date(&mut self, value: Option<NaiveDate>) {
        self.buf.set_date(0x119, value);
    }

    fn contest_memory_count(&self) -> u8 {
        self.buf.u8_at(0x3C)
    }

    fn set_contest_memory_count(&mut self, value: u8) {
        self.buf.set_u8(0x3C, value);
        self.set_ribbon(Ribbon::ContestMemory, value != 0);
    }

    fn battle_memory_count(&self) -> u8 {
        self.buf.u8_at(0x3D)
    }

    fn set_battle_memory_count(&mut self, value: u8) {
        self.buf.set_u8(0x3D, value);
        self.set_ribbon(Ribbon::BattleMemory, value != 0);
    }

    fn stat_level(&self) -> u8 {
        self.party_ofs(0x00).map_or(0, |ofs| self.buf.u8_at(ofs))
    }

    fn set_stat_level(&mut self, value: u8) {
        if let Some(ofs) = self.party_ofs(0x00) {
            self.buf.set_u8(ofs, value);
        }
    }

    fn stat_hp_current(&self) -> u16 {
        self.buf.u16_at(0x8A)
    }

    fn set_stat_hp_current(&mut self, value: u16) {
        self.buf.set_u16(0x8A, value);
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
