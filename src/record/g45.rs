//! Generation IV and V records.
//!
//! Both generations share one layout: an 8-byte header (PID, checksum at
//! 0x06) and four 32-byte blocks at 0x08, followed in party mode by the
//! battle stats. They differ in a handful of fields:
//!
//! | Field | IV | V |
//! |---|---|---|
//! | text | proprietary 16-bit table | UTF-16, 0xFFFF terminated |
//! | nature | `PID % 25` | byte at 0x41 |
//! | hidden ability | none | bit 0 of 0x42 |
//! | ball | 0x83, HGSS extension at 0x86 | 0x83 |
//! | met / egg location | Platinum 0x46 / 0x44, falling back to 0x80 / 0x7E | 0x80 / 0x7E |
//! | party length | 236 | 220 |

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

use chrono::NaiveDate;

use crate::checksum::additive_checksum16;
use crate::crypto::{decrypt_gen45, encrypt_gen45};
use crate::error::RecordError;
use crate::text::{decode_gen4, decode_utf16, encode_gen4, encode_utf16, G5_TERMINATOR};
use crate::types::{
    Ability, Ball, GameVersion, Gender, Generation, Item, Language, Move, Nature, RecordMode,
    Species, Stat,
};

use super::{check_len, settle, Creature, Record, RecordBuf};

const BLOCK_SIZE: usize = 32;
const PAYLOAD_END: usize = 0x88;
const CHECKSUM: usize = 0x06;
const IV32: usize = 0x38;
const FORM_BYTE: usize = 0x40;
const NICKNAME: Range<usize> = 0x48..0x5E;
const OT_NAME: Range<usize> = 0x68..0x78;
const EGG_DATE: usize = 0x78;
const MET_DATE: usize = 0x7B;
const PT_EGG_LOCATION: usize = 0x44;
const PT_MET_LOCATION: usize = 0x46;
const EGG_LOCATION: usize = 0x7E;
const MET_LOCATION: usize = 0x80;
const BALL: usize = 0x83;
const HGSS_BALL: usize = 0x86;
const MET_LEVEL: usize = 0x84;
const PARTY: usize = 0x88;

/// Highest ball id Diamond and Pearl can store.
const DP_MAX_BALL: u8 = 16;

pub trait G45Variant: fmt::Debug + Sized + 'static {
    const GENERATION: Generation;

    fn decode_text(data: &[u8]) -> String;

    fn encode_text(text: &str, out: &mut [u8]);

    fn into_record(pk: G45Record<'static, Self>) -> Record<'static>;
}

#[derive(Debug)]
pub struct Gen4;

#[derive(Debug)]
pub struct Gen5;

impl G45Variant for Gen4 {
    const GENERATION: Generation = Generation::IV;

    fn decode_text(data: &[u8]) -> String {
        decode_gen4(data)
    }

    fn encode_text(text: &str, out: &mut [u8]) {
        encode_gen4(text, out);
    }

    fn into_record(pk: G45Record<'static, Self>) -> Record<'static> {
        Record::Pk4(pk)
    }
}

impl G45Variant for Gen5 {
    const GENERATION: Generation = Generation::V;

    fn decode_text(data: &[u8]) -> String {
        decode_utf16(data, G5_TERMINATOR)
    }

    fn encode_text(text: &str, out: &mut [u8]) {
        encode_utf16(text, out, G5_TERMINATOR, 0);
    }

    fn into_record(pk: G45Record<'static, Self>) -> Record<'static> {
        Record::Pk5(pk)
    }
}

#[derive(Debug)]
pub struct G45Record<'a, V> {
    buf:       RecordBuf<'a>,
    encrypted: bool,
    _variant:  PhantomData<V>,
}

pub type Pk4<'a> = G45Record<'a, Gen4>;
pub type Pk5<'a> = G45Record<'a, Gen5>;

impl<'a, V: G45Variant> G45Record<'a, V> {
    pub fn new(buf: RecordBuf<'a>, mode: RecordMode) -> Result<Self, RecordError> {
        check_len(V::GENERATION, mode, buf.len())?;
        Ok(Self::load(buf))
    }

    /// Wrap a buffer known to hold plaintext.
    pub(crate) fn wrap(buf: RecordBuf<'a>) -> Self {
        G45Record { buf, encrypted: false, _variant: PhantomData }
    }

    /// Wrap a buffer of unknown state, decrypting it if it looks encrypted.
    pub(crate) fn load(buf: RecordBuf<'a>) -> Self {
        let mut pk = Self::wrap(buf);
        pk.encrypted = pk.looks_encrypted();
        settle(&mut pk);
        pk
    }

    fn is_gen4(&self) -> bool {
        V::GENERATION == Generation::IV
    }

    pub fn encounter_type(&self) -> u8 {
        self.buf.u8_at(0x85)
    }

    pub fn set_encounter_type(&mut self, value: u8) {
        self.buf.set_u8(0x85, value);
    }

    fn party_ofs(&self, rel: usize) -> Option<usize> {
        let ofs = PARTY + rel;
        (ofs + 2 <= self.buf.len()).then_some(ofs)
    }

    fn stat_ofs(&self, stat: Stat) -> Option<usize> {
        self.party_ofs(0x08 + 2 * stat.index())
    }

    /// Location pair that prefers the Platinum field when it is set.
    fn location(&self, pt: usize, dp: usize) -> u16 {
        if self.is_gen4() {
            let value = self.buf.u16_at(pt);
            if value != 0 {
                return value;
            }
        }
        self.buf.u16_at(dp)
    }

    fn set_location(&mut self, pt: usize, dp: usize, value: u16) {
        if self.is_gen4() {
            self.buf.set_u16(pt, value);
        }
        self.buf.set_u16(dp, value);
    }
}

impl<'a> Pk4<'a> {
    pub fn shiny_leaf(&self) -> u8 {
        self.buf.u8_at(0x41)
    }

    pub fn set_shiny_leaf(&mut self, value: u8) {
        self.buf.set_u8(0x41, value);
    }
}

impl<'a> Pk5<'a> {
    pub fn n_sparkle(&self) -> bool {
        self.buf.flag(0x42, 1)
    }

    pub fn set_n_sparkle(&mut self, value: bool) {
        self.buf.set_flag(0x42, 1, value);
    }
}

impl<'a, V: G45Variant> Creature for G45Record<'a, V> {
    fn generation(&self) -> Generation {
        V::GENERATION
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
        encrypt_gen45(&mut self.buf, BLOCK_SIZE);
        self.encrypted = true;
    }

    fn decrypt(&mut self) {
        if !self.encrypted {
            return;
        }
        decrypt_gen45(&mut self.buf, BLOCK_SIZE);
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
        V::into_record(G45Record {
            buf:       self.buf.to_owned_buf(),
            encrypted: self.encrypted,
            _variant:  PhantomData,
        })
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
        Some(Ability(self.buf.u8_at(0x15) as u16))
    }

    fn set_ability(&mut self, value: Ability) {
        self.buf.set_u8(0x15, value.0 as u8);
    }

    /// The regular slot follows a PID bit: bit 0 in IV, bit 16 in V.
    fn ability_number(&self) -> u8 {
        if self.is_gen4() {
            return (self.pid() & 1) as u8;
        }
        if self.buf.flag(0x42, 0) {
            2
        } else {
            ((self.pid() >> 16) & 1) as u8
        }
    }

    /// Only the hidden flag of generation V is stored; regular slots are
    /// carried by the PID.
    fn set_ability_number(&mut self, slot: u8) {
        if !self.is_gen4() {
            self.buf.set_flag(0x42, 0, slot == 2);
        }
    }

    fn markings(&self) -> u16 {
        self.buf.u8_at(0x16) as u16
    }

    fn set_markings(&mut self, value: u16) {
        self.buf.set_u8(0x16, value as u8);
    }

    fn nature(&self) -> Nature {
        if self.is_gen4() {
            Nature::from_pid(self.pid())
        } else {
            Nature(self.buf.u8_at(0x41))
        }
    }

    fn set_nature(&mut self, value: Nature) {
        if !self.is_gen4() {
            self.buf.set_u8(0x41, value.0);
        }
    }

    fn gender(&self) -> Option<Gender> {
        Some(Gender::from_code(self.buf.bits8(FORM_BYTE, 1, 2)))
    }

    fn set_gender(&mut self, value: Gender) {
        self.buf.set_bits8(FORM_BYTE, 1, 2, value.code());
    }

    fn fateful_encounter(&self) -> bool {
        self.buf.flag(FORM_BYTE, 0)
    }

    fn set_fateful_encounter(&mut self, value: bool) {
        self.buf.set_flag(FORM_BYTE, 0, value);
    }

    fn form(&self) -> u8 {
        self.buf.bits8(FORM_BYTE, 3, 5)
    }

    fn set_form(&mut self, value: u8) {
        self.buf.set_bits8(FORM_BYTE, 3, 5, value);
    }

    fn ev(&self, stat: Stat) -> u8 {
        self.buf.u8_at(0x18 + stat.index())
    }

    fn set_ev(&mut self, stat: Stat, value: u8) {
        self.buf.set_u8(0x18 + stat.index(), value);
    }

    fn iv(&self, stat: Stat) -> u8 {
        self.buf.bits32(IV32, 5 * stat.index() as u32, 5) as u8
    }

    fn set_iv(&mut self, stat: Stat, value: u8) {
        self.buf.set_bits32(IV32, 5 * stat.index() as u32, 5, value as u32);
    }

    fn contest(&self, index: usize) -> u8 {
        if index < 6 { self.buf.u8_at(0x1E + index) } else { 0 }
    }

    fn set_contest(&mut self, index: usize, value: u8) {
        if index < 6 {
            self.buf.set_u8(0x1E + index, value);
        }
    }

    fn pokerus(&self) -> u8 {
        self.buf.u8_at(0x82)
    }

    fn set_pokerus(&mut self, value: u8) {
        self.buf.set_u8(0x82, value);
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
        Move(self.buf.u16_at(0x28 + 2 * (slot & 3)))
    }

    fn set_move_at(&mut self, slot: usize, value: Move) {
        self.buf.set_u16(0x28 + 2 * (slot & 3), value.0);
    }

    fn pp(&self, slot: usize) -> u8 {
        self.buf.u8_at(0x30 + (slot & 3))
    }

    fn set_pp(&mut self, slot: usize, value: u8) {
        self.buf.set_u8(0x30 + (slot & 3), value);
    }

    fn pp_ups(&self, slot: usize) -> u8 {
        self.buf.u8_at(0x34 + (slot & 3))
    }

    fn set_pp_ups(&mut self, slot: usize, value: u8) {
        self.buf.set_u8(0x34 + (slot & 3), value);
    }

    fn nickname(&self) -> String {
        V::decode_text(&self.buf[NICKNAME])
    }

    fn set_nickname(&mut self, value: &str) {
        V::encode_text(value, &mut self.buf[NICKNAME]);
    }

    fn ot_name(&self) -> String {
        V::decode_text(&self.buf[OT_NAME])
    }

    fn set_ot_name(&mut self, value: &str) {
        V::encode_text(value, &mut self.buf[OT_NAME]);
    }

    fn ot_gender(&self) -> Gender {
        Gender::from_code(self.buf.bits8(MET_LEVEL, 7, 1))
    }

    fn set_ot_gender(&mut self, value: Gender) {
        self.buf.set_bits8(MET_LEVEL, 7, 1, value.code());
    }

    fn ot_friendship(&self) -> u8 {
        self.buf.u8_at(0x14)
    }

    fn set_ot_friendship(&mut self, value: u8) {
        self.buf.set_u8(0x14, value);
    }

    fn language(&self) -> Language {
        Language(self.buf.u8_at(0x17))
    }

    fn set_language(&mut self, value: Language) {
        self.buf.set_u8(0x17, value.0);
    }

    fn version(&self) -> GameVersion {
        GameVersion(self.buf.u8_at(0x5F))
    }

    fn set_version(&mut self, value: GameVersion) {
        self.buf.set_u8(0x5F, value.0);
    }

    /// Generation IV keeps balls newer than Diamond and Pearl in a second
    /// byte and leaves a Poké Ball in the first.
    fn ball(&self) -> Ball {
        if self.is_gen4() {
            Ball(self.buf.u8_at(BALL).max(self.buf.u8_at(HGSS_BALL)))
        } else {
            Ball(self.buf.u8_at(BALL))
        }
    }

    fn set_ball(&mut self, value: Ball) {
        if !self.is_gen4() {
            self.buf.set_u8(BALL, value.0);
            return;
        }
        let (dp, hgss) = if value.0 <= DP_MAX_BALL { (value.0, 0) } else { (Ball::POKE.0, value.0) };
        self.buf.set_u8(BALL, dp);
        self.buf.set_u8(HGSS_BALL, hgss);
    }

    fn met_level(&self) -> u8 {
        self.buf.bits8(MET_LEVEL, 0, 7)
    }

    fn set_met_level(&mut self, value: u8) {
        self.buf.set_bits8(MET_LEVEL, 0, 7, value);
    }

    fn met_location(&self) -> u16 {
        self.location(PT_MET_LOCATION, MET_LOCATION)
    }

    fn set_met_location(&mut self, value: u16) {
        self.set_location(PT_MET_LOCATION, MET_LOCATION, value);
    }

    fn egg_location(&self) -> u16 {
        self.location(PT_EGG_LOCATION, EGG_LOCATION)
    }

    fn set_egg_location(&mut self, value: u16) {
        self.set_location(PT_EGG_LOCATION, EGG_LOCATION, value);
    }

    fn met_date(&self) -> Option<NaiveDate> {
        self.buf.date_at(MET_DATE)
    }

    fn set_met_date(&mut self, value: Option<NaiveDate>) {
        self.buf.set_date(MET_DATE, value);
    }

    fn egg_date(&self) -> Option<NaiveDate> {
        self.buf.date_at(EGG_DATE)
    }

    fn set_egg_date(&mut self, value: Option<NaiveDate>) {
        self.buf.set_date(EGG_DATE, value);
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
