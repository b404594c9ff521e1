use std::ops::{Deref, DerefMut};

use byteorder::{ByteOrder, LittleEndian};
use chrono::{Datelike, NaiveDate};

/// Storage behind a record: a private copy, or caller memory that every
/// encrypt, decrypt and field write mutates in place.
#[derive(Debug)]
pub enum RecordBuf<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut [u8]),
}

impl<'a> RecordBuf<'a> {
    pub fn is_borrowed(&self) -> bool {
        matches!(self, RecordBuf::Borrowed(_))
    }

    /// Independent owned copy of the current bytes.
    pub fn to_owned_buf(&self) -> RecordBuf<'static> {
        RecordBuf::Owned(self.to_vec())
    }

    #[inline]
    pub fn u8_at(&self, ofs: usize) -> u8 {
        self[ofs]
    }

    #[inline]
    pub fn set_u8(&mut self, ofs: usize, value: u8) {
        self[ofs] = value;
    }

    #[inline]
    pub fn u16_at(&self, ofs: usize) -> u16 {
        LittleEndian::read_u16(&self[ofs..ofs + 2])
    }

    #[inline]
    pub fn set_u16(&mut self, ofs: usize, value: u16) {
        LittleEndian::write_u16(&mut self[ofs..ofs + 2], value);
    }

    #[inline]
    pub fn u32_at(&self, ofs: usize) -> u32 {
        LittleEndian::read_u32(&self[ofs..ofs + 4])
    }

    #[inline]
    pub fn set_u32(&mut self, ofs: usize, value: u32) {
        LittleEndian::write_u32(&mut self[ofs..ofs + 4], value);
    }

    #[inline]
    pub fn flag(&self, ofs: usize, bit: u8) -> bool {
        (self[ofs] >> bit) & 1 == 1
    }

    pub fn set_flag(&mut self, ofs: usize, bit: u8, value: bool) {
        let mask = 1u8 << bit;
        self[ofs] = if value { self[ofs] | mask } else { self[ofs] & !mask };
    }

    /// `width` bits of the byte at `ofs`, starting at `shift`.
    pub fn bits8(&self, ofs: usize, shift: u8, width: u8) -> u8 {
        (self[ofs] >> shift) & mask8(width)
    }

    /// Write `value` masked to `width` bits.
    pub fn set_bits8(&mut self, ofs: usize, shift: u8, width: u8, value: u8) {
        let mask = mask8(width) << shift;
        self[ofs] = (self[ofs] & !mask) | ((value << shift) & mask);
    }

    pub fn bits16(&self, ofs: usize, shift: u32, width: u32) -> u16 {
        ((self.u16_at(ofs) as u32 >> shift) & mask32(width)) as u16
    }

    pub fn set_bits16(&mut self, ofs: usize, shift: u32, width: u32, value: u16) {
        let mask = mask32(width) << shift;
        let word = (self.u16_at(ofs) as u32 & !mask) | ((value as u32) << shift & mask);
        self.set_u16(ofs, word as u16);
    }

    pub fn bits32(&self, ofs: usize, shift: u32, width: u32) -> u32 {
        (self.u32_at(ofs) >> shift) & mask32(width)
    }

    pub fn set_bits32(&mut self, ofs: usize, shift: u32, width: u32, value: u32) {
        let mask = mask32(width) << shift;
        let word = (self.u32_at(ofs) & !mask) | ((value << shift) & mask);
        self.set_u32(ofs, word);
    }

    /// Three-byte `(year - 2000, month, day)` date; all zero means unset.
    pub fn date_at(&self, ofs: usize) -> Option<NaiveDate> {
        let (y, m, d) = (self[ofs], self[ofs + 1], self[ofs + 2]);
        if y == 0 && m == 0 && d == 0 {
            return None;
        }
        NaiveDate::from_ymd_opt(2000 + y as i32, m as u32, d as u32)
    }

    pub fn set_date(&mut self, ofs: usize, value: Option<NaiveDate>) {
        let bytes = match value {
            Some(date) => [(date.year() - 2000).clamp(0, 255) as u8, date.month() as u8, date.day() as u8],
            None => [0, 0, 0],
        };
        self[ofs..ofs + 3].copy_from_slice(&bytes);
    }
}

#[inline]
fn mask8(width: u8) -> u8 {
    if width >= 8 { 0xFF } else { (1u8 << width) - 1 }
}

#[inline]
fn mask32(width: u32) -> u32 {
    if width >= 32 { u32::MAX } else { (1u32 << width) - 1 }
}

impl Deref for RecordBuf<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            RecordBuf::Owned(v)    => v,
            RecordBuf::Borrowed(s) => s,
        }
    }
}

impl DerefMut for RecordBuf<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            RecordBuf::Owned(v)    => v,
            RecordBuf::Borrowed(s) => s,
        }
    }
}
