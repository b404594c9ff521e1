//! In-record text encodings.
//!
//! | Generation | Encoding | Terminator |
//! |---|---|---|
//! | III | 8-bit proprietary table | 0xFF |
//! | IV | 16-bit proprietary table | 0xFFFF |
//! | V | UTF-16LE, glyphs in U+2460.. | 0xFFFF |
//! | VI+ | UTF-16LE, glyphs in U+E080.. | 0x0000 |
//!
//! Record accessors hand out the text as the game stores it: III and IV are
//! decoded through their character tables, V onward keep their private-use
//! glyph codepoints. [`to_unicode`] and [`from_unicode`] move text between
//! a generation's glyphs and plain Unicode.

use std::collections::HashMap;
use std::sync::OnceLock;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::types::Generation;

pub const G3_TERMINATOR: u8 = 0xFF;
pub const G4_TERMINATOR: u16 = 0xFFFF;
pub const G5_TERMINATOR: u16 = 0xFFFF;
pub const G6_TERMINATOR: u16 = 0x0000;

/// A bidirectional code ↔ character table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(u16, char)>", into = "Vec<(u16, char)>")]
pub struct CharTable {
    to_char: HashMap<u16, char>,
    to_code: HashMap<char, u16>,
}

impl CharTable {
    pub fn from_pairs<I: IntoIterator<Item = (u16, char)>>(pairs: I) -> Self {
        let mut table = CharTable::default();
        for (code, ch) in pairs {
            table.to_char.insert(code, ch);
            table.to_code.entry(ch).or_insert(code);
        }
        table
    }

    pub fn decode(&self, code: u16) -> Option<char> {
        self.to_char.get(&code).copied()
    }

    pub fn encode(&self, ch: char) -> Option<u16> {
        self.to_code.get(&ch).copied()
    }
}

impl From<Vec<(u16, char)>> for CharTable {
    fn from(pairs: Vec<(u16, char)>) -> Self {
        CharTable::from_pairs(pairs)
    }
}

impl From<CharTable> for Vec<(u16, char)> {
    fn from(table: CharTable) -> Self {
        let mut pairs: Vec<(u16, char)> = table.to_char.into_iter().collect();
        pairs.sort_unstable();
        pairs
    }
}

fn run(first_code: u16, chars: std::ops::RangeInclusive<char>) -> impl Iterator<Item = (u16, char)> {
    chars.enumerate().map(move |(i, c)| (first_code + i as u16, c))
}

/// Western generation III table.
pub fn gen3_table() -> &'static CharTable {
    static TABLE: OnceLock<CharTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let punctuation = [
            (0x00, ' '), (0xAB, '!'), (0xAC, '?'), (0xAD, '.'), (0xAE, '-'),
            (0xB0, '…'), (0xB1, '“'), (0xB2, '”'), (0xB3, '‘'), (0xB4, '’'),
            (0xB5, '♂'), (0xB6, '♀'), (0xB8, ','), (0xBA, '/'),
        ];
        CharTable::from_pairs(
            run(0xA1, '0'..='9')
                .chain(run(0xBB, 'A'..='Z'))
                .chain(run(0xD5, 'a'..='z'))
                .chain(punctuation),
        )
    })
}

/// Western generation IV table.
pub fn gen4_table() -> &'static CharTable {
    static TABLE: OnceLock<CharTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let punctuation = [
            (0x01DE, ' '), (0x01AB, '!'), (0x01AC, '?'), (0x01AD, ','), (0x01AE, '.'),
            (0x01AF, '…'), (0x01B1, '/'), (0x01B2, '‘'), (0x01B3, '’'), (0x01B4, '“'),
            (0x01B5, '”'), (0x01B9, '('), (0x01BA, ')'), (0x01BB, '♂'), (0x01BC, '♀'),
            (0x01BD, '+'), (0x01BE, '-'), (0x01C4, ':'), (0x01C5, ';'),
        ];
        CharTable::from_pairs(
            run(0x0121, '0'..='9')
                .chain(run(0x012B, 'A'..='Z'))
                .chain(run(0x0145, 'a'..='z'))
                .chain(punctuation),
        )
    })
}

// ── Glyph remaps ─────────────────────────────────────────────────────────────

/// `(unicode, generation V glyph)`.
const G5_GLYPHS: &[(char, char)] = &[
    ('×', '\u{2467}'),
    ('÷', '\u{2468}'),
    ('…', '\u{246C}'),
    ('♂', '\u{246D}'),
    ('♀', '\u{246E}'),
    ('♠', '\u{246F}'),
    ('♣', '\u{2470}'),
    ('♥', '\u{2471}'),
    ('♦', '\u{2472}'),
    ('★', '\u{2473}'),
    ('◎', '\u{2474}'),
    ('○', '\u{2475}'),
    ('□', '\u{2476}'),
    ('△', '\u{2477}'),
    ('◇', '\u{2478}'),
    ('♪', '\u{2479}'),
    ('☀', '\u{247A}'),
    ('☁', '\u{247B}'),
    ('☂', '\u{247C}'),
    ('☃', '\u{247D}'),
];

/// `(unicode, generation VI+ glyph)`.
const G6_GLYPHS: &[(char, char)] = &[
    ('♂', '\u{E08E}'),
    ('♀', '\u{E08F}'),
    ('…', '\u{E08D}'),
    ('×', '\u{E088}'),
    ('÷', '\u{E089}'),
    ('☀', '\u{E081}'),
    ('☁', '\u{E082}'),
    ('☂', '\u{E083}'),
    ('☃', '\u{E084}'),
    ('♪', '\u{E085}'),
    ('★', '\u{E086}'),
    ('♥', '\u{E087}'),
];

/// First private-use code of the generation VII Chinese glyph block.
pub const G7_ZH_BASE: u32 = 0xE800;

/// Chinese characters stored from `G7_ZH_BASE` upward, in code order.
/// Characters missing here are written as plain Unicode.
const G7_ZH_GLYPHS: &str = "妙蛙种子草花小火龙恐喷杰尼龟卡咪水箭绿毛虫铁甲蛹巴大蝶独角壳针蜂波比鸟拉达烈雀嘴阿柏蛇怪皮丘雷穿山鼠王多兰娜后朗力诺可西六尾九胖丁超音蝠走路臭霸派斯特";

fn zh_glyph(c: char) -> Option<char> {
    let index = G7_ZH_GLYPHS.chars().position(|z| z == c)?;
    char::from_u32(G7_ZH_BASE + index as u32)
}

fn zh_unicode(glyph: char) -> Option<char> {
    let index = (glyph as u32).checked_sub(G7_ZH_BASE)?;
    G7_ZH_GLYPHS.chars().nth(index as usize)
}

fn glyphs(generation: Generation) -> &'static [(char, char)] {
    match generation {
        Generation::III | Generation::IV => &[],
        Generation::V => G5_GLYPHS,
        _ => G6_GLYPHS,
    }
}

/// Generation VII and later also carry the Chinese glyph block.
fn has_zh_block(generation: Generation) -> bool {
    generation.number() >= 7
}

/// Replace a generation's private-use glyphs with their Unicode characters.
pub fn to_unicode(generation: Generation, text: &str) -> String {
    let table = glyphs(generation);
    let zh = has_zh_block(generation);
    text.chars()
        .map(|c| match table.iter().find(|(_, g)| *g == c) {
            Some((u, _)) => *u,
            None if zh => zh_unicode(c).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// Replace Unicode characters with a generation's private-use glyphs.
pub fn from_unicode(generation: Generation, text: &str) -> String {
    let table = glyphs(generation);
    let zh = has_zh_block(generation);
    text.chars()
        .map(|c| match table.iter().find(|(u, _)| *u == c) {
            Some((_, g)) => *g,
            None if zh => zh_glyph(c).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// Carry text from one generation's glyph set into another's.
pub fn transcode(from: Generation, to: Generation, text: &str) -> String {
    from_unicode(to, &to_unicode(from, text))
}

// ── Codecs ───────────────────────────────────────────────────────────────────

pub fn decode_gen3(data: &[u8]) -> String {
    let table = gen3_table();
    data.iter()
        .take_while(|&&b| b != G3_TERMINATOR)
        .filter_map(|&b| table.decode(b as u16))
        .collect()
}

/// Write `text` into `out`, terminated and padded with 0xFF. Characters
/// without a code are dropped; text is truncated to fit.
pub fn encode_gen3(text: &str, out: &mut [u8]) {
    let table = gen3_table();
    out.fill(G3_TERMINATOR);
    let codes = text.chars().filter_map(|c| table.encode(c));
    for (slot, code) in out.iter_mut().zip(codes) {
        *slot = code as u8;
    }
}

pub fn decode_gen4(data: &[u8]) -> String {
    let table = gen4_table();
    data.chunks_exact(2)
        .map(LittleEndian::read_u16)
        .take_while(|&w| w != G4_TERMINATOR)
        .filter_map(|w| table.decode(w))
        .collect()
}

/// Write `text` into `out`, leaving room for the terminator.
pub fn encode_gen4(text: &str, out: &mut [u8]) {
    let table = gen4_table();
    let codes: Vec<u16> = text.chars().filter_map(|c| table.encode(c)).collect();
    write_words(&codes, out, G4_TERMINATOR, G4_TERMINATOR);
}

pub fn decode_utf16(data: &[u8], terminator: u16) -> String {
    let words: Vec<u16> = data
        .chunks_exact(2)
        .map(LittleEndian::read_u16)
        .take_while(|&w| w != terminator)
        .collect();
    String::from_utf16_lossy(&words)
}

/// Write `text` as UTF-16LE into `out`, terminated, padded with `padding`.
pub fn encode_utf16(text: &str, out: &mut [u8], terminator: u16, padding: u16) {
    let words: Vec<u16> = text.encode_utf16().collect();
    write_words(&words, out, terminator, padding);
}

fn write_words(words: &[u16], out: &mut [u8], terminator: u16, padding: u16) {
    let capacity = out.len() / 2;
    let used = words.len().min(capacity.saturating_sub(1));
    for (i, slot) in out.chunks_exact_mut(2).enumerate() {
        let value = match i {
            i if i < used => words[i],
            i if i == used => terminator,
            _ => padding,
        };
        LittleEndian::write_u16(slot, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen3_text() {
        let mut buf = [0u8; 10];
        encode_gen3("Bulba 7!", &mut buf);
        assert_eq!(buf[0], 0xBC);
        assert_eq!(buf[8], 0xFF);
        assert_eq!(decode_gen3(&buf), "Bulba 7!");
    }

    #[test]
    fn test_gen4_text_truncates_before_terminator() {
        let mut buf = [0u8; 8];
        encode_gen4("ABCDE", &mut buf);
        assert_eq!(LittleEndian::read_u16(&buf[6..]), G4_TERMINATOR);
        assert_eq!(decode_gen4(&buf), "ABC");
    }

    #[test]
    fn test_gen4_quotes() {
        let table = gen4_table();
        assert_eq!(table.encode('‘'), Some(0x01B2));
        assert_eq!(table.encode('’'), Some(0x01B3));
        assert_eq!(table.encode('“'), Some(0x01B4));
        assert_eq!(table.decode(0x01B5), Some('”'));

        let mut buf = [0u8; 12];
        encode_gen4("“Mr.”", &mut buf);
        assert_eq!(LittleEndian::read_u16(&buf), 0x01B4);
        assert_eq!(decode_gen4(&buf), "“Mr.”");
    }

    #[test]
    fn test_utf16_padding() {
        let mut buf = [0xAAu8; 8];
        encode_utf16("Hi", &mut buf, 0, 0);
        assert_eq!(buf, [b'H', 0, b'i', 0, 0, 0, 0, 0]);
        assert_eq!(decode_utf16(&buf, 0), "Hi");
    }

    #[test]
    fn test_glyph_transcoding() {
        let g5 = from_unicode(Generation::V, "Nido♂");
        assert_eq!(g5, "Nido\u{246D}");
        assert_eq!(transcode(Generation::V, Generation::VI, &g5), "Nido\u{E08E}");
        assert_eq!(transcode(Generation::VII, Generation::IV, "\u{E08F}"), "♀");
    }

    #[test]
    fn test_chinese_glyphs_remap_from_vii() {
        let pika = transcode(Generation::VI, Generation::VII, "皮卡丘♂");
        let codes: Vec<u32> = pika.chars().map(|c| c as u32).collect();
        assert_eq!(codes[3], 0xE08E);
        assert!(codes[..3].iter().all(|&c| c >= G7_ZH_BASE));
        assert_eq!(to_unicode(Generation::VII, &pika), "皮卡丘♂");
        assert_eq!(transcode(Generation::VII, Generation::VI, &pika), "皮卡丘\u{E08E}");
        assert_eq!(from_unicode(Generation::VI, "皮"), "皮");
        assert_eq!(from_unicode(Generation::VIII, "妙"), "\u{E800}");
    }

    #[test]
    fn test_unlisted_chinese_passes_through() {
        assert_eq!(from_unicode(Generation::VII, "龍"), "龍");
        assert_eq!(to_unicode(Generation::VII, "\u{EFFF}"), "\u{EFFF}");
    }

    #[test]
    fn test_char_table_json() {
        let table: CharTable = serde_json::from_str(r#"[[1,"a"],[2,"b"]]"#).unwrap();
        assert_eq!(table.decode(2), Some('b'));
        assert_eq!(table.encode('a'), Some(1));
    }
}
