//! Record payload cipher and block shuffle.
//!
//! Generation IV onward:
//!   keystream  LCRNG `seed' = seed * 0x41C64E6D + 0x6073`, one step per
//!              16-bit word, word ^= seed' >> 16
//!   shuffle    four equal blocks after the 8-byte header, order index
//!              `sv = (key >> 13) & 31`
//!
//! Generation III XORs every 32-bit payload word with `PID ^ OTID` and
//! shuffles its four 12-byte blocks by `PID % 24`.
//!
//! Decryption runs the cipher first and un-shuffles second; encryption
//! shuffles with the inverse order and then applies the cipher. Callers
//! refresh the checksum between the two, on the plain payload.

use byteorder::{ByteOrder, LittleEndian};

/// LCRNG multiplier.
pub const LCRNG_MULT: u32 = 0x41C6_4E6D;
/// LCRNG increment.
pub const LCRNG_ADD:  u32 = 0x0000_6073;

/// Offset of the first shuffled block for generation IV onward.
pub const HEADER_SIZE: usize = 8;

/// Generation III payload bounds.
pub const GEN3_PAYLOAD_START: usize = 0x20;
pub const GEN3_BLOCK_SIZE:    usize = 12;
pub const GEN3_PAYLOAD_END:   usize = GEN3_PAYLOAD_START + 4 * GEN3_BLOCK_SIZE;

/// The 24 block orders, followed by the first eight again so that any
/// 5-bit shuffle index can be used without a modulus.
pub const BLOCK_POSITION: [u8; 128] = [
    0, 1, 2, 3,
    0, 1, 3, 2,
    0, 2, 1, 3,
    0, 3, 1, 2,
    0, 2, 3, 1,
    0, 3, 2, 1,
    1, 0, 2, 3,
    1, 0, 3, 2,
    2, 0, 1, 3,
    3, 0, 1, 2,
    2, 0, 3, 1,
    3, 0, 2, 1,
    1, 2, 0, 3,
    1, 3, 0, 2,
    2, 1, 0, 3,
    3, 1, 0, 2,
    2, 3, 0, 1,
    3, 2, 0, 1,
    1, 2, 3, 0,
    1, 3, 2, 0,
    2, 1, 3, 0,
    3, 1, 2, 0,
    2, 3, 1, 0,
    3, 2, 1, 0,

    0, 1, 2, 3,
    0, 1, 3, 2,
    0, 2, 1, 3,
    0, 3, 1, 2,
    0, 2, 3, 1,
    0, 3, 2, 1,
    1, 0, 2, 3,
    1, 0, 3, 2,
];

/// `BLOCK_POSITION_INVERT[sv]` is the order that undoes order `sv`.
pub const BLOCK_POSITION_INVERT: [u8; 32] = [
    0, 1, 2, 4, 3, 5, 6, 7, 12, 18, 13, 19, 8, 10, 14, 20, 16, 22, 9, 11, 15, 21, 17, 23,
    0, 1, 2, 4, 3, 5, 6, 7,
];

/// Advance the generator once and return the keystream word it yields.
#[inline]
pub fn keystream_word(seed: u32) -> (u16, u32) {
    let next = seed.wrapping_mul(LCRNG_MULT).wrapping_add(LCRNG_ADD);
    ((next >> 16) as u16, next)
}

/// XOR every little-endian 16-bit word of `data` with the keystream seeded by `seed`.
///
/// Self-inverse: running it twice with the same seed restores the input.
pub fn crypt_array(data: &mut [u8], mut seed: u32) {
    for word in data.chunks_exact_mut(2) {
        let (xor, next) = keystream_word(seed);
        seed = next;
        let value = LittleEndian::read_u16(word) ^ xor;
        LittleEndian::write_u16(word, value);
    }
}

/// XOR every little-endian 32-bit word of `data` with `key`.
pub fn crypt_gen3(data: &mut [u8], key: u32) {
    for word in data.chunks_exact_mut(4) {
        let value = LittleEndian::read_u32(word) ^ key;
        LittleEndian::write_u32(word, value);
    }
}

/// Shuffle index for generation IV onward.
#[inline]
pub fn shuffle_index(key: u32) -> usize {
    ((key >> 13) & 31) as usize
}

/// Index of the order that restores the block layout produced by `sv`.
#[inline]
pub fn invert_order(sv: usize) -> usize {
    BLOCK_POSITION_INVERT[sv] as usize
}

/// Rearrange the four `block_size` blocks starting at `start`: block `i`
/// of the result is block `BLOCK_POSITION[sv * 4 + i]` of the input.
pub fn block_shuffle(data: &mut [u8], start: usize, block_size: usize, sv: usize) {
    let end = start + 4 * block_size;
    let back = data[start..end].to_vec();
    let order = &BLOCK_POSITION[sv * 4..sv * 4 + 4];
    for (block, &src) in order.iter().enumerate() {
        let src = src as usize * block_size;
        let dest = start + block * block_size;
        data[dest..dest + block_size].copy_from_slice(&back[src..src + block_size]);
    }
}

// ── Generation IV / V ────────────────────────────────────────────────────────

/// Block pass keyed by the stored checksum, party pass keyed by the PID.
pub fn decrypt_gen45(data: &mut [u8], block_size: usize) {
    let pid = LittleEndian::read_u32(&data[0..4]);
    let chk = LittleEndian::read_u16(&data[6..8]) as u32;
    crypt_gen45(data, block_size, pid, chk);
    block_shuffle(data, HEADER_SIZE, block_size, shuffle_index(pid));
}

pub fn encrypt_gen45(data: &mut [u8], block_size: usize) {
    let pid = LittleEndian::read_u32(&data[0..4]);
    let chk = LittleEndian::read_u16(&data[6..8]) as u32;
    block_shuffle(data, HEADER_SIZE, block_size, invert_order(shuffle_index(pid)));
    crypt_gen45(data, block_size, pid, chk);
}

fn crypt_gen45(data: &mut [u8], block_size: usize, pid: u32, chk: u32) {
    let end = HEADER_SIZE + 4 * block_size;
    crypt_array(&mut data[HEADER_SIZE..end], chk);
    if data.len() > end {
        crypt_array(&mut data[end..], pid);
    }
}

// ── Generation VI onward ─────────────────────────────────────────────────────

/// Both passes keyed by the encryption constant, each from a fresh seed.
pub fn decrypt_gen6(data: &mut [u8], block_size: usize) {
    let ec = LittleEndian::read_u32(&data[0..4]);
    crypt_gen6(data, block_size, ec);
    block_shuffle(data, HEADER_SIZE, block_size, shuffle_index(ec));
}

pub fn encrypt_gen6(data: &mut [u8], block_size: usize) {
    let ec = LittleEndian::read_u32(&data[0..4]);
    block_shuffle(data, HEADER_SIZE, block_size, invert_order(shuffle_index(ec)));
    crypt_gen6(data, block_size, ec);
}

fn crypt_gen6(data: &mut [u8], block_size: usize, ec: u32) {
    let end = HEADER_SIZE + 4 * block_size;
    crypt_array(&mut data[HEADER_SIZE..end], ec);
    if data.len() > end {
        crypt_array(&mut data[end..], ec);
    }
}

// ── Generation III ───────────────────────────────────────────────────────────

pub fn decrypt_gen3(data: &mut [u8]) {
    let pid = LittleEndian::read_u32(&data[0..4]);
    let otid = LittleEndian::read_u32(&data[4..8]);
    crypt_gen3(&mut data[GEN3_PAYLOAD_START..GEN3_PAYLOAD_END], pid ^ otid);
    block_shuffle(data, GEN3_PAYLOAD_START, GEN3_BLOCK_SIZE, (pid % 24) as usize);
}

pub fn encrypt_gen3(data: &mut [u8]) {
    let pid = LittleEndian::read_u32(&data[0..4]);
    let otid = LittleEndian::read_u32(&data[4..8]);
    let sv = invert_order((pid % 24) as usize);
    block_shuffle(data, GEN3_PAYLOAD_START, GEN3_BLOCK_SIZE, sv);
    crypt_gen3(&mut data[GEN3_PAYLOAD_START..GEN3_PAYLOAD_END], pid ^ otid);
}
