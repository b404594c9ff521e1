//! Backward steps: VII → VI → V → IV.
//!
//! | Step    | PID work                                                  |
//! |---------|-----------------------------------------------------------|
//! | VII→VI  | none; both use the same layout family and shiny window    |
//! | VI→V    | ability slot into bit 16, then shininess in the low word  |
//! | V→IV    | reroll until nature, ability bit, gender and shininess fit |
//!
//! Nothing moves back out of VIII, LGPE or into III.

use tracing::{debug, warn};

use crate::crypto::keystream_word;
use crate::data::GameData;
use crate::record::{Creature, Record};
use crate::types::{Gender, Generation, Nature};

use super::{finish, transfer, DestinationContext};

/// Candidates tried before a V→IV step gives up.
pub const MAX_REROLLS: u32 = 100_000;

pub(crate) fn step(
    src:  &dyn Creature,
    dest: Generation,
    ctx:  &DestinationContext,
    data: &dyn GameData,
) -> Option<Record<'static>> {
    match (src.generation(), dest) {
        (Generation::V, Generation::IV)
        | (Generation::VI, Generation::V)
        | (Generation::VII, Generation::VI) => {}
        (from, to) => {
            debug!(from = ?from, to = ?to, "no backward step");
            return None;
        }
    }

    let shiny = src.is_shiny();
    let mut dst = transfer(src, dest, ctx, data)?;
    match dest {
        Generation::IV => {
            let pid = reroll_pid(src, &*dst, data)?;
            dst.set_pid(pid);
        }
        Generation::V => align_ability_bit(src.ability_number(), &mut *dst),
        _ => {}
    }
    narrow_shininess(shiny, &mut *dst);
    Some(finish(src, dst, data))
}

// ── PID fixes ────────────────────────────────────────────────────────────────

/// Generation V reads regular ability slots from PID bit 16.
fn align_ability_bit(slot: u8, dst: &mut dyn Creature) {
    if slot >= 2 {
        return;
    }
    let pid = (dst.pid() & !0x0001_0000) | (slot as u32) << 16;
    dst.set_pid(pid);
}

/// Rewrite the low PID word so shininess matches `shiny` under the
/// destination's window. The high word, and with it bit 16, stays put.
pub(crate) fn narrow_shininess(shiny: bool, dst: &mut dyn Creature) {
    if dst.is_shiny() == shiny {
        return;
    }
    let pid = dst.pid();
    let hi = pid >> 16;
    let lo = if shiny {
        hi ^ (dst.tid() ^ dst.sid()) as u32 ^ (pid & 7)
    } else {
        (pid & 0xFFFF) ^ 0x8000
    };
    let new = (hi << 16) | (lo & 0xFFFF);
    debug!(old = pid, new, shiny, "rewriting PID low word");
    dst.set_pid(new);
}

/// Find a generation IV PID agreeing with what the source stores
/// explicitly. The source PID is tried first, then an LCRNG sequence
/// seeded by it.
fn reroll_pid(src: &dyn Creature, dst: &dyn Creature, data: &dyn GameData) -> Option<u32> {
    let want = Want {
        nature: src.nature(),
        slot:   match src.ability_number() {
            2 => 0,
            s => s as u32,
        },
        gender: dst.gender(),
        ratio:  data.personal(dst.generation(), dst.species(), dst.form()).map(|p| p.gender_ratio),
        shiny:  src.is_shiny(),
        txor:   (src.tid() ^ src.sid()) as u32,
    };

    if want.fits(src.pid()) {
        return Some(src.pid());
    }

    let mut seed = src.pid();
    for _ in 0..MAX_REROLLS {
        let (hi, next) = keystream_word(seed);
        let (lo, next) = keystream_word(next);
        seed = next;
        let (hi, mut lo) = (hi as u32, lo as u32);
        if want.shiny {
            lo = (hi ^ want.txor ^ (lo & 7)) & 0xFFFF;
        }
        let pid = (hi << 16) | lo;
        if want.fits(pid) {
            debug!(old = src.pid(), new = pid, "rerolled PID");
            return Some(pid);
        }
    }
    warn!(pid = src.pid(), species = src.species().0, "no PID found for generation IV");
    None
}

struct Want {
    nature: Nature,
    slot:   u32,
    gender: Option<Gender>,
    /// Without personal data the gender is not checked.
    ratio:  Option<u8>,
    shiny:  bool,
    txor:   u32,
}

impl Want {
    fn fits(&self, pid: u32) -> bool {
        let gender_ok = match (self.ratio, self.gender) {
            (Some(ratio), Some(gender)) => Gender::from_pid(pid, ratio) == gender,
            _ => true,
        };
        let xor = ((pid >> 16) ^ (pid & 0xFFFF) ^ self.txor) >> Generation::IV.shiny_shift();
        Nature::from_pid(pid) == self.nature
            && pid & 1 == self.slot
            && gender_ok
            && (xor == 0) == self.shiny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::data::NoData;
    use crate::record::empty;
    use crate::types::{Move, RecordMode, Species};

    fn ctx() -> DestinationContext {
        DestinationContext { today: NaiveDate::from_ymd_opt(2011, 6, 1), ..Default::default() }
    }

    fn pk5(pid: u32, nature: Nature) -> Record<'static> {
        let mut pk = empty(Generation::V, RecordMode::Box);
        pk.set_species(Species(133));
        pk.set_pid(pid);
        pk.set_nature(nature);
        pk.refresh_checksum();
        pk
    }

    #[test]
    fn test_matching_pid_is_kept() {
        let pk = pk5(100, Nature(0));
        let pk4 = step(&*pk, Generation::IV, &ctx(), &NoData).unwrap();
        assert_eq!(pk4.pid(), 100);
        assert!(pk4.is_checksum_valid());
    }

    #[test]
    fn test_explicit_nature_forces_reroll() {
        let pk = pk5(100, Nature::MODEST);
        let pk4 = step(&*pk, Generation::IV, &ctx(), &NoData).unwrap();
        assert_ne!(pk4.pid(), 100);
        assert_eq!(pk4.nature(), Nature::MODEST);
        assert_eq!(pk4.pid() & 1, 0);
        assert!(!pk4.is_shiny());
    }

    #[test]
    fn test_reroll_keeps_shiny() {
        let (tid, sid) = (12345u16, 54321u16);
        let hi = 0x1234u32;
        let lo = hi ^ (tid ^ sid) as u32;
        let mut pk = pk5((hi << 16) | lo, Nature::ADAMANT);
        pk.set_tid(tid);
        pk.set_sid(sid);
        pk.refresh_checksum();
        assert!(pk.is_shiny());

        let pk4 = step(&*pk, Generation::IV, &ctx(), &NoData).unwrap();
        assert!(pk4.is_shiny());
        assert_eq!(pk4.nature(), Nature::ADAMANT);
    }

    #[test]
    fn test_wider_window_shiny_is_kept_in_v() {
        let mut pk = empty(Generation::VI, RecordMode::Box);
        pk.set_species(Species(25));
        pk.set_encryption_constant(0xDEAD_BEEF);
        pk.set_pid(0x0000_000C);
        pk.refresh_checksum();
        assert!(pk.is_shiny());

        let pk5 = step(&*pk, Generation::V, &ctx(), &NoData).unwrap();
        assert!(pk5.is_shiny());
        assert_eq!(pk5.pid(), 0x0000_0004);
    }

    #[test]
    fn test_ability_slot_lands_in_bit_16() {
        let mut pk = empty(Generation::VI, RecordMode::Box);
        pk.set_species(Species(94));
        pk.set_pid(0x4000_0000);
        pk.set_ability_number(1);
        pk.refresh_checksum();
        let pk5 = step(&*pk, Generation::V, &ctx(), &NoData).unwrap();
        assert_eq!(pk5.pid() & 0x0001_0000, 0x0001_0000);
        assert_eq!(pk5.ability_number(), 1);
    }

    #[test]
    fn test_unsupported_pairs() {
        let pk8 = empty(Generation::VIII, RecordMode::Box);
        assert!(step(&*pk8, Generation::VII, &ctx(), &NoData).is_none());
        let pk4 = empty(Generation::IV, RecordMode::Box);
        assert!(step(&*pk4, Generation::III, &ctx(), &NoData).is_none());
    }

    #[test]
    fn test_relearn_kept_when_move_is_stripped() {
        let mut pk = empty(Generation::VII, RecordMode::Box);
        pk.set_species(Species(25));
        pk.set_moves([Move(700), Move(84), Move::NONE, Move::NONE]);
        pk.set_relearn_move(0, Move(84));
        pk.set_relearn_move(1, Move(700));
        pk.refresh_checksum();
        let pk6 = step(&*pk, Generation::VI, &ctx(), &NoData).unwrap();
        assert_eq!(pk6.moves(), [Move(84), Move::NONE, Move::NONE, Move::NONE]);
        assert_eq!(pk6.relearn_move(0), Move(84));
        assert_eq!(pk6.relearn_move(1), Move::NONE);
    }

    #[test]
    fn test_species_missing_from_destination() {
        let mut pk = empty(Generation::VII, RecordMode::Box);
        pk.set_species(Species(800));
        pk.refresh_checksum();
        assert!(step(&*pk, Generation::VI, &ctx(), &NoData).is_none());
    }
}
