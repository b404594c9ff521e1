//! Cross-generation conversion.
//!
//! [`convert`] performs exactly one step along the transfer chain:
//!
//! ```text
//! III → IV → V → VI → VII → VIII      forward
//!       IV ← V ← VI ← VII             backward
//! ```
//!
//! LGPE sits beside VII and has no step in either direction. Longer moves
//! go through [`convert_chain`], which stops at the first failed step.
//! Conversion never mutates its source and always returns an owned record.

pub mod backward;
pub mod forward;

use std::cmp::Ordering;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::GameData;
use crate::record::{empty, Creature, Record};
use crate::ribbon::{ribbons_of, ribbon_offset, BATTLE_MEMORY, G3_CONTEST, G4_CONTEST};
use crate::tables::{clamp_item, is_transfer_denied, limits, transfer_location, TRANSFER_FRIENDSHIP};
use crate::text::{from_unicode, to_unicode, transcode};
use crate::types::{Ability, Ball, Gender, Generation, Item, Language, Move, RecordMode, Stat};

/// Most contest ribbons the generation VI memory counter can record.
const MAX_CONTEST_MEMORY: u8 = 40;
const MAX_BATTLE_MEMORY: u8 = 8;

// ── DestinationContext ───────────────────────────────────────────────────────

/// The trainer receiving the record, and bounds of the destination game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationContext {
    pub trainer_name:   String,
    pub tid:            u16,
    pub sid:            u16,
    pub gender:         Gender,
    /// Used for species names when the record carries no language.
    pub language:       Language,
    pub country:        u8,
    pub region:         u8,
    pub console_region: u8,
    /// Met date to stamp; the local date when unset.
    pub today:          Option<NaiveDate>,
    /// Highest move id kept, overriding the destination's own bound.
    pub max_move:       Option<u16>,
    /// Highest item id kept, overriding the destination's own bound.
    pub max_item:       Option<u16>,
}

impl Default for DestinationContext {
    fn default() -> Self {
        Self {
            trainer_name:   String::new(),
            tid:            0,
            sid:            0,
            gender:         Gender::Male,
            language:       Language::ENG,
            country:        0,
            region:         0,
            console_region: 0,
            today:          None,
            max_move:       None,
            max_item:       None,
        }
    }
}

impl DestinationContext {
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn max_move(&self, generation: Generation) -> u16 {
        self.max_move.unwrap_or(limits(generation).max_move)
    }

    pub fn max_item(&self, generation: Generation) -> u16 {
        self.max_item.unwrap_or(limits(generation).max_item)
    }

    /// Whether this trainer is the record's original trainer.
    fn owns(&self, src: &dyn Creature) -> bool {
        self.tid == src.tid()
            && self.sid == src.sid()
            && self.trainer_name == to_unicode(src.generation(), &src.ot_name())
    }
}

// ── Entry points ─────────────────────────────────────────────────────────────

/// Convert `src` one step to `target`.
///
/// Returns `None` when no step connects the two generations or the record
/// cannot exist in `target`. Converting to the source's own generation
/// returns an owned copy.
pub fn convert(
    src:    &dyn Creature,
    target: Generation,
    ctx:    &DestinationContext,
    data:   &dyn GameData,
) -> Option<Record<'static>> {
    let from = src.generation();
    if from == target {
        return Some(src.clone_owned());
    }

    let result = if from.successor() == Some(target) {
        forward::step(src, target, ctx, data)
    } else if from.predecessor() == Some(target) {
        backward::step(src, target, ctx, data)
    } else {
        None
    };

    match &result {
        Some(dst) => debug!(
            from = ?from,
            to = ?target,
            species = dst.species().0,
            pid = dst.pid(),
            "converted record"
        ),
        None => warn!(from = ?from, to = ?target, species = src.species().0, "conversion step failed"),
    }
    result
}

/// Apply single steps until `target` is reached.
pub fn convert_chain(
    src:    &dyn Creature,
    target: Generation,
    ctx:    &DestinationContext,
    data:   &dyn GameData,
) -> Option<Record<'static>> {
    let mut current = src.clone_owned();
    while current.generation() != target {
        let from = current.generation();
        if from == Generation::LGPE || target == Generation::LGPE {
            warn!(from = ?from, to = ?target, "no conversion path");
            return None;
        }
        let next = match target.number().cmp(&from.number()) {
            Ordering::Greater => from.successor(),
            Ordering::Less    => from.predecessor(),
            Ordering::Equal   => None,
        }?;
        current = convert(&*current, next, ctx, data)?;
    }
    Some(current)
}

// ── Shared step ──────────────────────────────────────────────────────────────

/// Build the destination record from the fields every step carries the
/// same way. Direction-specific PID work happens in the callers.
pub(crate) fn transfer(
    src:  &dyn Creature,
    dest: Generation,
    ctx:  &DestinationContext,
    data: &dyn GameData,
) -> Option<Record<'static>> {
    let from = src.generation();
    let bounds = limits(dest);
    if src.species().0 > bounds.max_species {
        debug!(species = src.species().0, to = ?dest, "species does not exist in destination");
        return None;
    }

    let mut dst = empty(dest, src.mode());
    dst.set_encryption_constant(src.encryption_constant());
    dst.set_pid(src.pid());
    dst.set_tid(src.tid());
    dst.set_sid(src.sid());
    dst.set_species(src.species());
    dst.set_form(src.form());
    dst.set_exp(src.exp());
    dst.set_ivs(src.ivs());
    dst.set_evs(src.evs());
    for i in 0..6 {
        dst.set_contest(i, src.contest(i));
    }
    dst.set_markings(src.markings());
    dst.set_fateful_encounter(src.fateful_encounter());
    dst.set_egg(src.is_egg());
    dst.set_pokerus(src.pokerus());
    dst.set_nature(src.nature());
    dst.set_gender(resolve_gender(src, data));
    dst.set_language(src.language());
    dst.set_version(src.version());
    dst.set_ball(if src.ball().0 > bounds.max_ball { Ball::POKE } else { src.ball() });

    let item = src.held_item();
    dst.set_held_item(if item.0 > ctx.max_item(dest) { Item::NONE } else { clamp_item(dest, item) });

    dst.set_ot_name(&transcode(from, dest, &src.ot_name()));
    dst.set_ot_gender(src.ot_gender());
    dst.set_ot_friendship(TRANSFER_FRIENDSHIP);

    dst.set_met_level(src.level(data));
    dst.set_met_location(transfer_location(dest));
    dst.set_met_date(Some(ctx.today()));
    dst.set_egg_location(src.egg_location());
    dst.set_egg_date(src.egg_date());

    copy_moves(src, &mut *dst, ctx);
    copy_pp(src, &mut *dst, data);
    copy_ribbons(src, &mut *dst);
    copy_ability(src, &mut *dst, data);
    copy_nickname(src, &mut *dst, ctx, data);
    if dest.number() >= 6 {
        stamp_handler(src, &mut *dst, ctx);
    }
    Some(dst)
}

/// Party battle stats, then the checksum.
pub(crate) fn finish(src: &dyn Creature, mut dst: Record<'static>, data: &dyn GameData) -> Record<'static> {
    dst.set_stat_level(src.stat_level());
    dst.set_stat_hp_current(src.stat_hp_current());
    for stat in Stat::ALL {
        dst.set_stat(stat, src.stat(stat));
    }
    if !dst.update_party_stats(data) && dst.mode() == RecordMode::Party {
        debug!(species = dst.species().0, "no personal data, party stats copied as-is");
    }
    dst.refresh_checksum();
    dst
}

fn resolve_gender(src: &dyn Creature, data: &dyn GameData) -> Gender {
    if let Some(gender) = src.gender() {
        return gender;
    }
    match data.personal(src.generation(), src.species(), src.form()) {
        Some(info) => Gender::from_pid(src.pid(), info.gender_ratio),
        None => {
            debug!(species = src.species().0, "no gender ratio, defaulting to male");
            Gender::Male
        }
    }
}

/// Strip moves the source refuses to release or the destination does not
/// know, then close the gaps. Relearn moves keep their slots.
fn copy_moves(src: &dyn Creature, dst: &mut dyn Creature, ctx: &DestinationContext) {
    let from = src.generation();
    let bound = ctx.max_move(dst.generation());
    for slot in 0..4 {
        let mv = src.move_at(slot);
        if mv != Move::NONE && (mv.0 > bound || is_transfer_denied(from, mv)) {
            debug!(slot, mv = mv.0, "move stripped on transfer");
            dst.set_move_at(slot, Move::NONE);
            continue;
        }
        dst.set_move_at(slot, mv);
        dst.set_pp_ups(slot, src.pp_ups(slot));
        dst.set_pp(slot, src.pp(slot));
    }
    dst.fix_moves();

    // Relearn moves: bound check only.
    for slot in 0..4 {
        let relearn = src.relearn_move(slot);
        dst.set_relearn_move(slot, if relearn.0 > bound { Move::NONE } else { relearn });
    }
}

/// Full PP from base PP and PP-ups.
pub fn max_pp(base: u8, ups: u8) -> u8 {
    (base as u16 * (5 + ups.min(3) as u16) / 5) as u8
}

fn copy_pp(src: &dyn Creature, dst: &mut dyn Creature, data: &dyn GameData) {
    if src.is_egg() {
        return;
    }
    for slot in 0..4 {
        let mv = dst.move_at(slot);
        if let Some(base) = data.move_base_pp(mv).filter(|_| mv != Move::NONE) {
            let pp = max_pp(base, dst.pp_ups(slot));
            dst.set_pp(slot, pp);
        }
    }
}

/// Copy ribbons by name. Contest tiers and battle ribbons the destination
/// has no flag for are folded into its memory counters.
fn copy_ribbons(src: &dyn Creature, dst: &mut dyn Creature) {
    let dest = dst.generation();
    let mut contest = src.contest_memory_count() as u32;
    let mut battle = src.battle_memory_count() as u32;
    for ribbon in ribbons_of(src.generation()) {
        if !src.ribbon(ribbon) {
            continue;
        }
        if ribbon_offset(dest, ribbon).is_some() {
            dst.set_ribbon(ribbon, true);
        } else if G3_CONTEST.contains(&ribbon) || G4_CONTEST.contains(&ribbon) {
            contest += 1;
        } else if BATTLE_MEMORY.contains(&ribbon) {
            battle += 1;
        }
    }
    dst.set_contest_memory_count(contest.min(MAX_CONTEST_MEMORY as u32) as u8);
    dst.set_battle_memory_count(battle.min(MAX_BATTLE_MEMORY as u32) as u8);
}

/// Re-select the ability by personal table slot when it matches one,
/// otherwise carry the raw value.
fn copy_ability(src: &dyn Creature, dst: &mut dyn Creature, data: &dyn GameData) {
    let slot = match src.ability() {
        Some(ability) => data
            .personal(src.generation(), src.species(), src.form())
            .and_then(|info| info.ability_slot(ability)),
        None => Some(src.ability_number() as usize),
    };
    let dest_info = data.personal(dst.generation(), dst.species(), dst.form());

    match (slot, dest_info) {
        (Some(slot), Some(info)) => {
            let ability = match info.ability(slot) {
                Ability::NONE => info.ability(0),
                a => a,
            };
            dst.set_ability(ability);
            dst.set_ability_number(slot as u8);
        }
        _ => {
            if src.ability().is_none() {
                warn!(species = src.species().0, "no personal data to resolve ability slot");
            }
            dst.set_ability(src.ability().unwrap_or(Ability::NONE));
            dst.set_ability_number(src.ability_number());
        }
    }
}

/// Generation III has no nickname flag; a name differing from the species
/// name counts as a nickname.
fn was_nicknamed(src: &dyn Creature, data: &dyn GameData) -> bool {
    if src.generation() != Generation::III {
        return src.is_nicknamed();
    }
    data.species_name(src.species(), src.language())
        .map_or(false, |name| !name.eq_ignore_ascii_case(&src.nickname()))
}

fn copy_nickname(src: &dyn Creature, dst: &mut dyn Creature, ctx: &DestinationContext, data: &dyn GameData) {
    let from = src.generation();
    let dest = dst.generation();
    if was_nicknamed(src, data) && !src.is_egg() {
        dst.set_nickname(&transcode(from, dest, &src.nickname()));
        dst.set_nicknamed(true);
        return;
    }

    let language = match src.language() {
        Language::NONE => ctx.language,
        l => l,
    };
    let name = match data.species_name(src.species(), language) {
        Some(name) if src.is_egg() || dest.number() <= 4 => from_unicode(dest, &name.to_uppercase()),
        Some(name) => from_unicode(dest, &name),
        None => {
            warn!(species = src.species().0, language = language.0, "no localized species name, keeping nickname");
            transcode(from, dest, &src.nickname())
        }
    };
    dst.set_nickname(&name);
    dst.set_nicknamed(false);
}

/// Geolocation and handling trainer fields from generation VI on.
fn stamp_handler(src: &dyn Creature, dst: &mut dyn Creature, ctx: &DestinationContext) {
    let dest = dst.generation();
    dst.set_country(ctx.country);
    dst.set_region(ctx.region);
    dst.set_console_region(ctx.console_region);

    if src.generation().number() >= 6 {
        dst.set_ht_name(&src.ht_name());
        dst.set_ht_gender(src.ht_gender());
        dst.set_current_handler(src.current_handler());
    }
    if ctx.trainer_name.is_empty() || ctx.owns(src) {
        dst.set_current_handler(0);
        return;
    }
    dst.set_ht_name(&from_unicode(dest, &ctx.trainer_name));
    dst.set_ht_gender(ctx.gender);
    dst.set_ht_friendship(TRANSFER_FRIENDSHIP);
    dst.set_current_handler(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NoData;
    use crate::record::empty;
    use crate::ribbon::Ribbon;
    use crate::types::Species;

    fn ctx() -> DestinationContext {
        DestinationContext {
            trainer_name: "Calem".into(),
            tid: 100,
            sid: 200,
            today: NaiveDate::from_ymd_opt(2014, 1, 2),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_step_between_distant_generations() {
        let pk = empty(Generation::III, RecordMode::Box);
        assert!(convert(&*pk, Generation::V, &ctx(), &NoData).is_none());
        let pb = empty(Generation::LGPE, RecordMode::Box);
        assert!(convert(&*pb, Generation::VIII, &ctx(), &NoData).is_none());
        assert!(convert_chain(&*pb, Generation::VII, &ctx(), &NoData).is_none());
    }

    #[test]
    fn test_same_generation_is_a_copy() {
        let mut pk = empty(Generation::VI, RecordMode::Box);
        pk.set_species(Species(25));
        let copy = convert(&*pk, Generation::VI, &ctx(), &NoData).unwrap();
        assert_eq!(copy.data(), pk.data());
    }

    #[test]
    fn test_contest_tiers_fold_into_memory() {
        let mut pk = empty(Generation::V, RecordMode::Box);
        pk.set_species(Species(350));
        pk.set_ribbon(Ribbon::G3Beauty, true);
        pk.set_ribbon(Ribbon::G3BeautySuper, true);
        pk.set_ribbon(Ribbon::G4Cute, true);
        pk.set_ribbon(Ribbon::Winning, true);
        pk.set_ribbon(Ribbon::Effort, true);
        pk.refresh_checksum();
        let pk6 = convert(&*pk, Generation::VI, &ctx(), &NoData).unwrap();
        assert_eq!(pk6.contest_memory_count(), 3);
        assert_eq!(pk6.battle_memory_count(), 1);
        assert!(pk6.ribbon(Ribbon::Effort));
        assert!(pk6.ribbon(Ribbon::ContestMemory));
        assert!(pk6.ribbon(Ribbon::BattleMemory));
        assert_eq!(pk6.data()[0x34], 0b0110_0000);
    }

    #[test]
    fn test_memory_flags_follow_counts_into_viii() {
        let mut pk = empty(Generation::V, RecordMode::Box);
        pk.set_species(Species(350));
        pk.set_ribbon(Ribbon::G4Cool, true);
        pk.refresh_checksum();
        let pk6 = convert(&*pk, Generation::VI, &ctx(), &NoData).unwrap();
        assert!(pk6.ribbon(Ribbon::ContestMemory));
        assert!(!pk6.ribbon(Ribbon::BattleMemory));

        let pk7 = convert(&*pk6, Generation::VII, &ctx(), &NoData).unwrap();
        let pk8 = convert(&*pk7, Generation::VIII, &ctx(), &NoData).unwrap();
        assert_eq!(pk8.contest_memory_count(), 1);
        assert_eq!(pk8.data()[0x38] & 0b0110_0000, 0b0010_0000);
    }

    #[test]
    fn test_handler_stamped_for_other_trainer() {
        let mut pk = empty(Generation::V, RecordMode::Box);
        pk.set_species(Species(25));
        pk.set_ot_name("Hilda");
        let pk6 = convert(&*pk, Generation::VI, &ctx(), &NoData).unwrap();
        assert_eq!(pk6.ht_name(), "Calem");
        assert_eq!(pk6.current_handler(), 1);
        assert_eq!(pk6.ht_friendship(), TRANSFER_FRIENDSHIP);
        assert_eq!(pk6.current_friendship(), TRANSFER_FRIENDSHIP);

        let mut own = ctx();
        own.trainer_name = "Hilda".into();
        own.tid = 0;
        own.sid = 0;
        let pk6 = convert(&*pk, Generation::VI, &own, &NoData).unwrap();
        assert_eq!(pk6.current_handler(), 0);
        assert_eq!(pk6.ht_name(), "");
    }

    #[test]
    fn test_max_pp() {
        assert_eq!(max_pp(35, 0), 35);
        assert_eq!(max_pp(35, 3), 56);
        assert_eq!(max_pp(5, 3), 8);
    }

    #[test]
    fn test_context_from_json() {
        let ctx: DestinationContext =
            serde_json::from_str(r#"{ "trainer_name": "Red", "today": "2020-02-29" }"#).unwrap();
        assert_eq!(ctx.trainer_name, "Red");
        assert_eq!(ctx.today(), NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        assert_eq!(ctx.language, Language::ENG);
    }
}
