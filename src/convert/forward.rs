//! Forward steps: III → IV → V → VI → VII → VIII.

use tracing::debug;

use crate::data::GameData;
use crate::record::{Creature, Record};
use crate::types::Generation;

use super::{finish, transfer, DestinationContext};

/// The PID bit flipped when the wider VI+ shiny window would change a
/// record's shininess. It sits outside every field the PID still drives.
pub const SHINY_FIX_BIT: u32 = 0x8000_0000;

pub(crate) fn step(
    src:  &dyn Creature,
    dest: Generation,
    ctx:  &DestinationContext,
    data: &dyn GameData,
) -> Option<Record<'static>> {
    if src.generation().successor() != Some(dest) {
        return None;
    }
    let mut dst = transfer(src, dest, ctx, data)?;
    keep_shininess(src.is_shiny(), &mut *dst);
    Some(finish(src, dst, data))
}

/// Moving from a 3-bit to a 4-bit shiny shift can only make a record
/// shiny, never the reverse; flipping the top PID bit undoes that.
pub(crate) fn keep_shininess(shiny: bool, dst: &mut dyn Creature) {
    if dst.is_shiny() == shiny {
        return;
    }
    let pid = dst.pid() ^ SHINY_FIX_BIT;
    debug!(old = dst.pid(), new = pid, "flipping PID bit to keep shininess");
    dst.set_pid(pid);
}
