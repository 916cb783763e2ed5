//! Drop economy: battle drop tables, zone modifiers, and the exploration
//! (hunt/gather) tables.
//!
//! Quality selection is a single integer roll in `[0, 10_000)` walked against
//! cumulative basis-point rates, lowest tier first. When clamping leaves the
//! table summing below 100%, the shortfall falls through to the lowest tier.

use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

use crate::types::{DropTables, EnemyClass, ExplorationRates, MaterialKind, Quality};

pub type DropList = SmallVec<[MaterialDrop; 8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialDrop {
    pub kind: MaterialKind,
    pub quality: Quality,
    pub units: u32,
}

/// Battle rates for a class in a zone: base + additive zone modifier, each
/// entry clamped into the configured floor/cap band. Not renormalized.
pub fn adjusted_battle_rates(drops: &DropTables, class: EnemyClass, zone_index: usize) -> [u32; 5] {
    let base = drops.battle_rates_bps.get(class);
    let modifiers = drops
        .zone_modifiers_bps
        .get(zone_index)
        .copied()
        .unwrap_or([0; 5]);
    let floor = i64::from(drops.rate_floor_bps);
    let cap = i64::from(drops.rate_cap_bps);
    let mut out = [0_u32; 5];
    for (i, rate) in out.iter_mut().enumerate() {
        let adjusted = i64::from(base[i]) + i64::from(modifiers[i]);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            *rate = adjusted.clamp(floor, cap) as u32;
        }
    }
    out
}

/// Pick a quality from a bps rate table, lowest tier first.
pub fn roll_quality(rates_bps: &[u32; 5], rng: &mut impl Rng) -> Quality {
    let roll = rng.gen_range(0..10_000_u32);
    let mut cumulative = 0_u32;
    for (quality, rate) in Quality::ALL.iter().zip(rates_bps) {
        cumulative += rate;
        if roll < cumulative {
            return *quality;
        }
    }
    Quality::Stardust
}

/// Drops from one battle: `battle_rolls` distinct kinds, one unit each, with
/// qualities rolled against the zone-adjusted table.
pub fn roll_battle_drops(
    drops: &DropTables,
    class: EnemyClass,
    zone_index: usize,
    rng: &mut impl Rng,
) -> DropList {
    let rates = adjusted_battle_rates(drops, class, zone_index);
    let count = (*drops.battle_rolls.get(class) as usize).min(MaterialKind::ALL.len());
    let kinds: Vec<MaterialKind> = MaterialKind::ALL
        .choose_multiple(rng, count)
        .copied()
        .collect();
    let mut out = DropList::new();
    for kind in kinds {
        out.push(MaterialDrop {
            kind,
            quality: roll_quality(&rates, rng),
            units: 1,
        });
    }
    out
}

/// Exploration rates shift probability out of the lowest tier into the top
/// three as the zone level rises, with a floor on the lowest tier.
pub fn exploration_rates(rates: &ExplorationRates, zone_level: u32) -> [u32; 5] {
    let bonus = (zone_level * rates.level_bonus_per_level_bps).min(rates.level_bonus_cap_bps);
    let mut out = rates.base_rates_bps;
    out[0] = out[0].saturating_sub(bonus).max(rates.stardust_floor_bps);
    out[2] += bonus / 2;
    out[3] += bonus * 3 / 10;
    out[4] += bonus / 10;
    out
}

/// Drops from one hunt at the given difficulty class.
pub fn roll_hunt(
    drops: &DropTables,
    class: EnemyClass,
    zone_level: u32,
    rng: &mut impl Rng,
) -> DropList {
    let ex = &drops.exploration;
    let rates = exploration_rates(ex, zone_level);
    let [min, max] = *ex.hunt_rolls.get(class);
    let count = (rng.gen_range(min..=max.max(min)) as usize).min(MaterialKind::ALL.len());
    let kinds: Vec<MaterialKind> = MaterialKind::ALL
        .choose_multiple(rng, count)
        .copied()
        .collect();
    let mut out = DropList::new();
    for kind in kinds {
        let units = rng.gen_range(ex.hunt_units[0]..=ex.hunt_units[1].max(ex.hunt_units[0]));
        out.push(MaterialDrop {
            kind,
            quality: roll_quality(&rates, rng),
            units,
        });
    }
    out
}

/// One gathering trip: a single kind, a small unit count.
pub fn roll_gather(drops: &DropTables, zone_level: u32, rng: &mut impl Rng) -> MaterialDrop {
    let ex = &drops.exploration;
    let rates = exploration_rates(ex, zone_level);
    let kind = MaterialKind::ALL
        .choose(rng)
        .copied()
        .unwrap_or(MaterialKind::IronFrame);
    let units = rng.gen_range(ex.gather_units[0]..=ex.gather_units[1].max(ex.gather_units[0]));
    MaterialDrop {
        kind,
        quality: roll_quality(&rates, rng),
        units,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
