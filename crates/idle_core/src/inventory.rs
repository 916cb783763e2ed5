//! Material inventory and the 5:1 synthesis ladder.

use crate::drops::MaterialDrop;
use crate::types::{Inventory, MaterialKind, Quality};

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: MaterialKind, quality: Quality, units: u64) {
        let counts = self.counts.entry(kind).or_insert([0; 5]);
        counts[quality.index()] += units;
        self.total_collected += units;
    }

    pub fn add_drops(&mut self, drops: &[MaterialDrop]) {
        for drop in drops {
            self.add(drop.kind, drop.quality, u64::from(drop.units));
        }
    }

    pub fn count(&self, kind: MaterialKind, quality: Quality) -> u64 {
        self.counts
            .get(&kind)
            .map_or(0, |counts| counts[quality.index()])
    }

    /// Current units held per quality tier, summed over kinds.
    pub fn tier_totals(&self) -> [u64; 5] {
        let mut totals = [0_u64; 5];
        for counts in self.counts.values() {
            for (total, count) in totals.iter_mut().zip(counts) {
                *total += count;
            }
        }
        totals
    }

    pub fn total(&self) -> u64 {
        self.tier_totals().iter().sum()
    }

    /// Convert `ratio` units at tier k into one unit at tier k+1, per kind,
    /// repeating until fewer than `ratio` remain at every non-top tier.
    /// Ascending tier order makes freshly minted units cascade upward in the
    /// same pass. Returns conversions performed per source tier.
    pub fn auto_synthesize(&mut self, ratio: u64) -> [u64; 4] {
        let mut conversions = [0_u64; 4];
        if ratio == 0 {
            return conversions;
        }
        for kind in MaterialKind::ALL {
            let Some(counts) = self.counts.get_mut(&kind) else {
                continue;
            };
            for tier in 0..4 {
                let batches = counts[tier] / ratio;
                if batches > 0 {
                    counts[tier] -= batches * ratio;
                    counts[tier + 1] += batches;
                    conversions[tier] += batches;
                }
            }
        }
        conversions
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_count() {
        let mut inv = Inventory::new();
        inv.add(MaterialKind::IronFrame, Quality::Stardust, 3);
        inv.add(MaterialKind::IronFrame, Quality::Stardust, 2);
        inv.add(MaterialKind::VoidCore, Quality::Crystal, 1);
        assert_eq!(inv.count(MaterialKind::IronFrame, Quality::Stardust), 5);
        assert_eq!(inv.count(MaterialKind::VoidCore, Quality::Crystal), 1);
        assert_eq!(inv.count(MaterialKind::NanoFiber, Quality::Void), 0);
        assert_eq!(inv.total(), 6);
        assert_eq!(inv.total_collected, 6);
    }

    #[test]
    fn synthesis_converts_five_to_one() {
        let mut inv = Inventory::new();
        inv.add(MaterialKind::IronFrame, Quality::Stardust, 12);
        let conversions = inv.auto_synthesize(5);
        assert_eq!(conversions, [2, 0, 0, 0]);
        assert_eq!(inv.count(MaterialKind::IronFrame, Quality::Stardust), 2);
        assert_eq!(inv.count(MaterialKind::IronFrame, Quality::Alloy), 2);
    }

    #[test]
    fn synthesis_cascades_within_one_pass() {
        let mut inv = Inventory::new();
        inv.add(MaterialKind::EnergyCore, Quality::Stardust, 25);
        let conversions = inv.auto_synthesize(5);
        // 25 tier-1 -> 5 tier-2 -> 1 tier-3
        assert_eq!(conversions, [5, 1, 0, 0]);
        assert_eq!(inv.count(MaterialKind::EnergyCore, Quality::Stardust), 0);
        assert_eq!(inv.count(MaterialKind::EnergyCore, Quality::Alloy), 0);
        assert_eq!(inv.count(MaterialKind::EnergyCore, Quality::Crystal), 1);
    }

    #[test]
    fn top_tier_never_converts() {
        let mut inv = Inventory::new();
        inv.add(MaterialKind::EnergyCore, Quality::Void, 50);
        let conversions = inv.auto_synthesize(5);
        assert_eq!(conversions, [0, 0, 0, 0]);
        assert_eq!(inv.count(MaterialKind::EnergyCore, Quality::Void), 50);
    }

    #[test]
    fn synthesis_terminates_below_ratio() {
        let mut inv = Inventory::new();
        inv.add(MaterialKind::NanoFiber, Quality::Alloy, 4);
        let conversions = inv.auto_synthesize(5);
        assert_eq!(conversions, [0, 0, 0, 0]);
        assert_eq!(inv.count(MaterialKind::NanoFiber, Quality::Alloy), 4);
    }

    #[test]
    fn zero_ratio_is_a_no_op() {
        let mut inv = Inventory::new();
        inv.add(MaterialKind::NanoFiber, Quality::Stardust, 10);
        assert_eq!(inv.auto_synthesize(0), [0, 0, 0, 0]);
        assert_eq!(inv.count(MaterialKind::NanoFiber, Quality::Stardust), 10);
    }

    #[test]
    fn synthesis_preserves_total_collected() {
        let mut inv = Inventory::new();
        inv.add(MaterialKind::IronFrame, Quality::Stardust, 30);
        inv.auto_synthesize(5);
        // Synthesis reshapes holdings; it is not new income.
        assert_eq!(inv.total_collected, 30);
        // 30 -> 6 alloy -> 1 crystal + 1 alloy remaining
        assert_eq!(inv.total(), 2);
    }
}
