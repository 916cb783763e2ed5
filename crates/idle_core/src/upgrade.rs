//! Enhancement and sublimation state machines.
//!
//! Both machines consume their resource internally and report a typed
//! outcome; callers treat resource shortfalls as silent no-ops. Rolls are
//! exact basis points against a 10_000-wide integer range, so the deep
//! sublimation tail (0.01% == 1 bps) is represented without float drift.

use rand::Rng;

use crate::types::{EnhanceRules, EquipmentItem, Quality, SublimationRules};

pub const ROLL_DENOMINATOR_BPS: u32 = 10_000;

/// One success/failure roll at the given basis-point rate.
pub fn roll_bps(rate_bps: u32, rng: &mut impl Rng) -> bool {
    rng.gen_range(0..ROLL_DENOMINATOR_BPS) < rate_bps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceOutcome {
    Upgraded { level: u8 },
    /// Failed below the downgrade floor; level unchanged.
    Held { level: u8 },
    Downgraded { level: u8 },
    /// Rejected before any stones were consumed.
    AlreadyMaxed,
    /// Rejected before rolling; no stones were consumed.
    InsufficientStones,
}

/// Attempt one enhancement step, paying stones from `stones`.
pub fn try_enhance(
    item: &mut EquipmentItem,
    stones: &mut u64,
    rules: &EnhanceRules,
    rng: &mut impl Rng,
) -> EnhanceOutcome {
    let level = item.enhance_level;
    if level >= rules.max_level {
        return EnhanceOutcome::AlreadyMaxed;
    }
    let cost = rules.stone_cost[usize::from(level)];
    if *stones < cost {
        return EnhanceOutcome::InsufficientStones;
    }
    *stones -= cost;
    if roll_bps(rules.success_bps[usize::from(level)], rng) {
        item.enhance_level += 1;
        EnhanceOutcome::Upgraded {
            level: item.enhance_level,
        }
    } else if level >= rules.downgrade_floor {
        item.enhance_level -= 1;
        EnhanceOutcome::Downgraded {
            level: item.enhance_level,
        }
    } else {
        EnhanceOutcome::Held { level }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SublimationOutcome {
    /// Level advanced; quality advanced too unless already at the top tier.
    Advanced { level: u8, quality: Quality },
    /// Failed. Sublimation never downgrades; the essence is still spent.
    Held { level: u8 },
    /// Rejected before any essence was consumed.
    AlreadyMaxed,
    /// Rejected before any essence was consumed.
    InsufficientEssence,
}

/// Attempt one sublimation step, paying essence from `essence`.
pub fn try_sublimate(
    item: &mut EquipmentItem,
    essence: &mut u32,
    rules: &SublimationRules,
    rng: &mut impl Rng,
) -> SublimationOutcome {
    let level = item.sublimation_level;
    if level >= rules.max_level {
        return SublimationOutcome::AlreadyMaxed;
    }
    if *essence < rules.essence_cost {
        return SublimationOutcome::InsufficientEssence;
    }
    *essence -= rules.essence_cost;
    if roll_bps(rules.success_bps[usize::from(level)], rng) {
        item.sublimation_level += 1;
        if let Some(next) = item.quality.successor() {
            item.quality = next;
        }
        SublimationOutcome::Advanced {
            level: item.sublimation_level,
            quality: item.quality,
        }
    } else {
        SublimationOutcome::Held { level }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state, make_rng};
    use crate::types::{EnhanceRules, Quality, Slot, SublimationRules};

    fn take_item(slot: Slot) -> crate::types::EquipmentItem {
        let content = base_content();
        let mut state = base_state(&content);
        state.character.gear.remove(&slot).unwrap()
    }

    fn sure_enhance() -> EnhanceRules {
        EnhanceRules {
            max_level: 20,
            success_bps: vec![10_000; 20],
            stone_cost: (0u32..20).map(|l| u64::from(l) / 2 + 1).collect(),
            downgrade_floor: 5,
        }
    }

    fn doomed_enhance() -> EnhanceRules {
        EnhanceRules {
            success_bps: vec![0; 20],
            ..sure_enhance()
        }
    }

    #[test]
    fn success_advances_one_level() {
        let mut item = take_item(Slot::Helmet);
        let mut stones = 10;
        let rules = sure_enhance();
        let out = try_enhance(&mut item, &mut stones, &rules, &mut make_rng());
        assert_eq!(out, EnhanceOutcome::Upgraded { level: 1 });
        assert_eq!(item.enhance_level, 1);
        assert_eq!(stones, 9);
    }

    #[test]
    fn failure_below_floor_holds_level() {
        let mut item = take_item(Slot::Helmet);
        item.enhance_level = 4;
        let mut stones = 10;
        let rules = doomed_enhance();
        let out = try_enhance(&mut item, &mut stones, &rules, &mut make_rng());
        assert_eq!(out, EnhanceOutcome::Held { level: 4 });
        assert_eq!(item.enhance_level, 4);
        // cost at level 4 is 3
        assert_eq!(stones, 7);
    }

    #[test]
    fn failure_at_floor_downgrades() {
        let mut item = take_item(Slot::Helmet);
        item.enhance_level = 5;
        let mut stones = 10;
        let rules = doomed_enhance();
        let out = try_enhance(&mut item, &mut stones, &rules, &mut make_rng());
        assert_eq!(out, EnhanceOutcome::Downgraded { level: 4 });
        assert_eq!(item.enhance_level, 4);
    }

    #[test]
    fn maxed_item_rejected_without_cost() {
        let mut item = take_item(Slot::Helmet);
        item.enhance_level = 20;
        let mut stones = 10;
        let rules = sure_enhance();
        let out = try_enhance(&mut item, &mut stones, &rules, &mut make_rng());
        assert_eq!(out, EnhanceOutcome::AlreadyMaxed);
        assert_eq!(stones, 10);
    }

    #[test]
    fn insufficient_stones_rejected_without_roll() {
        let mut item = take_item(Slot::Helmet);
        let mut stones = 0;
        let rules = sure_enhance();
        let out = try_enhance(&mut item, &mut stones, &rules, &mut make_rng());
        assert_eq!(out, EnhanceOutcome::InsufficientStones);
        assert_eq!(item.enhance_level, 0);
    }

    #[test]
    fn level_zero_attempt_always_succeeds_with_builtin_rates() {
        // Built-in table starts at 100%.
        let content = base_content();
        let mut rng = make_rng();
        for _ in 0..50 {
            let mut item = take_item(Slot::Arm);
            let mut stones = 1;
            let out = try_enhance(&mut item, &mut stones, &content.enhance, &mut rng);
            assert_eq!(out, EnhanceOutcome::Upgraded { level: 1 });
        }
    }

    #[test]
    fn long_run_level_distribution_settles_near_equilibrium() {
        // With success 1.0 - 0.05*level and downgrades above level 5, the
        // walk hovers around the 50% crossing at level 10. A loose band is
        // enough to catch table or downgrade regressions.
        let content = base_content();
        let mut rng = make_rng();
        let mut total_level = 0_u64;
        for _ in 0..1_000 {
            let mut item = take_item(Slot::Helmet);
            let mut stones = u64::MAX / 2;
            for _ in 0..200 {
                try_enhance(&mut item, &mut stones, &content.enhance, &mut rng);
            }
            total_level += u64::from(item.enhance_level);
        }
        let mean = total_level as f64 / 1_000.0;
        assert!(
            (7.0..=13.0).contains(&mean),
            "mean final enhance level {mean} outside expected band"
        );
    }

    fn sure_sublimation() -> SublimationRules {
        SublimationRules {
            max_level: 10,
            success_bps: vec![10_000; 10],
            essence_cost: 25,
        }
    }

    #[test]
    fn sublimation_success_advances_level_and_quality() {
        let mut item = take_item(Slot::Chest);
        let mut essence = 100;
        let rules = sure_sublimation();
        let out = try_sublimate(&mut item, &mut essence, &rules, &mut make_rng());
        assert_eq!(
            out,
            SublimationOutcome::Advanced {
                level: 1,
                quality: Quality::Alloy
            }
        );
        assert_eq!(essence, 75);
    }

    #[test]
    fn sublimation_failure_spends_essence_but_never_downgrades() {
        let mut item = take_item(Slot::Chest);
        item.sublimation_level = 3;
        item.quality = Quality::Quantum;
        let mut essence = 100;
        let rules = SublimationRules {
            success_bps: vec![0; 10],
            ..sure_sublimation()
        };
        let out = try_sublimate(&mut item, &mut essence, &rules, &mut make_rng());
        assert_eq!(out, SublimationOutcome::Held { level: 3 });
        assert_eq!(item.sublimation_level, 3);
        assert_eq!(item.quality, Quality::Quantum);
        assert_eq!(essence, 75);
    }

    #[test]
    fn quality_clamps_at_void_while_level_keeps_going() {
        let mut item = take_item(Slot::Chest);
        item.sublimation_level = 5;
        item.quality = Quality::Void;
        let mut essence = 100;
        let rules = sure_sublimation();
        let out = try_sublimate(&mut item, &mut essence, &rules, &mut make_rng());
        assert_eq!(
            out,
            SublimationOutcome::Advanced {
                level: 6,
                quality: Quality::Void
            }
        );
    }

    #[test]
    fn sublimation_maxed_rejected_without_cost() {
        let mut item = take_item(Slot::Chest);
        item.sublimation_level = 10;
        let mut essence = 100;
        let rules = sure_sublimation();
        let out = try_sublimate(&mut item, &mut essence, &rules, &mut make_rng());
        assert_eq!(out, SublimationOutcome::AlreadyMaxed);
        assert_eq!(essence, 100);
    }

    #[test]
    fn sublimation_short_essence_rejected_without_cost() {
        let mut item = take_item(Slot::Chest);
        let mut essence = 24;
        let rules = sure_sublimation();
        let out = try_sublimate(&mut item, &mut essence, &rules, &mut make_rng());
        assert_eq!(out, SublimationOutcome::InsufficientEssence);
        assert_eq!(essence, 24);
    }

    #[test]
    fn builtin_sublimation_table_is_monotone_non_increasing() {
        let content = base_content();
        let rates = &content.sublimation.success_bps;
        for pair in rates.windows(2) {
            assert!(pair[0] >= pair[1], "rate table must not increase: {pair:?}");
        }
        assert_eq!(*rates.last().unwrap(), 1);
    }
}
