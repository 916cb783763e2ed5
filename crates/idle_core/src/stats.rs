//! Stat derivation: per-item effective stats, armor aggregation with set
//! bonuses, character totals, and power scores.
//!
//! Everything in this module is a pure function of its inputs. All truncation
//! happens exactly where the balance model calls for it so that integer-level
//! results are reproducible across platforms.

use crate::types::{Character, Constants, EquipmentItem, PowerWeights, Slot, StatBlock};

const ENHANCE_ATTACK_PER_LEVEL: f64 = 1.0;
const ENHANCE_DEFENSE_PER_LEVEL: f64 = 1.0;
const ENHANCE_HP_PER_LEVEL: f64 = 2.0;
const ENHANCE_SPEED_PER_LEVEL: f64 = 0.1;
const ENHANCE_ACCURACY_PER_LEVEL: f64 = 5.0;
const ENHANCE_DEFAULT_PER_LEVEL: f64 = 1.0;
/// Sublimation multiplies attack, defense, and hp only.
const SUBLIMATION_MULT_PER_LEVEL: f64 = 1.2;

/// Linear enhance growth, gated on the item actually carrying the stat.
fn scaled(base: f64, per_level: f64, level: u8) -> f64 {
    if base > 0.0 {
        base + f64::from(level) * per_level
    } else {
        0.0
    }
}

/// Stats of a single item at the given enhance and sublimation levels.
///
/// Attack, defense, and hp pick up the sublimation multiplier and truncate
/// to whole numbers; the remaining scalars stay fractional.
pub fn effective_stats(base: &StatBlock, enhance_level: u8, sublimation_level: u8) -> StatBlock {
    let sub_mult = SUBLIMATION_MULT_PER_LEVEL.powi(i32::from(sublimation_level));
    StatBlock {
        hp: (scaled(base.hp, ENHANCE_HP_PER_LEVEL, enhance_level) * sub_mult).trunc(),
        attack: (scaled(base.attack, ENHANCE_ATTACK_PER_LEVEL, enhance_level) * sub_mult).trunc(),
        defense: (scaled(base.defense, ENHANCE_DEFENSE_PER_LEVEL, enhance_level) * sub_mult)
            .trunc(),
        speed: scaled(base.speed, ENHANCE_SPEED_PER_LEVEL, enhance_level),
        hit: scaled(base.hit, ENHANCE_ACCURACY_PER_LEVEL, enhance_level),
        dodge: scaled(base.dodge, ENHANCE_ACCURACY_PER_LEVEL, enhance_level),
        crit: scaled(base.crit, ENHANCE_DEFAULT_PER_LEVEL, enhance_level),
        crit_damage: scaled(base.crit_damage, ENHANCE_DEFAULT_PER_LEVEL, enhance_level),
        guard: scaled(base.guard, ENHANCE_DEFAULT_PER_LEVEL, enhance_level),
        agility: scaled(base.agility, ENHANCE_DEFAULT_PER_LEVEL, enhance_level),
        penetration: scaled(base.penetration, ENHANCE_DEFAULT_PER_LEVEL, enhance_level),
        penetration_pct: scaled(base.penetration_pct, ENHANCE_DEFAULT_PER_LEVEL, enhance_level),
        true_damage: scaled(base.true_damage, ENHANCE_DEFAULT_PER_LEVEL, enhance_level),
        luck: scaled(base.luck, ENHANCE_DEFAULT_PER_LEVEL, enhance_level),
    }
}

/// Sum of effective stats over equipped gear, plus set bonuses.
///
/// Set bonus stages apply in table order and compound; the attack total
/// truncates after every stage.
pub fn armor_totals(
    gear: &ahash::AHashMap<Slot, EquipmentItem>,
    constants: &Constants,
) -> StatBlock {
    let mut total = StatBlock::default();
    let mut pieces = 0_u32;
    for slot in Slot::ALL {
        let Some(item) = gear.get(&slot) else {
            continue;
        };
        let eff = effective_stats(&item.base, item.enhance_level, item.sublimation_level);
        total.hp += eff.hp;
        total.attack += eff.attack;
        total.defense += eff.defense;
        total.speed += eff.speed;
        total.hit += eff.hit;
        total.dodge += eff.dodge;
        total.crit += eff.crit;
        total.crit_damage += eff.crit_damage;
        total.guard += eff.guard;
        total.agility += eff.agility;
        total.penetration += eff.penetration;
        total.penetration_pct += eff.penetration_pct;
        total.true_damage += eff.true_damage;
        total.luck += eff.luck;
        pieces += 1;
    }
    for bonus in &constants.set_bonuses {
        if pieces >= bonus.pieces {
            let pct = 100 + bonus.attack_mult_pct;
            total.attack = (total.attack * pct as f64 / 100.0).trunc();
            total.crit += bonus.crit_bonus;
        }
    }
    total
}

/// Class base + per-level growth + armor totals.
pub fn character_totals(character: &Character, constants: &Constants) -> StatBlock {
    let base = &constants.player_base;
    let growth = f64::from(character.level.saturating_sub(1));
    let armor = armor_totals(&character.gear, constants);
    StatBlock {
        hp: base.hp + growth * constants.level_up_hp + armor.hp,
        attack: base.attack + growth * constants.level_up_attack + armor.attack,
        defense: base.defense + growth * constants.level_up_defense + armor.defense,
        speed: base.speed + armor.speed,
        hit: base.hit + armor.hit,
        dodge: base.dodge + armor.dodge,
        crit: base.crit + armor.crit,
        crit_damage: base.crit_damage + armor.crit_damage,
        guard: base.guard + armor.guard,
        agility: base.agility + armor.agility,
        penetration: base.penetration + armor.penetration,
        penetration_pct: base.penetration_pct + armor.penetration_pct,
        true_damage: base.true_damage + armor.true_damage,
        luck: base.luck + armor.luck,
    }
}

#[allow(clippy::cast_possible_truncation)]
pub fn power_score(stats: &StatBlock, weights: &PowerWeights) -> i64 {
    (stats.hp * weights.hp
        + stats.attack * weights.attack
        + stats.defense * weights.defense
        + stats.crit * weights.crit
        + stats.speed * weights.speed) as i64
}

/// Cheap threat estimate used by the upgrade policy.
#[allow(clippy::cast_possible_truncation)]
pub fn enemy_power(hp: f64, attack: f64) -> i64 {
    (hp + attack * 10.0) as i64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state};
    use crate::types::StatBlock;

    fn helmet_base() -> StatBlock {
        StatBlock {
            defense: 2.0,
            hp: 12.0,
            hit: 2.0,
            ..StatBlock::default()
        }
    }

    #[test]
    fn zero_levels_are_identity() {
        let base = helmet_base();
        let eff = effective_stats(&base, 0, 0);
        assert!((eff.defense - 2.0).abs() < f64::EPSILON);
        assert!((eff.hp - 12.0).abs() < f64::EPSILON);
        assert!((eff.hit - 2.0).abs() < f64::EPSILON);
        assert!((eff.attack - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_stats_stay_absent() {
        // Helmet has no attack base; 20 enhance levels must not conjure one.
        let eff = effective_stats(&helmet_base(), 20, 0);
        assert!((eff.attack - 0.0).abs() < f64::EPSILON);
        assert!((eff.speed - 0.0).abs() < f64::EPSILON);
        assert!((eff.dodge - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn enhance_growth_per_stat_family() {
        let base = StatBlock {
            hp: 10.0,
            attack: 5.0,
            defense: 3.0,
            speed: 1.0,
            hit: 100.0,
            dodge: 10.0,
            crit: 4.0,
            ..StatBlock::default()
        };
        let eff = effective_stats(&base, 3, 0);
        assert!((eff.hp - 16.0).abs() < f64::EPSILON);
        assert!((eff.attack - 8.0).abs() < f64::EPSILON);
        assert!((eff.defense - 6.0).abs() < f64::EPSILON);
        assert!((eff.speed - 1.3).abs() < 1e-9);
        assert!((eff.hit - 115.0).abs() < f64::EPSILON);
        assert!((eff.dodge - 25.0).abs() < f64::EPSILON);
        assert!((eff.crit - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn auxiliary_scalars_grow_flat_and_skip_sublimation() {
        let base = StatBlock {
            agility: 4.0,
            penetration: 3.0,
            penetration_pct: 2.0,
            true_damage: 1.0,
            luck: 2.0,
            ..StatBlock::default()
        };
        let eff = effective_stats(&base, 2, 3);
        assert!((eff.agility - 6.0).abs() < f64::EPSILON);
        assert!((eff.penetration - 5.0).abs() < f64::EPSILON);
        assert!((eff.penetration_pct - 4.0).abs() < f64::EPSILON);
        assert!((eff.true_damage - 3.0).abs() < f64::EPSILON);
        assert!((eff.luck - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn auxiliary_scalars_flow_into_totals() {
        let content = base_content();
        let mut state = base_state(&content);
        if let Some(item) = state.character.gear.get_mut(&Slot::Arm) {
            item.base.penetration = 6.0;
            item.base.luck = 2.0;
        }
        let totals = character_totals(&state.character, &content.constants);
        assert!((totals.penetration - 6.0).abs() < f64::EPSILON);
        assert!((totals.luck - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stat_blocks_accept_auxiliary_fields_from_json() {
        let json = r#"{"attack": 5.0, "agility": 1.5, "penetration": 2.0,
                       "penetration_pct": 1.0, "true_damage": 3.0, "luck": 0.5}"#;
        let block: StatBlock = serde_json::from_str(json).unwrap();
        assert!((block.attack - 5.0).abs() < f64::EPSILON);
        assert!((block.agility - 1.5).abs() < f64::EPSILON);
        assert!((block.penetration - 2.0).abs() < f64::EPSILON);
        assert!((block.penetration_pct - 1.0).abs() < f64::EPSILON);
        assert!((block.true_damage - 3.0).abs() < f64::EPSILON);
        assert!((block.luck - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn sublimation_multiplies_combat_trio_only() {
        let base = StatBlock {
            hp: 10.0,
            attack: 5.0,
            defense: 3.0,
            speed: 1.0,
            ..StatBlock::default()
        };
        let eff = effective_stats(&base, 0, 2);
        // x1.44, truncated
        assert!((eff.hp - 14.0).abs() < f64::EPSILON);
        assert!((eff.attack - 7.0).abs() < f64::EPSILON);
        assert!((eff.defense - 4.0).abs() < f64::EPSILON);
        // speed untouched by sublimation
        assert!((eff.speed - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_set_bonus_on_fresh_character() {
        // Fresh gear: armor attack 5 (arm only). Stage by stage:
        // x1.10 -> 5, x1.20 -> 6, x1.35 -> 8; crit bonus 5 + 10.
        let content = base_content();
        let state = base_state(&content);
        let totals = character_totals(&state.character, &content.constants);
        assert!((totals.attack - 18.0).abs() < f64::EPSILON);
        assert!((totals.defense - 14.0).abs() < f64::EPSILON);
        assert!((totals.hp - 148.0).abs() < f64::EPSILON);
        assert!((totals.crit - 20.0).abs() < f64::EPSILON);
        assert!((totals.speed - 1.5).abs() < 1e-9);
        assert!((totals.guard - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_set_skips_higher_stages() {
        let content = base_content();
        let mut state = base_state(&content);
        state.character.gear.remove(&Slot::Helmet);
        state.character.gear.remove(&Slot::Boot);
        state.character.gear.remove(&Slot::Leg);
        // 3 pieces: only the 2-piece stage applies, and no crit bonus.
        let totals = character_totals(&state.character, &content.constants);
        assert!((totals.crit - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn level_growth_feeds_totals() {
        let content = base_content();
        let mut state = base_state(&content);
        state.character.level = 5;
        let totals = character_totals(&state.character, &content.constants);
        // +4 levels: hp +40, attack +8, defense +4 over the fresh totals.
        assert!((totals.hp - 188.0).abs() < f64::EPSILON);
        assert!((totals.attack - 26.0).abs() < f64::EPSILON);
        assert!((totals.defense - 18.0).abs() < f64::EPSILON);
    }

    #[test]
    fn power_score_weights() {
        let content = base_content();
        let state = base_state(&content);
        let totals = character_totals(&state.character, &content.constants);
        let power = power_score(&totals, &content.constants.power_weights);
        // 148*0.5 + 18*10 + 14*8 + 20*5 + 1.5*50 = 74+180+112+100+75
        assert_eq!(power, 541);
    }

    #[test]
    fn enemy_power_estimate() {
        assert_eq!(enemy_power(200.0, 20.0), 400);
    }
}
