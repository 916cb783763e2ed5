//! Turn-based battle resolver.
//!
//! Initiative is timer-based: each side's timer advances by `100 /
//! attack_speed` per action and the earlier timer acts, ties going to the
//! player. The resolver never touches `CampaignState`; callers build
//! `Combatant`s, run the battle, and apply the report.

use rand::Rng;

use crate::types::{BossStats, Constants, EnemyTierDef, StatBlock};

#[derive(Debug, Clone, Copy)]
pub struct Combatant {
    pub hp: i64,
    pub level: u32,
    pub attack: f64,
    pub defense: f64,
    pub attack_speed: f64,
    pub crit: f64,
    pub crit_damage: f64,
    pub guard: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    Victory,
    /// Either the player fell or the turn cap was reached.
    Defeat,
}

#[derive(Debug, Clone, Copy)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    /// Total actions taken by both sides.
    pub turns: u32,
    pub player_hp: i64,
}

/// Fraction of incoming damage absorbed by defense. Saturates toward 1 as
/// defense grows against the defender's level anchor.
pub fn defense_reduction(defense: f64, defender_level: u32) -> f64 {
    defense / (defense + f64::from(defender_level) * 100.0 + 500.0)
}

/// Crit chance in percent. Zero when crit does not exceed guard; an
/// unguarded defender saturates the clamp at 100.
pub fn crit_chance_pct(crit: f64, guard: f64) -> f64 {
    if crit <= guard {
        return 0.0;
    }
    ((crit - guard) / (guard * 1.5) * 100.0).clamp(0.0, 100.0)
}

#[allow(clippy::cast_possible_truncation)]
fn strike(
    attacker: &Combatant,
    defender: &Combatant,
    min_damage: i64,
    rng: &mut impl Rng,
) -> i64 {
    let reduction = defense_reduction(defender.defense, defender.level);
    let mut damage = attacker.attack * (1.0 - reduction);
    let chance = crit_chance_pct(attacker.crit, defender.guard);
    if rng.gen_range(0.0..100.0) < chance {
        damage *= 1.5 + attacker.crit_damage / 100.0;
    }
    (damage.trunc() as i64).max(min_damage)
}

fn action_interval(attack_speed: f64) -> f64 {
    if attack_speed > 0.0 {
        100.0 / attack_speed
    } else {
        f64::INFINITY
    }
}

/// Run a battle to completion or to the turn cap.
pub fn resolve_battle(
    player: &Combatant,
    enemy: &Combatant,
    constants: &Constants,
    rng: &mut impl Rng,
) -> BattleReport {
    let mut player_hp = player.hp;
    let mut enemy_hp = enemy.hp;
    let player_step = action_interval(player.attack_speed);
    let enemy_step = action_interval(enemy.attack_speed);
    let mut player_next = player_step;
    let mut enemy_next = enemy_step;
    let mut turns = 0_u32;
    while turns < constants.max_battle_turns {
        turns += 1;
        if player_next <= enemy_next {
            enemy_hp -= strike(player, enemy, constants.min_damage, rng);
            player_next += player_step;
            if enemy_hp <= 0 {
                return BattleReport {
                    outcome: BattleOutcome::Victory,
                    turns,
                    player_hp,
                };
            }
        } else {
            player_hp -= strike(enemy, player, constants.min_damage, rng);
            enemy_next += enemy_step;
            if player_hp <= 0 {
                return BattleReport {
                    outcome: BattleOutcome::Defeat,
                    turns,
                    player_hp: 0,
                };
            }
        }
    }
    // Turn cap: no decision is a loss, but surviving hp is preserved.
    BattleReport {
        outcome: BattleOutcome::Defeat,
        turns,
        player_hp,
    }
}

/// Enemy built from a tier's multipliers over the shared base, scaled by
/// zone level.
#[allow(clippy::cast_possible_truncation)]
pub fn tier_enemy(tier: &EnemyTierDef, zone_level: u32, constants: &Constants) -> Combatant {
    let level_mult = 1.0
        + f64::from(zone_level.saturating_sub(1)) * f64::from(constants.enemy_level_scaling_pct)
            / 100.0;
    let base = &constants.enemy_base;
    Combatant {
        hp: (base.hp * tier.hp_mult * level_mult).trunc() as i64,
        level: zone_level,
        attack: (base.attack * tier.attack_mult * level_mult).trunc(),
        defense: (base.defense * tier.defense_mult * level_mult).trunc(),
        attack_speed: base.attack_speed,
        crit: base.crit,
        crit_damage: base.crit_damage,
        guard: base.guard,
    }
}

pub fn boss_combatant(boss: &BossStats, zone_level: u32) -> Combatant {
    Combatant {
        hp: boss.hp,
        level: zone_level,
        attack: boss.attack,
        defense: boss.defense,
        attack_speed: boss.attack_speed,
        crit: boss.crit,
        crit_damage: boss.crit_damage,
        guard: boss.guard,
    }
}

pub fn player_combatant(totals: &StatBlock, hp: i64, level: u32) -> Combatant {
    Combatant {
        hp,
        level,
        attack: totals.attack,
        defense: totals.defense,
        attack_speed: totals.speed,
        crit: totals.crit,
        crit_damage: totals.crit_damage,
        guard: totals.guard,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
