//! Day engine: `advance_day` plus the stamina-gated exploration operations.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::combat::{self, BattleOutcome};
use crate::drops::{self, DropList, MaterialDrop};
use crate::types::{
    CampaignState, EnemyClass, Event, EventEnvelope, EventLevel, GameContent, MaterialKind, Slot,
    TierId,
};
use crate::{emit, stats, upgrade};

/// Decides what the daily upgrade passes do. Called mid-day, after idle
/// income has landed, so targets reflect the day's actual power level.
pub trait UpgradePolicy {
    /// Target enhance level for today's pass, or `None` to skip it.
    fn enhance_target(&self, state: &CampaignState, content: &GameContent) -> Option<u8>;
    /// Slot order for today's sublimation attempts. Empty skips the pass.
    fn sublimation_order(&self, state: &CampaignState, content: &GameContent) -> Vec<Slot>;
}

/// Advance the campaign by one day.
///
/// Order of operations:
/// 1. Clear per-day boss-attempt flags.
/// 2. Regenerate essence and stamina.
/// 3. Auto-synthesize materials, ascending tier order.
/// 4. Idle income (credits, exp, materials, stones), scaled by defeated
///    bosses.
/// 5. Enhancement pass per the policy.
/// 6. Sublimation pass per the policy, then refresh max hp.
/// 7. One normal battle in the current zone.
/// 8. Only after a normal victory: sweep if unlocked, otherwise maybe
///    attempt the zone boss.
///
/// Returns the events of the day; `Debug`-level events are only included
/// when `event_level` asks for them.
pub fn advance_day(
    state: &mut CampaignState,
    content: &GameContent,
    policy: &dyn UpgradePolicy,
    rng: &mut impl Rng,
    event_level: EventLevel,
) -> Vec<EventEnvelope> {
    // A cleared campaign is over; the day counter freezes at the clear day.
    if state.cleared {
        return Vec::new();
    }
    let mut events = Vec::new();
    let day = state.meta.day;
    let constants = &content.constants;

    // 1. fresh boss attempts
    state.boss_attempted_today.clear();

    // 2. regen
    let essence_regen = constants.essence_regen_per_minute * constants.minutes_per_day;
    state.character.essence =
        (state.character.essence + essence_regen).min(constants.essence_max);
    state.stamina = (state.stamina + constants.stamina_regen_per_day).min(constants.stamina_max);

    // 3. synthesis
    let conversions = state.inventory.auto_synthesize(constants.synthesis_ratio);
    for (tier, made) in crate::types::Quality::ALL.iter().zip(conversions) {
        if made > 0 {
            events.push(emit(
                &mut state.counters,
                day,
                Event::MaterialsSynthesized {
                    from_tier: *tier,
                    conversions: made,
                },
            ));
        }
    }

    // 4. idle income
    apply_idle_income(state, content, day, rng, &mut events);

    // 5. + 6. upgrade passes
    run_enhancement_pass(state, content, policy, day, rng, &mut events);
    run_sublimation_pass(state, content, policy, day, rng, &mut events);
    state.character.refresh_max_hp(constants);

    // 7. normal battle
    let victory = fight_normal(state, content, day, rng, &mut events);

    // 8. sweep or boss
    if victory {
        if state.sweep_unlocked.contains(&state.zone_index) {
            sweep(state, content, day, rng, &mut events);
        } else {
            maybe_fight_boss(state, content, day, rng, event_level, &mut events);
        }
    }

    state.meta.day += 1;
    events
}

/// Spend stamina to gather one material from the current zone.
/// `None` when stamina is too low; callers treat that as a silent no-op.
pub fn gather_materials(
    state: &mut CampaignState,
    content: &GameContent,
    rng: &mut impl Rng,
) -> Option<MaterialDrop> {
    let cost = content.drops.exploration.gather_stamina_cost;
    let zone = content.zones.get(state.zone_index)?;
    if state.stamina < cost {
        return None;
    }
    state.stamina -= cost;
    let drop = drops::roll_gather(&content.drops, zone.level, rng);
    state.inventory.add(drop.kind, drop.quality, u64::from(drop.units));
    Some(drop)
}

/// Spend stamina on a hunt at the given difficulty in the current zone.
pub fn hunt(
    state: &mut CampaignState,
    content: &GameContent,
    class: EnemyClass,
    rng: &mut impl Rng,
) -> Option<DropList> {
    let cost = content.drops.exploration.hunt_stamina_cost;
    let zone = content.zones.get(state.zone_index)?;
    if state.stamina < cost {
        return None;
    }
    state.stamina -= cost;
    let list = drops::roll_hunt(&content.drops, class, zone.level, rng);
    state.inventory.add_drops(&list);
    Some(list)
}

// ---------------------------------------------------------------------------
// Day steps
// ---------------------------------------------------------------------------

#[allow(clippy::cast_possible_truncation)]
fn apply_idle_income(
    state: &mut CampaignState,
    content: &GameContent,
    day: u32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let constants = &content.constants;
    let bonus_pct = constants.idle_boss_bonus_pct * state.bosses_defeated.len() as u64;
    let scale = |base: u64| base * (100 + bonus_pct) / 100;
    let hours = u64::from(constants.idle_hours_per_day);
    let credits = scale(constants.idle_credits_per_hour * hours);
    let exp = scale(constants.idle_exp_per_hour * hours);
    let stones = scale(constants.idle_stones_per_hour * hours);
    let materials = scale(u64::from(constants.idle_materials_per_hour) * hours) as u32;

    state.credits += credits;
    state.enhance_stones += stones;
    state.idle_totals.credits += credits;
    state.idle_totals.exp += exp;
    state.idle_totals.stones += stones;
    state.idle_totals.materials += u64::from(materials);

    let rates = drops::adjusted_battle_rates(&content.drops, EnemyClass::Normal, state.zone_index);
    for _ in 0..materials {
        let kind = MaterialKind::ALL
            .choose(rng)
            .copied()
            .unwrap_or(MaterialKind::IronFrame);
        let quality = drops::roll_quality(&rates, rng);
        state.inventory.add(kind, quality, 1);
    }

    let levels = state.character.gain_exp(exp, constants);
    if levels > 0 {
        events.push(emit(
            &mut state.counters,
            day,
            Event::LevelUp {
                level: state.character.level,
            },
        ));
    }
    events.push(emit(
        &mut state.counters,
        day,
        Event::IdleIncome {
            credits,
            exp,
            materials,
            stones,
            bonus_pct,
        },
    ));
}

fn run_enhancement_pass(
    state: &mut CampaignState,
    content: &GameContent,
    policy: &dyn UpgradePolicy,
    day: u32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(target) = policy.enhance_target(state, content) else {
        return;
    };
    let target = target.min(content.enhance.max_level);
    let cap = content.constants.enhance_attempt_cap;
    let stones_before = state.enhance_stones;
    let mut attempts = 0_u32;
    let mut successes = 0_u32;
    let mut downgrades = 0_u32;
    'slots: for slot in Slot::ALL {
        let Some(item) = state.character.gear.get_mut(&slot) else {
            continue;
        };
        while item.enhance_level < target {
            if attempts >= cap {
                break 'slots;
            }
            match upgrade::try_enhance(item, &mut state.enhance_stones, &content.enhance, rng) {
                upgrade::EnhanceOutcome::Upgraded { .. } => {
                    attempts += 1;
                    successes += 1;
                }
                upgrade::EnhanceOutcome::Held { .. } => attempts += 1,
                upgrade::EnhanceOutcome::Downgraded { .. } => {
                    attempts += 1;
                    downgrades += 1;
                }
                // Out of stones: stop this slot, the next may be cheaper.
                upgrade::EnhanceOutcome::InsufficientStones => continue 'slots,
                upgrade::EnhanceOutcome::AlreadyMaxed => break,
            }
        }
    }
    if attempts > 0 {
        events.push(emit(
            &mut state.counters,
            day,
            Event::EnhancementPass {
                attempts,
                successes,
                downgrades,
                stones_spent: stones_before - state.enhance_stones,
            },
        ));
    }
}

fn run_sublimation_pass(
    state: &mut CampaignState,
    content: &GameContent,
    policy: &dyn UpgradePolicy,
    day: u32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let order = policy.sublimation_order(state, content);
    let per_item = content.constants.sublimation_attempts_per_item;
    let essence_before = state.character.essence;
    let mut attempts = 0_u32;
    let mut successes = 0_u32;
    for slot in order {
        let mut advanced = 0_u32;
        while advanced < per_item {
            let Some(item) = state.character.gear.get_mut(&slot) else {
                break;
            };
            match upgrade::try_sublimate(
                item,
                &mut state.character.essence,
                &content.sublimation,
                rng,
            ) {
                upgrade::SublimationOutcome::Advanced { level, quality } => {
                    attempts += 1;
                    successes += 1;
                    advanced += 1;
                    events.push(emit(
                        &mut state.counters,
                        day,
                        Event::SublimationSuccess {
                            slot,
                            quality,
                            level,
                        },
                    ));
                }
                // First failure ends the item for the day.
                upgrade::SublimationOutcome::Held { .. } => {
                    attempts += 1;
                    break;
                }
                upgrade::SublimationOutcome::AlreadyMaxed
                | upgrade::SublimationOutcome::InsufficientEssence => break,
            }
        }
    }
    if attempts > 0 {
        events.push(emit(
            &mut state.counters,
            day,
            Event::SublimationPass {
                attempts,
                successes,
                essence_spent: essence_before - state.character.essence,
            },
        ));
    }
}

fn tier_def<'a>(content: &'a GameContent, id: &TierId) -> Option<&'a crate::types::EnemyTierDef> {
    content.enemy_tiers.iter().find(|t| &t.id == id)
}

/// Exp reward scaled by the enemy tier's multiplier and the zone-level
/// factor, matching the stat scaling in `combat::tier_enemy`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tier_exp(base: u64, exp_mult: f64, zone_level: u32, content: &GameContent) -> u64 {
    let level_mult = 1.0
        + f64::from(zone_level.saturating_sub(1))
            * f64::from(content.constants.enemy_level_scaling_pct)
            / 100.0;
    (base as f64 * exp_mult * level_mult).trunc() as u64
}

fn fight_normal(
    state: &mut CampaignState,
    content: &GameContent,
    day: u32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let constants = &content.constants;
    let Some(zone) = content.zones.get(state.zone_index) else {
        return false;
    };
    let Some(tier) = tier_def(content, &zone.normal_tier) else {
        return false;
    };
    let totals = stats::character_totals(&state.character, constants);
    let player = combat::player_combatant(&totals, state.character.hp, state.character.level);
    let enemy = combat::tier_enemy(tier, zone.level, constants);
    let report = combat::resolve_battle(&player, &enemy, constants, rng);
    state.tally.battles += 1;
    let victory = report.outcome == BattleOutcome::Victory;
    events.push(emit(
        &mut state.counters,
        day,
        Event::BattleResolved {
            class: EnemyClass::Normal,
            zone: zone.id.clone(),
            victory,
            turns: report.turns,
            hp_remaining: report.player_hp,
        },
    ));
    if victory {
        state.tally.wins += 1;
        state.character.hp = report.player_hp;
        let exp = tier_exp(constants.normal_win_exp, tier.exp_mult, zone.level, content);
        award_exp(state, exp, content, day, events);
        state.enhance_stones += constants.normal_win_stones;
        let list = drops::roll_battle_drops(&content.drops, EnemyClass::Normal, state.zone_index, rng);
        state.inventory.add_drops(&list);
        state.character.heal_pct(constants.victory_recovery_pct);
    } else {
        state.tally.deaths += 1;
        events.push(emit(
            &mut state.counters,
            day,
            Event::CharacterDied {
                zone: zone.id.clone(),
                class: EnemyClass::Normal,
            },
        ));
        state.character.restore_full();
    }
    victory
}

fn sweep(
    state: &mut CampaignState,
    content: &GameContent,
    day: u32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let constants = &content.constants;
    let Some(zone) = content.zones.get(state.zone_index) else {
        return;
    };
    if state.stamina < constants.sweep_stamina_cost {
        return;
    }
    state.stamina -= constants.sweep_stamina_cost;
    // A sweep is an instant clear of the zone's elite encounter: elite-tier
    // exp scaling and elite battle drops, no combat rolls.
    let exp_mult = tier_def(content, &zone.elite_tier).map_or(1.0, |t| t.exp_mult);
    let exp = tier_exp(constants.sweep_exp, exp_mult, zone.level, content);
    award_exp(state, exp, content, day, events);
    state.enhance_stones += constants.sweep_stones;
    let list = drops::roll_battle_drops(&content.drops, EnemyClass::Elite, state.zone_index, rng);
    state.inventory.add_drops(&list);
    events.push(emit(
        &mut state.counters,
        day,
        Event::SweepCompleted {
            zone: zone.id.clone(),
            exp,
            stones: constants.sweep_stones,
        },
    ));
}

fn maybe_fight_boss(
    state: &mut CampaignState,
    content: &GameContent,
    day: u32,
    rng: &mut impl Rng,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let constants = &content.constants;
    let Some(zone) = content.zones.get(state.zone_index) else {
        return;
    };
    if state.boss_attempted_today.contains(&state.zone_index) {
        return;
    }
    let rolled = rng.gen_range(0..upgrade::ROLL_DENOMINATOR_BPS);
    let attempted = rolled < constants.boss_attempt_chance_bps;
    if event_level == EventLevel::Debug {
        events.push(emit(
            &mut state.counters,
            day,
            Event::BossAttemptRoll {
                zone: zone.id.clone(),
                chance_bps: constants.boss_attempt_chance_bps,
                rolled,
                attempted,
            },
        ));
    }
    if !attempted {
        return;
    }
    state.boss_attempted_today.insert(state.zone_index);

    let totals = stats::character_totals(&state.character, constants);
    let player = combat::player_combatant(&totals, state.character.hp, state.character.level);
    let enemy = combat::boss_combatant(&zone.boss, zone.level);
    let report = combat::resolve_battle(&player, &enemy, constants, rng);
    state.tally.battles += 1;
    let victory = report.outcome == BattleOutcome::Victory;
    events.push(emit(
        &mut state.counters,
        day,
        Event::BattleResolved {
            class: EnemyClass::Boss,
            zone: zone.id.clone(),
            victory,
            turns: report.turns,
            hp_remaining: report.player_hp,
        },
    ));
    if victory {
        state.tally.wins += 1;
        state.character.hp = report.player_hp;
        award_exp(state, constants.boss_win_exp, content, day, events);
        state.enhance_stones += constants.boss_win_stones;
        let list = drops::roll_battle_drops(&content.drops, EnemyClass::Boss, state.zone_index, rng);
        state.inventory.add_drops(&list);
        state.bosses_defeated.insert(state.zone_index);
        state.sweep_unlocked.insert(state.zone_index);
        events.push(emit(
            &mut state.counters,
            day,
            Event::BossDefeated {
                zone: zone.id.clone(),
            },
        ));
        if state.zone_index + 1 >= content.zones.len() {
            state.cleared = true;
            events.push(emit(&mut state.counters, day, Event::CampaignCleared { day }));
        } else {
            state.zone_index += 1;
            events.push(emit(
                &mut state.counters,
                day,
                Event::ZoneAdvanced {
                    zone: content.zones[state.zone_index].id.clone(),
                },
            ));
        }
    } else {
        state.tally.deaths += 1;
        events.push(emit(
            &mut state.counters,
            day,
            Event::CharacterDied {
                zone: zone.id.clone(),
                class: EnemyClass::Boss,
            },
        ));
        state.character.restore_full();
    }
}

fn award_exp(
    state: &mut CampaignState,
    amount: u64,
    content: &GameContent,
    day: u32,
    events: &mut Vec<EventEnvelope>,
) {
    let levels = state.character.gain_exp(amount, &content.constants);
    if levels > 0 {
        events.push(emit(
            &mut state.counters,
            day,
            Event::LevelUp {
                level: state.character.level,
            },
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
