//! Content loading and campaign bootstrap shared between idle_cli and
//! idle_bench. Ships a built-in eight-zone content set; external content
//! files use the same schema.

use anyhow::{Context, Result};
use rand::Rng;
use std::collections::HashSet;
use std::path::Path;

use idle_core::{
    ArmorDef, BattleTally, BossStats, CampaignState, Character, Constants, Counters, DropTables,
    EnemyBase, EnemyTierDef, EnhanceRules, EquipmentItem, ExplorationRates, GameContent,
    IdleTotals, Inventory, MetaState, PerClass, PowerWeights, Quality, SetBonusDef, Slot,
    StatBlock, SublimationRules, TierId, ZoneDef, ZoneId,
};

// ---------------------------------------------------------------------------
// Built-in content
// ---------------------------------------------------------------------------

const ZONE_TABLE: [(&str, &str, u8); 8] = [
    ("zone_training_belt", "Training Belt", 3),
    ("zone_scrap_orbit", "Scrap Orbit", 5),
    ("zone_copper_verge", "Copper Verge", 7),
    ("zone_ion_fields", "Ion Fields", 10),
    ("zone_titan_foundry", "Titan Foundry", 12),
    ("zone_void_reach", "Void Reach", 15),
    ("zone_quantum_shoals", "Quantum Shoals", 17),
    ("zone_meteor_crown", "Meteor Crown", 20),
];

fn zone_tier_ids(index: usize) -> (&'static str, &'static str) {
    match index {
        0 | 1 => ("t1", "t1_plus"),
        2..=4 => ("t2", "t2_plus"),
        _ => ("t3", "t3_plus"),
    }
}

fn tier(id: &str, hp: f64, attack: f64, defense: f64, exp: f64) -> EnemyTierDef {
    EnemyTierDef {
        id: TierId(id.to_string()),
        hp_mult: hp,
        attack_mult: attack,
        defense_mult: defense,
        exp_mult: exp,
    }
}

fn armor(slot: Slot, name: &str, base: StatBlock) -> ArmorDef {
    ArmorDef {
        slot,
        name: name.to_string(),
        base,
    }
}

/// The shipped content set: eight zones of rising difficulty, full rate
/// tables, and the tuning constants for a hundred-day campaign.
#[allow(clippy::too_many_lines, clippy::cast_possible_truncation)]
pub fn builtin_content() -> GameContent {
    let zones = ZONE_TABLE
        .iter()
        .enumerate()
        .map(|(i, (id, name, min_enhance))| {
            let (normal, plus) = zone_tier_ids(i);
            let step = i as f64;
            ZoneDef {
                id: ZoneId((*id).to_string()),
                name: (*name).to_string(),
                level: i as u32 + 1,
                normal_tier: TierId(normal.to_string()),
                elite_tier: TierId(plus.to_string()),
                boss_tier: TierId(plus.to_string()),
                min_enhance_level: *min_enhance,
                boss: BossStats {
                    hp: 260 + 60 * i as i64,
                    attack: 20.0 + 5.0 * step,
                    defense: 8.0 + 2.0 * step,
                    attack_speed: 1.2 + 0.02 * step,
                    crit: 12.0 + step,
                    crit_damage: 80.0 + 5.0 * step,
                    guard: 12.0 + step,
                },
            }
        })
        .collect();

    let armor_defs = vec![
        armor(
            Slot::Helmet,
            "Visor Helm",
            StatBlock {
                defense: 2.0,
                hp: 12.0,
                hit: 2.0,
                ..StatBlock::default()
            },
        ),
        armor(
            Slot::Chest,
            "Plated Vest",
            StatBlock {
                defense: 3.0,
                hp: 18.0,
                speed: 0.5,
                ..StatBlock::default()
            },
        ),
        armor(
            Slot::Shoulder,
            "Guard Pads",
            StatBlock {
                defense: 1.0,
                hp: 8.0,
                dodge: 1.0,
                ..StatBlock::default()
            },
        ),
        armor(
            Slot::Arm,
            "Servo Bracers",
            StatBlock {
                attack: 5.0,
                ..StatBlock::default()
            },
        ),
        armor(
            Slot::Leg,
            "Flex Greaves",
            StatBlock {
                defense: 2.0,
                hp: 6.0,
                dodge: 1.0,
                ..StatBlock::default()
            },
        ),
        armor(
            Slot::Boot,
            "Mag Boots",
            StatBlock {
                defense: 1.0,
                hp: 4.0,
                dodge: 2.0,
                ..StatBlock::default()
            },
        ),
    ];

    let enemy_tiers = vec![
        tier("t1", 1.0, 1.0, 1.0, 1.0),
        tier("t1_plus", 1.3, 1.2, 1.2, 1.3),
        tier("t2", 1.6, 1.5, 1.5, 1.8),
        tier("t2_plus", 2.0, 1.8, 1.8, 2.3),
        tier("t3", 2.5, 2.2, 2.2, 3.0),
        tier("t3_plus", 3.0, 2.6, 2.6, 4.0),
    ];

    let drops = DropTables {
        battle_rates_bps: PerClass {
            normal: [4_000, 2_500, 2_000, 1_000, 500],
            elite: [2_000, 3_000, 2_000, 2_000, 1_000],
            boss: [1_000, 2_000, 3_000, 2_500, 1_500],
        },
        battle_rolls: PerClass {
            normal: 3,
            elite: 5,
            boss: 7,
        },
        zone_modifiers_bps: vec![
            [0, 0, 0, 0, 0],
            [-200, -200, -200, 400, 200],
            [-400, -400, -400, 800, 400],
            [-600, -600, -600, 1_200, 600],
            [-800, -800, -800, 1_600, 800],
            [-1_000, -1_000, -1_000, 2_000, 1_000],
            [0, -300, -300, 400, 200],
            [0, -600, -600, 800, 400],
        ],
        rate_floor_bps: 100,
        rate_cap_bps: 9_500,
        exploration: ExplorationRates {
            base_rates_bps: [5_000, 3_000, 1_500, 400, 100],
            stardust_floor_bps: 1_000,
            level_bonus_per_level_bps: 200,
            level_bonus_cap_bps: 2_000,
            hunt_rolls: PerClass {
                normal: [1, 2],
                elite: [2, 3],
                boss: [3, 5],
            },
            hunt_units: [1, 2],
            gather_units: [1, 3],
            hunt_stamina_cost: 10,
            gather_stamina_cost: 5,
        },
    };

    let enhance = EnhanceRules {
        max_level: 20,
        success_bps: (0..20_u32).map(|l| 10_000 - 500 * l).collect(),
        stone_cost: (0..20_u64).map(|l| l / 2 + 1).collect(),
        downgrade_floor: 5,
    };

    let sublimation = SublimationRules {
        max_level: 10,
        success_bps: vec![10_000, 9_000, 8_000, 6_000, 4_000, 2_000, 500, 100, 10, 1],
        essence_cost: 25,
    };

    let constants = Constants {
        max_days: 100,
        minutes_per_day: 1_440,
        essence_regen_per_minute: 1,
        essence_max: 100,
        stamina_max: 100,
        stamina_regen_per_day: 50,
        synthesis_ratio: 5,
        starting_stones: 100,
        idle_hours_per_day: 24,
        idle_credits_per_hour: 60,
        idle_exp_per_hour: 6,
        idle_materials_per_hour: 10,
        idle_stones_per_hour: 2,
        idle_boss_bonus_pct: 20,
        boss_attempt_chance_bps: 3_000,
        max_battle_turns: 200,
        min_damage: 1,
        victory_recovery_pct: 30,
        normal_win_exp: 50,
        boss_win_exp: 200,
        sweep_exp: 50,
        normal_win_stones: 1,
        boss_win_stones: 5,
        sweep_stones: 1,
        sweep_stamina_cost: 10,
        exp_per_level: 100,
        enemy_level_scaling_pct: 10,
        enemy_base: EnemyBase {
            hp: 200.0,
            attack: 20.0,
            defense: 10.0,
            attack_speed: 1.0,
            crit: 5.0,
            crit_damage: 50.0,
            guard: 5.0,
        },
        player_base: StatBlock {
            hp: 100.0,
            attack: 10.0,
            defense: 5.0,
            speed: 1.0,
            hit: 100.0,
            dodge: 10.0,
            crit: 5.0,
            crit_damage: 50.0,
            guard: 5.0,
            ..StatBlock::default()
        },
        level_up_hp: 10.0,
        level_up_attack: 2.0,
        level_up_defense: 1.0,
        set_bonuses: vec![
            SetBonusDef {
                pieces: 2,
                attack_mult_pct: 10,
                crit_bonus: 0.0,
            },
            SetBonusDef {
                pieces: 4,
                attack_mult_pct: 20,
                crit_bonus: 5.0,
            },
            SetBonusDef {
                pieces: 6,
                attack_mult_pct: 35,
                crit_bonus: 10.0,
            },
        ],
        power_weights: PowerWeights {
            hp: 0.5,
            attack: 10.0,
            defense: 8.0,
            crit: 5.0,
            speed: 50.0,
        },
        enhance_attempt_cap: 1_000,
        sublimation_attempts_per_item: 2,
        power_ratio_target: 1.2,
    };

    let content = GameContent {
        content_version: "content_v1".to_string(),
        zones,
        armor: armor_defs,
        enemy_tiers,
        drops,
        enhance,
        sublimation,
        constants,
    };
    validate_content(&content);
    content
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

/// Validates cross-references in loaded content, panicking on any authoring
/// error.
///
/// Catches mistakes like a zone naming an unknown enemy tier, rate tables
/// that are shorter than the level cap, or a sublimation ladder whose rates
/// are not monotone.
#[allow(clippy::cognitive_complexity)]
pub fn validate_content(content: &GameContent) {
    assert!(!content.zones.is_empty(), "content has no zones");

    let tier_ids: HashSet<&TierId> = content.enemy_tiers.iter().map(|t| &t.id).collect();
    assert!(
        tier_ids.len() == content.enemy_tiers.len(),
        "duplicate enemy tier ids"
    );

    let mut covered: HashSet<Slot> = HashSet::new();
    for def in &content.armor {
        assert!(
            covered.insert(def.slot),
            "armor slot {:?} defined more than once",
            def.slot,
        );
    }
    for slot in Slot::ALL {
        assert!(covered.contains(&slot), "armor slot {slot:?} has no def");
    }

    for zone in &content.zones {
        for tier_ref in [&zone.normal_tier, &zone.elite_tier, &zone.boss_tier] {
            assert!(
                tier_ids.contains(tier_ref),
                "zone '{}' references unknown enemy tier '{}'",
                zone.id,
                tier_ref,
            );
        }
        assert!(
            zone.min_enhance_level <= content.enhance.max_level,
            "zone '{}' min_enhance_level {} exceeds enhance max_level {}",
            zone.id,
            zone.min_enhance_level,
            content.enhance.max_level,
        );
        assert!(zone.level >= 1, "zone '{}' level must be >= 1", zone.id);
    }

    assert!(
        content.drops.zone_modifiers_bps.len() == content.zones.len(),
        "zone_modifiers_bps has {} rows for {} zones",
        content.drops.zone_modifiers_bps.len(),
        content.zones.len(),
    );
    assert!(
        content.drops.rate_floor_bps <= content.drops.rate_cap_bps,
        "drop rate floor exceeds cap"
    );
    for rates in [
        &content.drops.battle_rates_bps.normal,
        &content.drops.battle_rates_bps.elite,
        &content.drops.battle_rates_bps.boss,
        &content.drops.exploration.base_rates_bps,
    ] {
        for rate in rates {
            assert!(*rate <= 10_000, "drop rate {rate} bps exceeds 100%");
        }
    }

    assert!(
        content.enhance.success_bps.len() == usize::from(content.enhance.max_level),
        "enhance success table has {} entries for max_level {}",
        content.enhance.success_bps.len(),
        content.enhance.max_level,
    );
    assert!(
        content.enhance.stone_cost.len() == usize::from(content.enhance.max_level),
        "enhance cost table has {} entries for max_level {}",
        content.enhance.stone_cost.len(),
        content.enhance.max_level,
    );
    assert!(
        content.sublimation.success_bps.len() == usize::from(content.sublimation.max_level),
        "sublimation table has {} entries for max_level {}",
        content.sublimation.success_bps.len(),
        content.sublimation.max_level,
    );
    for pair in content.sublimation.success_bps.windows(2) {
        assert!(
            pair[1] <= pair[0],
            "sublimation success rates must be non-increasing"
        );
    }

    let c = &content.constants;
    assert!(c.exp_per_level > 0, "exp_per_level must be > 0");
    assert!(c.synthesis_ratio > 1, "synthesis_ratio must be > 1");
    assert!(c.max_battle_turns > 0, "max_battle_turns must be > 0");
    for pair in c.set_bonuses.windows(2) {
        assert!(
            pair[0].pieces < pair[1].pieces,
            "set bonuses must be sorted by piece count"
        );
    }
}

/// Load a full content set from a single JSON file and validate it.
pub fn load_content(path: &str) -> Result<GameContent> {
    let json = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("reading content file: {path}"))?;
    let content: GameContent =
        serde_json::from_str(&json).with_context(|| format!("parsing content file: {path}"))?;
    validate_content(&content);
    Ok(content)
}

// ---------------------------------------------------------------------------
// Initial state
// ---------------------------------------------------------------------------

/// Day-zero campaign state: a level-1 character wearing one tier-1 piece per
/// slot, full essence and stamina, starting stones.
pub fn build_initial_state(content: &GameContent, seed: u64, rng: &mut impl Rng) -> CampaignState {
    let gear = content
        .armor
        .iter()
        .map(|def| {
            let item = EquipmentItem {
                id: idle_core::generate_uuid(rng),
                slot: def.slot,
                name: def.name.clone(),
                quality: Quality::Stardust,
                enhance_level: 0,
                sublimation_level: 0,
                base: def.base,
            };
            (def.slot, item)
        })
        .collect();
    let mut character = Character {
        level: 1,
        exp: 0,
        hp: 0,
        max_hp: 0,
        essence: content.constants.essence_max,
        gear,
    };
    character.refresh_max_hp(&content.constants);
    character.restore_full();

    CampaignState {
        meta: MetaState {
            day: 0,
            seed,
            schema_version: 1,
            content_version: content.content_version.clone(),
        },
        character,
        inventory: Inventory::new(),
        zone_index: 0,
        cleared: false,
        stamina: content.constants.stamina_max,
        credits: 0,
        enhance_stones: content.constants.starting_stones,
        bosses_defeated: HashSet::new(),
        sweep_unlocked: HashSet::new(),
        boss_attempted_today: HashSet::new(),
        tally: BattleTally::default(),
        idle_totals: IdleTotals::default(),
        counters: Counters { next_event_id: 0 },
    }
}

// ---------------------------------------------------------------------------
// Run metadata
// ---------------------------------------------------------------------------

/// Write `run_info.json` into a run directory.
pub fn write_run_info(
    dir: &Path,
    run_id: &str,
    seed: u64,
    content_version: &str,
    metrics_every: u32,
    args: serde_json::Value,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": chrono::Utc::now().to_rfc3339(),
        "content_version": content_version,
        "metrics_every": metrics_every,
        "args": args,
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::test_fixtures::make_rng;

    #[test]
    fn builtin_content_passes_validation() {
        let content = builtin_content(); // validates internally
        assert_eq!(content.zones.len(), 8);
        assert_eq!(content.enemy_tiers.len(), 6);
        assert_eq!(content.armor.len(), 6);
    }

    #[test]
    fn builtin_zone_difficulty_is_monotone() {
        let content = builtin_content();
        for pair in content.zones.windows(2) {
            assert!(pair[0].level < pair[1].level);
            assert!(pair[0].min_enhance_level <= pair[1].min_enhance_level);
            assert!(pair[0].boss.hp < pair[1].boss.hp);
        }
    }

    #[test]
    #[should_panic(expected = "unknown enemy tier")]
    fn zone_with_unknown_tier_panics() {
        let mut content = builtin_content();
        content.zones[0].normal_tier = TierId("t_missing".to_string());
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "zone_modifiers_bps")]
    fn modifier_row_count_mismatch_panics() {
        let mut content = builtin_content();
        content.drops.zone_modifiers_bps.pop();
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "non-increasing")]
    fn sublimation_rates_must_fall() {
        let mut content = builtin_content();
        content.sublimation.success_bps[3] = 9_999;
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "exceeds 100%")]
    fn drop_rate_over_denominator_panics() {
        let mut content = builtin_content();
        content.drops.battle_rates_bps.boss[0] = 10_001;
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "has no def")]
    fn missing_armor_slot_panics() {
        let mut content = builtin_content();
        content.armor.pop();
        validate_content(&content);
    }

    #[test]
    fn content_round_trips_through_file() {
        let content = builtin_content();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(&path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
        let loaded = load_content(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.content_version, content.content_version);
        assert_eq!(loaded.zones.len(), content.zones.len());
        assert_eq!(loaded.enhance.success_bps, content.enhance.success_bps);
    }

    #[test]
    fn load_content_missing_file_errors() {
        let err = load_content("/no/such/content.json").unwrap_err();
        assert!(err.to_string().contains("reading content file"));
    }

    #[test]
    fn initial_state_is_fully_equipped() {
        let content = builtin_content();
        let state = build_initial_state(&content, 42, &mut make_rng());
        assert_eq!(state.character.gear.len(), 6);
        assert_eq!(state.character.level, 1);
        assert_eq!(state.character.hp, state.character.max_hp);
        assert_eq!(state.enhance_stones, content.constants.starting_stones);
        assert_eq!(state.stamina, content.constants.stamina_max);
        assert_eq!(state.meta.seed, 42);
        for item in state.character.gear.values() {
            assert_eq!(item.quality, Quality::Stardust);
            assert_eq!(item.enhance_level, 0);
        }
    }

    #[test]
    fn initial_state_same_seed_same_item_ids() {
        let content = builtin_content();
        let a = build_initial_state(&content, 7, &mut make_rng());
        let b = build_initial_state(&content, 7, &mut make_rng());
        for slot in Slot::ALL {
            assert_eq!(a.character.gear[&slot].id, b.character.gear[&slot].id);
        }
    }

    #[test]
    fn run_info_is_written() {
        let dir = tempfile::tempdir().unwrap();
        write_run_info(
            dir.path(),
            "test_run",
            42,
            "content_v1",
            1,
            serde_json::json!({"days": 100}),
        )
        .unwrap();
        let json = std::fs::read_to_string(dir.path().join("run_info.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["run_id"], "test_run");
        assert_eq!(parsed["seed"], 42);
        assert_eq!(parsed["args"]["days"], 100);
    }
}
