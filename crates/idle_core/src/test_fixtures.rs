//! Shared fixtures for unit and integration tests.
//!
//! `base_content()` is a compact two-zone content set with full rule tables,
//! small enough that assertions about its numbers stay readable. It is not
//! the shipped content; see `idle_world` for that.

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::id::generate_uuid;
use crate::types::{
    ArmorDef, BossStats, CampaignState, Character, Constants, Counters, DropTables, EnemyBase,
    EnemyTierDef, EnhanceRules, ExplorationRates, GameContent, Inventory, MetaState, PerClass,
    PowerWeights, Quality, SetBonusDef, Slot, StatBlock, SublimationRules, TierId, ZoneDef,
    ZoneId,
};
use crate::{stats, types::EquipmentItem};

/// Fixed-seed rng for deterministic tests.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

fn armor(slot: Slot, name: &str, base: StatBlock) -> ArmorDef {
    ArmorDef {
        slot,
        name: name.to_string(),
        base,
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

#[allow(clippy::too_many_lines)]
pub fn base_content() -> GameContent {
    let zones = vec![
        ZoneDef {
            id: ZoneId("zone_training_belt".to_string()),
            name: "Training Belt".to_string(),
            level: 1,
            normal_tier: TierId("t1".to_string()),
            elite_tier: TierId("t1".to_string()),
            boss_tier: TierId("t1_plus".to_string()),
            min_enhance_level: 3,
            boss: BossStats {
                hp: 260,
                attack: 20.0,
                defense: 8.0,
                attack_speed: 1.2,
                crit: 12.0,
                crit_damage: 80.0,
                guard: 12.0,
            },
        },
        ZoneDef {
            id: ZoneId("zone_scrap_orbit".to_string()),
            name: "Scrap Orbit".to_string(),
            level: 2,
            normal_tier: TierId("t1_plus".to_string()),
            elite_tier: TierId("t1_plus".to_string()),
            boss_tier: TierId("t1_plus".to_string()),
            min_enhance_level: 5,
            boss: BossStats {
                hp: 320,
                attack: 25.0,
                defense: 10.0,
                attack_speed: 1.22,
                crit: 13.0,
                crit_damage: 85.0,
                guard: 13.0,
            },
        },
    ];

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
        zone_modifiers_bps: vec![[0, 0, 0, 0, 0], [-200, -200, -200, 400, 200]],
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

    GameContent {
        content_version: "test".to_string(),
        zones,
        armor: armor_defs,
        enemy_tiers,
        drops,
        enhance,
        sublimation,
        constants,
    }
}

/// Day-zero state: level 1, full gear at quality 1, full bars.
pub fn base_state(content: &GameContent) -> CampaignState {
    let mut rng = make_rng();
    let mut gear = AHashMap::new();
    for def in &content.armor {
        gear.insert(
            def.slot,
            EquipmentItem {
                id: generate_uuid(&mut rng),
                slot: def.slot,
                name: def.name.clone(),
                quality: Quality::Stardust,
                enhance_level: 0,
                sublimation_level: 0,
                base: def.base,
            },
        );
    }
    let mut character = Character {
        level: 1,
        exp: 0,
        hp: 0,
        max_hp: 0,
        essence: content.constants.essence_max,
        gear,
    };
    let totals = stats::character_totals(&character, &content.constants);
    #[allow(clippy::cast_possible_truncation)]
    {
        character.max_hp = totals.hp as i64;
    }
    character.hp = character.max_hp;

    CampaignState {
        meta: MetaState {
            day: 0,
            seed: 42,
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
        bosses_defeated: std::collections::HashSet::new(),
        sweep_unlocked: std::collections::HashSet::new(),
        boss_attempted_today: std::collections::HashSet::new(),
        tally: crate::types::BattleTally::default(),
        idle_totals: crate::types::IdleTotals::default(),
        counters: Counters { next_event_id: 0 },
    }
}
