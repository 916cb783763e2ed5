//! Type definitions for `idle_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulator.

use std::collections::HashSet;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ZoneId);
string_id!(TierId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// Equipment and material quality, ascending. Tier 1 is `Stardust`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Quality {
    Stardust,
    Alloy,
    Crystal,
    Quantum,
    Void,
}

impl Quality {
    pub const ALL: [Quality; 5] = [
        Quality::Stardust,
        Quality::Alloy,
        Quality::Crystal,
        Quality::Quantum,
        Quality::Void,
    ];

    /// Zero-based index into rate tables and tier arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-based tier for display and reporting.
    pub fn tier(self) -> u8 {
        self as u8 + 1
    }

    /// Next quality up, or `None` at `Void`.
    pub fn successor(self) -> Option<Quality> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

/// The ten material kinds the drop economy deals in. Closed set — content
/// never introduces new kinds at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    IronFrame,
    CopperConduit,
    TitaniumPlate,
    EnergyCore,
    SensorSubstrate,
    VoidCore,
    ThrusterFuel,
    NanoFiber,
    MeteoricPadding,
    QuantumFastener,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 10] = [
        MaterialKind::IronFrame,
        MaterialKind::CopperConduit,
        MaterialKind::TitaniumPlate,
        MaterialKind::EnergyCore,
        MaterialKind::SensorSubstrate,
        MaterialKind::VoidCore,
        MaterialKind::ThrusterFuel,
        MaterialKind::NanoFiber,
        MaterialKind::MeteoricPadding,
        MaterialKind::QuantumFastener,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Helmet,
    Chest,
    Shoulder,
    Arm,
    Leg,
    Boot,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Helmet,
        Slot::Chest,
        Slot::Shoulder,
        Slot::Arm,
        Slot::Leg,
        Slot::Boot,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyClass {
    Normal,
    Elite,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// A bundle of combat-relevant scalars. Zero means "does not carry this stat";
/// enhancement growth is gated on a positive base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(default)]
    pub hp: f64,
    #[serde(default)]
    pub attack: f64,
    #[serde(default)]
    pub defense: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub hit: f64,
    #[serde(default)]
    pub dodge: f64,
    #[serde(default)]
    pub crit: f64,
    #[serde(default)]
    pub crit_damage: f64,
    #[serde(default)]
    pub guard: f64,
    #[serde(default)]
    pub agility: f64,
    #[serde(default)]
    pub penetration: f64,
    #[serde(default)]
    pub penetration_pct: f64,
    #[serde(default)]
    pub true_damage: f64,
    #[serde(default)]
    pub luck: f64,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignState {
    pub meta: MetaState,
    pub character: Character,
    pub inventory: Inventory,
    /// Index into `GameContent::zones`.
    pub zone_index: usize,
    pub cleared: bool,
    pub stamina: u32,
    pub credits: u64,
    pub enhance_stones: u64,
    pub bosses_defeated: HashSet<usize>,
    pub sweep_unlocked: HashSet<usize>,
    /// Reset at the start of every day.
    pub boss_attempted_today: HashSet<usize>,
    pub tally: BattleTally,
    pub idle_totals: IdleTotals,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub day: u32,
    pub seed: u64,
    pub schema_version: u32,
    pub content_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleTally {
    pub battles: u64,
    pub wins: u64,
    pub deaths: u64,
}

/// Lifetime idle-income totals, for end-of-run reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdleTotals {
    pub credits: u64,
    pub exp: u64,
    pub materials: u64,
    pub stones: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub level: u32,
    /// Progress toward the next level; resets on level-up.
    pub exp: u64,
    pub hp: i64,
    pub max_hp: i64,
    pub essence: u32,
    pub gear: AHashMap<Slot, EquipmentItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: Uuid,
    pub slot: Slot,
    pub name: String,
    pub quality: Quality,
    pub enhance_level: u8,
    pub sublimation_level: u8,
    pub base: StatBlock,
}

/// Material counts per kind, indexed by quality tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub counts: AHashMap<MaterialKind, [u64; 5]>,
    /// Lifetime units added, including everything later synthesized away.
    pub total_collected: u64,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub day: u32,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    MaterialsSynthesized {
        from_tier: Quality,
        conversions: u64,
    },
    IdleIncome {
        credits: u64,
        exp: u64,
        materials: u32,
        stones: u64,
        bonus_pct: u64,
    },
    LevelUp {
        level: u32,
    },
    EnhancementPass {
        attempts: u32,
        successes: u32,
        downgrades: u32,
        stones_spent: u64,
    },
    SublimationSuccess {
        slot: Slot,
        quality: Quality,
        level: u8,
    },
    SublimationPass {
        attempts: u32,
        successes: u32,
        essence_spent: u32,
    },
    BattleResolved {
        class: EnemyClass,
        zone: ZoneId,
        victory: bool,
        turns: u32,
        hp_remaining: i64,
    },
    CharacterDied {
        zone: ZoneId,
        class: EnemyClass,
    },
    SweepCompleted {
        zone: ZoneId,
        exp: u64,
        stones: u64,
    },
    BossDefeated {
        zone: ZoneId,
    },
    ZoneAdvanced {
        zone: ZoneId,
    },
    CampaignCleared {
        day: u32,
    },
    /// Only emitted at `EventLevel::Debug`.
    BossAttemptRoll {
        zone: ZoneId,
        chance_bps: u32,
        rolled: u32,
        attempted: bool,
    },
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub zones: Vec<ZoneDef>,
    pub armor: Vec<ArmorDef>,
    pub enemy_tiers: Vec<EnemyTierDef>,
    pub drops: DropTables,
    pub enhance: EnhanceRules,
    pub sublimation: SublimationRules,
    pub constants: Constants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmorDef {
    pub slot: Slot,
    pub name: String,
    pub base: StatBlock,
}

/// Multipliers applied to `Constants::enemy_base` for a difficulty tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTierDef {
    pub id: TierId,
    pub hp_mult: f64,
    pub attack_mult: f64,
    pub defense_mult: f64,
    pub exp_mult: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDef {
    pub id: ZoneId,
    pub name: String,
    pub level: u32,
    pub normal_tier: TierId,
    pub elite_tier: TierId,
    pub boss_tier: TierId,
    /// Enhance level the upgrade policy aims for before this zone is safe.
    pub min_enhance_level: u8,
    pub boss: BossStats,
}

/// Fixed boss stat block. Bosses do not use the tier-multiplier path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossStats {
    pub hp: i64,
    pub attack: f64,
    pub defense: f64,
    pub attack_speed: f64,
    pub crit: f64,
    pub crit_damage: f64,
    pub guard: f64,
}

/// Per-enemy-class table, one value per `EnemyClass`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerClass<T> {
    pub normal: T,
    pub elite: T,
    pub boss: T,
}

impl<T> PerClass<T> {
    pub fn get(&self, class: EnemyClass) -> &T {
        match class {
            EnemyClass::Normal => &self.normal,
            EnemyClass::Elite => &self.elite,
            EnemyClass::Boss => &self.boss,
        }
    }
}

/// All drop-rate tables. Probabilities are exact basis points (1 bps =
/// 0.01%), rolled against a 10_000-wide integer range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropTables {
    /// Quality rates per class, lowest tier first.
    pub battle_rates_bps: PerClass<[u32; 5]>,
    pub battle_rolls: PerClass<u32>,
    /// Additive bps adjustment per zone, indexed like `GameContent::zones`.
    pub zone_modifiers_bps: Vec<[i32; 5]>,
    /// Adjusted rates clamp into `[rate_floor_bps, rate_cap_bps]` and are
    /// deliberately not renormalized; shortfall falls through to tier 1.
    pub rate_floor_bps: u32,
    pub rate_cap_bps: u32,
    pub exploration: ExplorationRates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationRates {
    pub base_rates_bps: [u32; 5],
    pub stardust_floor_bps: u32,
    pub level_bonus_per_level_bps: u32,
    pub level_bonus_cap_bps: u32,
    /// Inclusive [min, max] drop rolls per hunt, by difficulty class.
    pub hunt_rolls: PerClass<[u32; 2]>,
    /// Inclusive [min, max] units per hunt drop.
    pub hunt_units: [u32; 2],
    /// Inclusive [min, max] units per gathering trip.
    pub gather_units: [u32; 2],
    pub hunt_stamina_cost: u32,
    pub gather_stamina_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceRules {
    pub max_level: u8,
    /// Success rate per current level, `max_level` entries.
    pub success_bps: Vec<u32>,
    /// Stone cost per current level, `max_level` entries.
    pub stone_cost: Vec<u64>,
    /// Failures at or above this level drop the item one level.
    pub downgrade_floor: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SublimationRules {
    pub max_level: u8,
    /// Success rate per current level, `max_level` entries. The deep tail is
    /// why rates are bps: level 9 is exactly 1 bps (0.01%).
    pub success_bps: Vec<u32>,
    pub essence_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBase {
    pub hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub attack_speed: f64,
    pub crit: f64,
    pub crit_damage: f64,
    pub guard: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBonusDef {
    /// Minimum equipped pieces for the bonus to apply.
    pub pieces: u32,
    /// Percent added to the armor attack total, truncating after each stage.
    pub attack_mult_pct: u64,
    pub crit_bonus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerWeights {
    pub hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub crit: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub max_days: u32,
    pub minutes_per_day: u32,
    pub essence_regen_per_minute: u32,
    pub essence_max: u32,
    pub stamina_max: u32,
    pub stamina_regen_per_day: u32,
    pub synthesis_ratio: u64,
    pub starting_stones: u64,
    pub idle_hours_per_day: u32,
    pub idle_credits_per_hour: u64,
    pub idle_exp_per_hour: u64,
    pub idle_materials_per_hour: u32,
    pub idle_stones_per_hour: u64,
    /// Percent added to idle income per defeated boss.
    pub idle_boss_bonus_pct: u64,
    pub boss_attempt_chance_bps: u32,
    pub max_battle_turns: u32,
    pub min_damage: i64,
    /// Percent of max hp restored after a normal-battle victory.
    pub victory_recovery_pct: i64,
    pub normal_win_exp: u64,
    pub boss_win_exp: u64,
    pub sweep_exp: u64,
    pub normal_win_stones: u64,
    pub boss_win_stones: u64,
    pub sweep_stones: u64,
    pub sweep_stamina_cost: u32,
    /// Exp to reach the next level is `level * exp_per_level`.
    pub exp_per_level: u64,
    /// Percent added to enemy stats per zone level above 1.
    pub enemy_level_scaling_pct: u32,
    pub enemy_base: EnemyBase,
    pub player_base: StatBlock,
    pub level_up_hp: f64,
    pub level_up_attack: f64,
    pub level_up_defense: f64,
    /// Sorted ascending by `pieces`; stages compound.
    pub set_bonuses: Vec<SetBonusDef>,
    pub power_weights: PowerWeights,
    /// Safety cap on enhance attempts per daily pass.
    pub enhance_attempt_cap: u32,
    pub sublimation_attempts_per_item: u32,
    /// The policy keeps enhancing while player/enemy power is below this.
    pub power_ratio_target: f64,
}
