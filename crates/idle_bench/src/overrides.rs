use anyhow::{bail, Result};
use idle_core::Constants;
use std::collections::HashMap;

const VALID_KEYS: &[&str] = &[
    "essence_regen_per_minute",
    "essence_max",
    "stamina_max",
    "stamina_regen_per_day",
    "synthesis_ratio",
    "starting_stones",
    "idle_credits_per_hour",
    "idle_exp_per_hour",
    "idle_materials_per_hour",
    "idle_stones_per_hour",
    "idle_boss_bonus_pct",
    "boss_attempt_chance_bps",
    "max_battle_turns",
    "victory_recovery_pct",
    "sweep_stamina_cost",
    "exp_per_level",
    "enemy_level_scaling_pct",
    "enhance_attempt_cap",
    "sublimation_attempts_per_item",
    "power_ratio_target",
];

pub fn apply_overrides(
    constants: &mut Constants,
    overrides: &HashMap<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in overrides {
        match key.as_str() {
            "essence_regen_per_minute" => {
                constants.essence_regen_per_minute = as_u32(key, value)?;
            }
            "essence_max" => constants.essence_max = as_u32(key, value)?,
            "stamina_max" => constants.stamina_max = as_u32(key, value)?,
            "stamina_regen_per_day" => constants.stamina_regen_per_day = as_u32(key, value)?,
            "synthesis_ratio" => constants.synthesis_ratio = as_u64(key, value)?,
            "starting_stones" => constants.starting_stones = as_u64(key, value)?,
            "idle_credits_per_hour" => constants.idle_credits_per_hour = as_u64(key, value)?,
            "idle_exp_per_hour" => constants.idle_exp_per_hour = as_u64(key, value)?,
            "idle_materials_per_hour" => {
                constants.idle_materials_per_hour = as_u32(key, value)?;
            }
            "idle_stones_per_hour" => constants.idle_stones_per_hour = as_u64(key, value)?,
            "idle_boss_bonus_pct" => constants.idle_boss_bonus_pct = as_u64(key, value)?,
            "boss_attempt_chance_bps" => {
                constants.boss_attempt_chance_bps = as_u32(key, value)?;
            }
            "max_battle_turns" => constants.max_battle_turns = as_u32(key, value)?,
            "victory_recovery_pct" => constants.victory_recovery_pct = as_i64(key, value)?,
            "sweep_stamina_cost" => constants.sweep_stamina_cost = as_u32(key, value)?,
            "exp_per_level" => constants.exp_per_level = as_u64(key, value)?,
            "enemy_level_scaling_pct" => {
                constants.enemy_level_scaling_pct = as_u32(key, value)?;
            }
            "enhance_attempt_cap" => constants.enhance_attempt_cap = as_u32(key, value)?,
            "sublimation_attempts_per_item" => {
                constants.sublimation_attempts_per_item = as_u32(key, value)?;
            }
            "power_ratio_target" => constants.power_ratio_target = as_f64(key, value)?,
            _ => bail!(
                "unknown override key '{key}'. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
    }
    Ok(())
}

fn as_f64(key: &str, value: &serde_json::Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected a number, got {value}"))
}

fn as_u64(key: &str, value: &serde_json::Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        anyhow::anyhow!("override '{key}': expected a positive integer, got {value}")
    })
}

fn as_u32(key: &str, value: &serde_json::Value) -> Result<u32> {
    let val = as_u64(key, value)?;
    u32::try_from(val)
        .map_err(|_| anyhow::anyhow!("override '{key}': value {val} exceeds u32 range"))
}

fn as_i64(key: &str, value: &serde_json::Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| anyhow::anyhow!("override '{key}': expected an integer, got {value}"))
}
