use idle_core::{combat, stats, CampaignState, GameContent, Slot, UpgradePolicy, ZoneDef};

/// Drives daily upgrade decisions automatically:
/// 1. Enhance all gear to the current zone's minimum enhance level, or
///    further when the power ratio against the zone's normal enemy is low.
/// 2. Sublimate the lowest-quality, lowest-progress slots first.
pub struct AutoUpgradePolicy;

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Threat score for the zone's normal-tier enemy: `hp + attack * 10`.
#[allow(clippy::cast_possible_truncation)]
fn enemy_power(zone: &ZoneDef, content: &GameContent) -> i64 {
    let Some(tier) = content
        .enemy_tiers
        .iter()
        .find(|t| t.id == zone.normal_tier)
    else {
        return 0;
    };
    let enemy = combat::tier_enemy(tier, zone.level, &content.constants);
    enemy.hp + (enemy.attack * 10.0).trunc() as i64
}

fn power_ratio(state: &CampaignState, zone: &ZoneDef, content: &GameContent) -> f64 {
    let totals = stats::character_totals(&state.character, &content.constants);
    let player = stats::power_score(&totals, &content.constants.power_weights);
    let enemy = enemy_power(zone, content);
    if enemy <= 0 {
        return f64::INFINITY;
    }
    player as f64 / enemy as f64
}

fn weakest_enhance_level(state: &CampaignState) -> u8 {
    state
        .character
        .gear
        .values()
        .map(|item| item.enhance_level)
        .min()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// AutoUpgradePolicy
// ---------------------------------------------------------------------------

impl UpgradePolicy for AutoUpgradePolicy {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn enhance_target(&self, state: &CampaignState, content: &GameContent) -> Option<u8> {
        let zone = content.zones.get(state.zone_index)?;
        let ratio = power_ratio(state, zone, content);
        // The further the ratio falls below parity, the higher the derived
        // target, up to five levels.
        let derived = ((1.0 - ratio.min(1.0)) * 5.0).trunc() as u8;
        let target = zone
            .min_enhance_level
            .max(derived)
            .min(content.enhance.max_level);
        let behind = weakest_enhance_level(state) < target;
        (behind || ratio < content.constants.power_ratio_target).then_some(target)
    }

    fn sublimation_order(&self, state: &CampaignState, _content: &GameContent) -> Vec<Slot> {
        let mut slots: Vec<Slot> = Slot::ALL
            .iter()
            .copied()
            .filter(|slot| state.character.gear.contains_key(slot))
            .collect();
        slots.sort_by_key(|slot| {
            let item = &state.character.gear[slot];
            (item.quality.index(), item.sublimation_level)
        });
        slots
    }
}
