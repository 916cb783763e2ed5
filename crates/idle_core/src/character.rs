//! Character progression: experience, leveling, equipment, hp bookkeeping.

use crate::stats;
use crate::types::{Character, Constants, EquipmentItem};

impl Character {
    /// Exp required to go from the current level to the next.
    pub fn exp_to_next(&self, constants: &Constants) -> u64 {
        u64::from(self.level) * constants.exp_per_level
    }

    /// Award exp, applying as many level-ups as the total covers.
    /// Returns the number of levels gained.
    pub fn gain_exp(&mut self, amount: u64, constants: &Constants) -> u32 {
        self.exp += amount;
        let mut gained = 0_u32;
        while self.exp >= self.exp_to_next(constants) {
            self.exp -= self.exp_to_next(constants);
            self.level += 1;
            gained += 1;
        }
        if gained > 0 {
            self.refresh_max_hp(constants);
        }
        gained
    }

    pub fn equip(&mut self, item: EquipmentItem, constants: &Constants) {
        self.gear.insert(item.slot, item);
        self.refresh_max_hp(constants);
    }

    /// Recompute max hp from level and gear. Current hp never exceeds max.
    #[allow(clippy::cast_possible_truncation)]
    pub fn refresh_max_hp(&mut self, constants: &Constants) {
        let totals = stats::character_totals(self, constants);
        self.max_hp = totals.hp as i64;
        self.hp = self.hp.min(self.max_hp);
    }

    /// Restore a percentage of max hp, capped at max.
    pub fn heal_pct(&mut self, pct: i64) {
        self.hp = (self.hp + self.max_hp * pct / 100).min(self.max_hp);
    }

    pub fn restore_full(&mut self) {
        self.hp = self.max_hp;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::test_fixtures::{base_content, base_state};
    use crate::types::Quality;

    #[test]
    fn exp_curve_scales_with_level() {
        let content = base_content();
        let mut state = base_state(&content);
        assert_eq!(state.character.exp_to_next(&content.constants), 100);
        state.character.level = 7;
        assert_eq!(state.character.exp_to_next(&content.constants), 700);
    }

    #[test]
    fn single_award_can_grant_multiple_levels() {
        let content = base_content();
        let mut state = base_state(&content);
        // 100 + 200 + 300 = 600 to reach level 4; 650 leaves 50 spare.
        let gained = state.character.gain_exp(650, &content.constants);
        assert_eq!(gained, 3);
        assert_eq!(state.character.level, 4);
        assert_eq!(state.character.exp, 50);
    }

    #[test]
    fn exact_threshold_levels_up() {
        let content = base_content();
        let mut state = base_state(&content);
        let gained = state.character.gain_exp(100, &content.constants);
        assert_eq!(gained, 1);
        assert_eq!(state.character.level, 2);
        assert_eq!(state.character.exp, 0);
    }

    #[test]
    fn level_up_raises_max_hp_but_not_current() {
        let content = base_content();
        let mut state = base_state(&content);
        let before_max = state.character.max_hp;
        state.character.hp = 50;
        state.character.gain_exp(100, &content.constants);
        assert_eq!(state.character.max_hp, before_max + 10);
        assert_eq!(state.character.hp, 50);
    }

    #[test]
    fn equip_refreshes_max_hp() {
        let content = base_content();
        let mut state = base_state(&content);
        let before_max = state.character.max_hp;
        let mut chest = state
            .character
            .gear
            .get(&crate::types::Slot::Chest)
            .cloned()
            .unwrap();
        chest.enhance_level = 10;
        chest.quality = Quality::Alloy;
        state.character.equip(chest, &content.constants);
        // +10 enhance on the chest adds 20 hp.
        assert_eq!(state.character.max_hp, before_max + 20);
    }

    #[test]
    fn heal_pct_caps_at_max() {
        let content = base_content();
        let mut state = base_state(&content);
        state.character.hp = state.character.max_hp - 5;
        state.character.heal_pct(30);
        assert_eq!(state.character.hp, state.character.max_hp);
    }
}
