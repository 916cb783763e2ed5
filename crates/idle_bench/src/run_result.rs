use idle_core::{MetricsSnapshot, RunRecord};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RunResult {
    pub run_schema_version: u32,
    pub run_status: String,
    pub run_id: String,
    pub git_sha: String,
    pub git_dirty: bool,
    pub seed: u64,
    pub scenario_name: String,
    pub scenario_params: serde_json::Value,
    pub days: u32,
    pub wall_time_ms: u64,
    pub sim_days_per_second: f64,
    pub summary: Option<RunRecord>,
    pub stall_detected: bool,
    pub stall_reason: Option<String>,
    pub metrics_path: String,
    pub error_message: Option<String>,
}

impl RunResult {
    /// Write JSON atomically: write to `.tmp` then rename.
    pub fn write_atomic(&self, path: &Path) -> anyhow::Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// Detect a stalled run: the campaign is not cleared and the character loses
/// more battles than it wins, which means progression has hit a wall.
pub fn detect_stall(snapshot: &MetricsSnapshot) -> (bool, Option<String>) {
    let stalled = !snapshot.cleared && snapshot.battles > 0 && snapshot.win_rate < 0.5;
    if stalled {
        (true, Some("losing majority of battles".to_string()))
    } else {
        (false, None)
    }
}

pub fn git_sha() -> String {
    env!("GIT_SHA").to_string()
}

pub fn git_dirty() -> bool {
    env!("GIT_DIRTY") == "true"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            day: 100,
            metrics_version: 3,
            level: 12,
            exp: 40,
            power: 2_500,
            hp: 300,
            max_hp: 400,
            essence: 50,
            stamina: 80,
            credits: 6_000,
            enhance_stones: 120,
            zone_index: 4,
            bosses_defeated: 4,
            sweeps_unlocked: 4,
            cleared: false,
            battles: 100,
            wins: 90,
            deaths: 10,
            win_rate: 0.9,
            min_enhance_level: 5,
            max_enhance_level: 12,
            avg_enhance_level: 8.0,
            min_sublimation_level: 0,
            max_sublimation_level: 3,
            materials_t1: 200,
            materials_t2: 80,
            materials_t3: 30,
            materials_t4: 10,
            materials_t5: 2,
            total_materials: 322,
            idle_credits: 5_000,
            idle_exp: 500,
            idle_materials: 900,
            idle_stones: 200,
        }
    }

    fn sample_result(summary: Option<RunRecord>) -> RunResult {
        RunResult {
            run_schema_version: 1,
            run_status: "completed".to_string(),
            run_id: "test-uuid".to_string(),
            git_sha: "abc123".to_string(),
            git_dirty: false,
            seed: 42,
            scenario_name: "test_scenario".to_string(),
            scenario_params: serde_json::json!({"days": 100}),
            days: 100,
            wall_time_ms: 50,
            sim_days_per_second: 2000.0,
            summary,
            stall_detected: false,
            stall_reason: None,
            metrics_path: "metrics_000.csv".to_string(),
            error_message: None,
        }
    }

    #[test]
    fn test_run_result_serialization() {
        let json = serde_json::to_string_pretty(&sample_result(None)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["run_schema_version"], 1);
        assert_eq!(parsed["run_status"], "completed");
        assert_eq!(parsed["seed"], 42);
        assert_eq!(parsed["days"], 100);
    }

    #[test]
    fn test_atomic_write() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run_result.json");

        sample_result(None).write_atomic(&path).unwrap();
        assert!(path.exists());
        // Tmp file should not remain
        assert!(!path.with_extension("json.tmp").exists());

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["run_schema_version"], 1);
    }

    #[test]
    fn test_stall_detection_healthy() {
        let snapshot = sample_snapshot();
        let (stalled, reason) = detect_stall(&snapshot);
        assert!(!stalled);
        assert!(reason.is_none());
    }

    #[test]
    fn test_stall_detection_losing_run() {
        let mut snapshot = sample_snapshot();
        snapshot.wins = 30;
        snapshot.deaths = 70;
        snapshot.win_rate = 0.3;
        let (stalled, reason) = detect_stall(&snapshot);
        assert!(stalled);
        assert!(reason.is_some());
    }

    #[test]
    fn test_cleared_run_is_never_stalled() {
        let mut snapshot = sample_snapshot();
        snapshot.cleared = true;
        snapshot.win_rate = 0.2;
        let (stalled, _) = detect_stall(&snapshot);
        assert!(!stalled);
    }

    #[test]
    fn test_git_sha_not_empty() {
        // Build-time env vars should be set
        let sha = git_sha();
        assert!(!sha.is_empty());
    }
}
