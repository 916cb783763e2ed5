use crate::run_result::{self, RunResult};
use anyhow::{Context, Result};
use idle_control::AutoUpgradePolicy;
use idle_core::{CampaignState, EventLevel, GameContent, MetricsSnapshot};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

pub struct SeedResult {
    pub seed: u64,
    pub final_snapshot: MetricsSnapshot,
    #[allow(dead_code)]
    pub wall_time_ms: u64,
    pub run_id: String,
}

#[allow(clippy::too_many_arguments)]
pub fn run_seed(
    content: &GameContent,
    seed: u64,
    days: u32,
    metrics_every: u32,
    seed_dir: &Path,
    scenario_name: &str,
    scenario_params: &serde_json::Value,
    base_state: Option<&CampaignState>,
) -> Result<SeedResult> {
    let run_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = match base_state {
        Some(base) => {
            let mut cloned = base.clone();
            cloned.meta.seed = seed;
            cloned
        }
        None => idle_world::build_initial_state(content, seed, &mut rng),
    };
    let policy = AutoUpgradePolicy;

    std::fs::create_dir_all(seed_dir)
        .with_context(|| format!("creating seed directory: {}", seed_dir.display()))?;

    // Write run_info.json
    idle_world::write_run_info(
        seed_dir,
        &format!("seed_{seed}"),
        seed,
        &content.content_version,
        metrics_every,
        serde_json::json!({
            "runner": "idle_bench",
            "days": days,
        }),
    )?;

    let mut metrics_writer = idle_core::MetricsFileWriter::new(seed_dir.to_path_buf())
        .with_context(|| format!("opening metrics CSV in {}", seed_dir.display()))?;

    for _ in 0..days {
        idle_core::advance_day(&mut state, content, &policy, &mut rng, EventLevel::Normal);

        if state.meta.day % metrics_every == 0 {
            let snapshot = idle_core::compute_metrics(&state, content);
            metrics_writer
                .write_row(&snapshot)
                .context("writing metrics row")?;
        }

        // The campaign ends on clear; the reported day count is the clear day.
        if state.cleared {
            break;
        }
    }
    let days_run = state.meta.day;

    // Always capture final snapshot
    let final_snapshot = idle_core::compute_metrics(&state, content);
    if state.meta.day % metrics_every != 0 {
        metrics_writer
            .write_row(&final_snapshot)
            .context("writing final metrics row")?;
    }
    metrics_writer.flush().context("flushing metrics")?;

    #[allow(clippy::cast_possible_truncation)]
    let wall_time_ms = start.elapsed().as_millis() as u64;
    let sim_days_per_second = if wall_time_ms > 0 {
        f64::from(days_run) / (wall_time_ms as f64 / 1000.0)
    } else {
        0.0
    };

    let (stall_detected, stall_reason) = run_result::detect_stall(&final_snapshot);

    let run_result = RunResult {
        run_schema_version: 1,
        run_status: "completed".to_string(),
        run_id: run_id.clone(),
        git_sha: run_result::git_sha(),
        git_dirty: run_result::git_dirty(),
        seed,
        scenario_name: scenario_name.to_string(),
        scenario_params: scenario_params.clone(),
        days: days_run,
        wall_time_ms,
        sim_days_per_second,
        summary: Some(idle_core::build_run_record(&state, content)),
        stall_detected,
        stall_reason,
        metrics_path: "metrics_000.csv".to_string(),
        error_message: None,
    };

    run_result
        .write_atomic(&seed_dir.join("run_result.json"))
        .context("writing run_result.json")?;

    Ok(SeedResult {
        seed,
        final_snapshot,
        wall_time_ms,
        run_id,
    })
}
