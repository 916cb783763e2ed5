//! Snapshot metrics computed from `CampaignState`.
//!
//! A single `compute_metrics(&CampaignState, &GameContent) -> MetricsSnapshot`
//! function samples the current state for time-series analysis. No state
//! mutation, no IO.

use crate::types::{CampaignState, GameContent, Quality, Slot};
use crate::stats;
use serde::Serialize;
use std::io::Write;

/// Current schema version — bump when fields are added/removed/reordered.
const METRICS_VERSION: u32 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub day: u32,
    pub metrics_version: u32,

    // Character
    pub level: u32,
    pub exp: u64,
    pub power: i64,
    pub hp: i64,
    pub max_hp: i64,
    pub essence: u32,

    // Economy
    pub stamina: u32,
    pub credits: u64,
    pub enhance_stones: u64,

    // Campaign progress
    pub zone_index: usize,
    pub bosses_defeated: u32,
    pub sweeps_unlocked: u32,
    pub cleared: bool,

    // Battles
    pub battles: u64,
    pub wins: u64,
    pub deaths: u64,
    pub win_rate: f64,

    // Gear
    pub min_enhance_level: u8,
    pub max_enhance_level: u8,
    pub avg_enhance_level: f64,
    pub min_sublimation_level: u8,
    pub max_sublimation_level: u8,

    // Materials by tier
    pub materials_t1: u64,
    pub materials_t2: u64,
    pub materials_t3: u64,
    pub materials_t4: u64,
    pub materials_t5: u64,
    pub total_materials: u64,

    // Idle income lifetime totals
    pub idle_credits: u64,
    pub idle_exp: u64,
    pub idle_materials: u64,
    pub idle_stones: u64,
}

#[allow(clippy::cast_possible_truncation)]
pub fn compute_metrics(state: &CampaignState, content: &GameContent) -> MetricsSnapshot {
    let constants = &content.constants;
    let totals = stats::character_totals(&state.character, constants);
    let power = stats::power_score(&totals, &constants.power_weights);

    let mut min_enhance = u8::MAX;
    let mut max_enhance = 0_u8;
    let mut enhance_sum = 0_u32;
    let mut min_sub = u8::MAX;
    let mut max_sub = 0_u8;
    let mut gear_count = 0_u32;
    for slot in Slot::ALL {
        let Some(item) = state.character.gear.get(&slot) else {
            continue;
        };
        gear_count += 1;
        min_enhance = min_enhance.min(item.enhance_level);
        max_enhance = max_enhance.max(item.enhance_level);
        enhance_sum += u32::from(item.enhance_level);
        min_sub = min_sub.min(item.sublimation_level);
        max_sub = max_sub.max(item.sublimation_level);
    }
    if gear_count == 0 {
        min_enhance = 0;
        min_sub = 0;
    }
    let avg_enhance_level = if gear_count > 0 {
        f64::from(enhance_sum) / f64::from(gear_count)
    } else {
        0.0
    };

    let win_rate = if state.tally.battles > 0 {
        state.tally.wins as f64 / state.tally.battles as f64
    } else {
        0.0
    };

    let tiers = state.inventory.tier_totals();

    MetricsSnapshot {
        day: state.meta.day,
        metrics_version: METRICS_VERSION,
        level: state.character.level,
        exp: state.character.exp,
        power,
        hp: state.character.hp,
        max_hp: state.character.max_hp,
        essence: state.character.essence,
        stamina: state.stamina,
        credits: state.credits,
        enhance_stones: state.enhance_stones,
        zone_index: state.zone_index,
        bosses_defeated: state.bosses_defeated.len() as u32,
        sweeps_unlocked: state.sweep_unlocked.len() as u32,
        cleared: state.cleared,
        battles: state.tally.battles,
        wins: state.tally.wins,
        deaths: state.tally.deaths,
        win_rate,
        min_enhance_level: min_enhance,
        max_enhance_level: max_enhance,
        avg_enhance_level,
        min_sublimation_level: min_sub,
        max_sublimation_level: max_sub,
        materials_t1: tiers[0],
        materials_t2: tiers[1],
        materials_t3: tiers[2],
        materials_t4: tiers[3],
        materials_t5: tiers[4],
        total_materials: state.inventory.total(),
        idle_credits: state.idle_totals.credits,
        idle_exp: state.idle_totals.exp,
        idle_materials: state.idle_totals.materials,
        idle_stones: state.idle_totals.stones,
    }
}

/// Write the CSV header row for metrics.
pub fn write_metrics_header(writer: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "day,metrics_version,\
         level,exp,power,hp,max_hp,essence,\
         stamina,credits,enhance_stones,\
         zone_index,bosses_defeated,sweeps_unlocked,cleared,\
         battles,wins,deaths,win_rate,\
         min_enhance_level,max_enhance_level,avg_enhance_level,\
         min_sublimation_level,max_sublimation_level,\
         materials_t1,materials_t2,materials_t3,materials_t4,materials_t5,total_materials,\
         idle_credits,idle_exp,idle_materials,idle_stones"
    )
}

/// Append a single metrics snapshot as a CSV row.
pub fn append_metrics_row(
    writer: &mut impl std::io::Write,
    snapshot: &MetricsSnapshot,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        snapshot.day,
        snapshot.metrics_version,
        snapshot.level,
        snapshot.exp,
        snapshot.power,
        snapshot.hp,
        snapshot.max_hp,
        snapshot.essence,
        snapshot.stamina,
        snapshot.credits,
        snapshot.enhance_stones,
        snapshot.zone_index,
        snapshot.bosses_defeated,
        snapshot.sweeps_unlocked,
        snapshot.cleared,
        snapshot.battles,
        snapshot.wins,
        snapshot.deaths,
        snapshot.win_rate,
        snapshot.min_enhance_level,
        snapshot.max_enhance_level,
        snapshot.avg_enhance_level,
        snapshot.min_sublimation_level,
        snapshot.max_sublimation_level,
        snapshot.materials_t1,
        snapshot.materials_t2,
        snapshot.materials_t3,
        snapshot.materials_t4,
        snapshot.materials_t5,
        snapshot.total_materials,
        snapshot.idle_credits,
        snapshot.idle_exp,
        snapshot.idle_materials,
        snapshot.idle_stones,
    )
}

/// Write a collection of snapshots to a CSV file.
pub fn write_metrics_csv(path: &str, snapshots: &[MetricsSnapshot]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_metrics_header(&mut file)?;
    for snapshot in snapshots {
        append_metrics_row(&mut file, snapshot)?;
    }
    Ok(())
}

/// Maximum data rows per CSV file before rotating to a new file.
const MAX_ROWS_PER_FILE: usize = 50_000;

/// Rotating metrics CSV writer. Automatically splits into numbered files
/// (`metrics_000.csv`, `metrics_001.csv`, ...) after [`MAX_ROWS_PER_FILE`] rows each.
pub struct MetricsFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    /// Create a new writer, opening the first CSV file with a header row.
    pub fn new(run_dir: std::path::PathBuf) -> std::io::Result<Self> {
        let (writer, _) = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            writer,
        })
    }

    /// Append one snapshot row, rotating to a new file if the current one is full.
    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        if self.rows_in_current_file >= MAX_ROWS_PER_FILE {
            self.writer.flush()?;
            self.file_index += 1;
            let (new_writer, _) = open_csv_file(&self.run_dir, self.file_index)?;
            self.writer = new_writer;
            self.rows_in_current_file = 0;
        }
        append_metrics_row(&mut self.writer, snapshot)?;
        self.writer.flush()?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(
    run_dir: &std::path::Path,
    index: u32,
) -> std::io::Result<(std::io::BufWriter<std::fs::File>, std::path::PathBuf)> {
    let name = format!("metrics_{index:03}.csv");
    let path = run_dir.join(&name);
    let file = std::fs::File::create(&path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_metrics_header(&mut writer)?;
    Ok((writer, path))
}

// ---------------------------------------------------------------------------
// End-of-run record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GearSummary {
    pub slot: Slot,
    pub quality: Quality,
    pub enhance_level: u8,
    pub sublimation_level: u8,
}

/// Final-state summary of one campaign run, for batch aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub days: u32,
    pub cleared: bool,
    pub final_level: u32,
    pub final_zone: usize,
    pub battles: u64,
    pub wins: u64,
    pub deaths: u64,
    pub win_rate: f64,
    pub final_power: i64,
    pub enhance_stones: u64,
    pub credits: u64,
    pub materials_by_tier: [u64; 5],
    pub total_materials: u64,
    pub idle_credits: u64,
    pub idle_exp: u64,
    pub idle_materials: u64,
    pub idle_stones: u64,
    pub gear: Vec<GearSummary>,
}

pub fn build_run_record(state: &CampaignState, content: &GameContent) -> RunRecord {
    let snapshot = compute_metrics(state, content);
    let mut gear = Vec::with_capacity(Slot::ALL.len());
    for slot in Slot::ALL {
        if let Some(item) = state.character.gear.get(&slot) {
            gear.push(GearSummary {
                slot,
                quality: item.quality,
                enhance_level: item.enhance_level,
                sublimation_level: item.sublimation_level,
            });
        }
    }
    RunRecord {
        days: snapshot.day,
        cleared: snapshot.cleared,
        final_level: snapshot.level,
        final_zone: snapshot.zone_index,
        battles: snapshot.battles,
        wins: snapshot.wins,
        deaths: snapshot.deaths,
        win_rate: snapshot.win_rate,
        final_power: snapshot.power,
        enhance_stones: snapshot.enhance_stones,
        credits: snapshot.credits,
        materials_by_tier: [
            snapshot.materials_t1,
            snapshot.materials_t2,
            snapshot.materials_t3,
            snapshot.materials_t4,
            snapshot.materials_t5,
        ],
        total_materials: snapshot.total_materials,
        idle_credits: snapshot.idle_credits,
        idle_exp: snapshot.idle_exp,
        idle_materials: snapshot.idle_materials,
        idle_stones: snapshot.idle_stones,
        gear,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
