use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use idle_control::AutoUpgradePolicy;
use idle_core::{CampaignState, Event, EventLevel};
use idle_world::{build_initial_state, builtin_content, load_content};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "idle_cli", about = "Idle Campaign Sim CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the campaign for a fixed number of days.
    Run {
        #[arg(long, default_value_t = 100)]
        days: u32,
        /// Start a fresh campaign with this seed. Mutually exclusive with --state.
        #[arg(long, conflicts_with = "state_file")]
        seed: Option<u64>,
        /// Load the campaign state from a JSON file. Mutually exclusive with --seed.
        #[arg(long = "state", conflicts_with = "seed")]
        state_file: Option<String>,
        /// Path to a content JSON file; defaults to the built-in content set.
        #[arg(long)]
        content: Option<String>,
        #[arg(long, default_value_t = 10)]
        print_every: u32,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Sample metrics every N days (default 10).
        #[arg(long, default_value_t = 10)]
        metrics_every: u32,
        /// Disable automatic metrics collection to runs/ directory.
        #[arg(long)]
        no_metrics: bool,
        /// Write the final campaign state to this JSON file.
        #[arg(long)]
        save_state: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn generate_run_id(seed: u64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    // Manual UTC time formatting to avoid adding chrono dependency.
    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    // Days since epoch → year/month/day (simplified Gregorian).
    let (year, month, day) = epoch_days_to_date(days);

    format!("{year:04}{month:02}{day:02}_{hours:02}{minutes:02}{seconds:02}_seed{seed}")
}

fn epoch_days_to_date(mut days: u64) -> (u64, u64, u64) {
    // Algorithm from http://howardhinnant.github.io/date_algorithms.html
    days += 719_468;
    let era = days / 146_097;
    let day_of_era = days % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146_096) / 365;
    let year = year_of_era + era * 400;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    (year, month, day)
}

fn create_run_dir(run_id: &str) -> Result<std::path::PathBuf> {
    let dir = std::path::PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

#[allow(clippy::too_many_arguments, clippy::too_many_lines)]
fn run(
    days: u32,
    seed: Option<u64>,
    state_file: Option<String>,
    content_path: Option<&str>,
    print_every: u32,
    event_level: EventLevel,
    metrics_every: u32,
    no_metrics: bool,
    save_state: Option<&str>,
) -> Result<()> {
    let content = match content_path {
        Some(path) => load_content(path)?,
        None => builtin_content(),
    };

    let (mut state, mut rng) = if let Some(path) = state_file {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading state file: {path}"))?;
        let loaded: CampaignState =
            serde_json::from_str(&json).with_context(|| format!("parsing state file: {path}"))?;
        let rng_seed = loaded.meta.seed;
        (loaded, ChaCha8Rng::seed_from_u64(rng_seed))
    } else {
        let resolved_seed = seed.unwrap_or_else(rand::random);
        let mut new_rng = ChaCha8Rng::seed_from_u64(resolved_seed);
        let new_state = build_initial_state(&content, resolved_seed, &mut new_rng);
        (new_state, new_rng)
    };

    // Set up per-run metrics directory.
    let mut metrics_writer: Option<idle_core::MetricsFileWriter> = None;
    if !no_metrics {
        let run_id = generate_run_id(state.meta.seed);
        let run_dir = create_run_dir(&run_id)?;
        idle_world::write_run_info(
            &run_dir,
            &run_id,
            state.meta.seed,
            &content.content_version,
            metrics_every,
            serde_json::json!({
                "runner": "idle_cli",
                "days": days,
                "print_every": print_every,
            }),
        )?;
        let writer = idle_core::MetricsFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        metrics_writer = Some(writer);
        println!("Run directory: {}", run_dir.display());
    }

    let policy = AutoUpgradePolicy;

    println!(
        "Starting campaign: days={days} seed={} zones={} content_version={}",
        state.meta.seed,
        content.zones.len(),
        content.content_version,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..days {
        let events = idle_core::advance_day(&mut state, &content, &policy, &mut rng, event_level);

        // Print notable events regardless of print_every.
        for envelope in &events {
            match &envelope.event {
                Event::BossDefeated { zone } => {
                    println!("*** BOSS DEFEATED: {zone} on day={:03} ***", state.meta.day);
                }
                Event::ZoneAdvanced { zone } => {
                    println!("*** ADVANCED TO: {zone} on day={:03} ***", state.meta.day);
                }
                Event::CampaignCleared { day } => {
                    println!("*** CAMPAIGN CLEARED on day={day:03} ***");
                }
                _ => {}
            }
        }

        if state.meta.day % print_every == 0 {
            print_status(&state, &content);
        }

        if let Some(ref mut writer) = metrics_writer {
            if state.meta.day % metrics_every == 0 {
                let snapshot = idle_core::compute_metrics(&state, &content);
                writer.write_row(&snapshot).context("writing metrics row")?;
            }
        }

        if state.cleared {
            break;
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at day {}:", state.meta.day);
    print_status(&state, &content);

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to runs/ directory.");
    }

    if let Some(path) = save_state {
        let json = serde_json::to_string_pretty(&state).context("serializing campaign state")?;
        std::fs::write(path, json).with_context(|| format!("writing state file: {path}"))?;
        println!("State saved to {path}");
    }

    Ok(())
}

fn print_status(state: &CampaignState, content: &idle_core::GameContent) {
    let zone_name = content
        .zones
        .get(state.zone_index)
        .map_or("?", |z| z.name.as_str());
    let enhance_levels: Vec<u8> = idle_core::Slot::ALL
        .iter()
        .filter_map(|slot| state.character.gear.get(slot))
        .map(|item| item.enhance_level)
        .collect();
    let min_enhance = enhance_levels.iter().min().copied().unwrap_or(0);
    let max_enhance = enhance_levels.iter().max().copied().unwrap_or(0);

    println!(
        "[day={day:03}]  lvl={lvl:3}  hp={hp}/{max_hp}  zone={zone_name}  \
         bosses={bosses}  gear=+{min_enhance}..+{max_enhance}  \
         stones={stones}  credits={credits}  W/L={wins}/{deaths}",
        day = state.meta.day,
        lvl = state.character.level,
        hp = state.character.hp,
        max_hp = state.character.max_hp,
        bosses = state.bosses_defeated.len(),
        stones = state.enhance_stones,
        credits = state.credits,
        wins = state.tally.wins,
        deaths = state.tally.deaths,
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            days,
            seed,
            state_file,
            content,
            print_every,
            event_level,
            metrics_every,
            no_metrics,
            save_state,
        } => {
            let level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            run(
                days,
                seed,
                state_file,
                content.as_deref(),
                print_every,
                level,
                metrics_every,
                no_metrics,
                save_state.as_deref(),
            )?;
        }
    }
    Ok(())
}
