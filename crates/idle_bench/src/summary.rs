use idle_core::MetricsSnapshot;
use serde::Serialize;

type Extractor = (&'static str, Box<dyn Fn(&MetricsSnapshot) -> f64>);

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub seed_count: usize,
    pub cleared_count: usize,
    pub metrics: Vec<MetricSummary>,
}

#[derive(Debug, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

pub fn compute_summary(snapshots: &[(u64, &MetricsSnapshot)]) -> SummaryStats {
    let seed_count = snapshots.len();
    let cleared_count = snapshots.iter().filter(|(_, s)| s.cleared).count();

    let extractors: Vec<Extractor> = vec![
        ("final_level", Box::new(|s| f64::from(s.level))),
        ("final_power", Box::new(|s| s.power as f64)),
        ("zone_index", Box::new(|s| s.zone_index as f64)),
        (
            "bosses_defeated",
            Box::new(|s| f64::from(s.bosses_defeated)),
        ),
        ("win_rate", Box::new(|s| s.win_rate)),
        ("deaths", Box::new(|s| s.deaths as f64)),
        ("enhance_stones", Box::new(|s| s.enhance_stones as f64)),
        ("credits", Box::new(|s| s.credits as f64)),
        ("total_materials", Box::new(|s| s.total_materials as f64)),
        ("avg_enhance_level", Box::new(|s| s.avg_enhance_level)),
        (
            "max_sublimation_level",
            Box::new(|s| f64::from(s.max_sublimation_level)),
        ),
        ("idle_credits", Box::new(|s| s.idle_credits as f64)),
    ];

    let metrics = extractors
        .iter()
        .map(|(name, extract)| {
            let values: Vec<f64> = snapshots.iter().map(|(_, s)| extract(s)).collect();
            compute_metric_summary(name, &values)
        })
        .collect();

    SummaryStats {
        seed_count,
        cleared_count,
        metrics,
    }
}

fn compute_metric_summary(name: &str, values: &[f64]) -> MetricSummary {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let stddev = variance.sqrt();

    MetricSummary {
        name: name.to_string(),
        mean,
        min,
        max,
        stddev,
    }
}

/// Build aggregated metrics in the batch-summary format:
/// `{ "key": { "mean": ..., "min": ..., "max": ..., "stddev": ... }, ... }`
/// Covers every numeric snapshot field.
#[allow(clippy::too_many_lines)]
pub fn build_aggregated_metrics(snapshots: &[&MetricsSnapshot]) -> serde_json::Value {
    let contract_extractors: Vec<Extractor> = vec![
        ("level", Box::new(|s| f64::from(s.level))),
        ("exp", Box::new(|s| s.exp as f64)),
        ("power", Box::new(|s| s.power as f64)),
        ("hp", Box::new(|s| s.hp as f64)),
        ("max_hp", Box::new(|s| s.max_hp as f64)),
        ("essence", Box::new(|s| f64::from(s.essence))),
        ("stamina", Box::new(|s| f64::from(s.stamina))),
        ("credits", Box::new(|s| s.credits as f64)),
        ("enhance_stones", Box::new(|s| s.enhance_stones as f64)),
        ("zone_index", Box::new(|s| s.zone_index as f64)),
        (
            "bosses_defeated",
            Box::new(|s| f64::from(s.bosses_defeated)),
        ),
        ("sweeps_unlocked", Box::new(|s| f64::from(s.sweeps_unlocked))),
        ("cleared", Box::new(|s| f64::from(u8::from(s.cleared)))),
        ("battles", Box::new(|s| s.battles as f64)),
        ("wins", Box::new(|s| s.wins as f64)),
        ("deaths", Box::new(|s| s.deaths as f64)),
        ("win_rate", Box::new(|s| s.win_rate)),
        (
            "min_enhance_level",
            Box::new(|s| f64::from(s.min_enhance_level)),
        ),
        (
            "max_enhance_level",
            Box::new(|s| f64::from(s.max_enhance_level)),
        ),
        ("avg_enhance_level", Box::new(|s| s.avg_enhance_level)),
        (
            "min_sublimation_level",
            Box::new(|s| f64::from(s.min_sublimation_level)),
        ),
        (
            "max_sublimation_level",
            Box::new(|s| f64::from(s.max_sublimation_level)),
        ),
        ("materials_t1", Box::new(|s| s.materials_t1 as f64)),
        ("materials_t2", Box::new(|s| s.materials_t2 as f64)),
        ("materials_t3", Box::new(|s| s.materials_t3 as f64)),
        ("materials_t4", Box::new(|s| s.materials_t4 as f64)),
        ("materials_t5", Box::new(|s| s.materials_t5 as f64)),
        ("total_materials", Box::new(|s| s.total_materials as f64)),
        ("idle_credits", Box::new(|s| s.idle_credits as f64)),
        ("idle_exp", Box::new(|s| s.idle_exp as f64)),
        ("idle_materials", Box::new(|s| s.idle_materials as f64)),
        ("idle_stones", Box::new(|s| s.idle_stones as f64)),
    ];

    let mut map = serde_json::Map::new();
    for (name, extract) in &contract_extractors {
        let values: Vec<f64> = snapshots.iter().map(|s| extract(s)).collect();
        let summary = compute_metric_summary(name, &values);
        map.insert(
            (*name).to_string(),
            serde_json::json!({
                "mean": summary.mean,
                "min": summary.min,
                "max": summary.max,
                "stddev": summary.stddev,
            }),
        );
    }
    serde_json::Value::Object(map)
}

pub fn print_summary(scenario_name: &str, days: u32, stats: &SummaryStats) {
    println!(
        "\n=== {} ({} seeds, {} days each) ===\n",
        scenario_name, stats.seed_count, days
    );
    println!(
        "{:<25} {:>10} {:>10} {:>10} {:>10}",
        "Metric", "Mean", "Min", "Max", "StdDev"
    );
    println!("{}", "-".repeat(70));
    for metric in &stats.metrics {
        println!(
            "{:<25} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            metric.name, metric.mean, metric.min, metric.max, metric.stddev
        );
    }
    println!(
        "{:<25} {}/{}",
        "clear_rate", stats.cleared_count, stats.seed_count
    );
}
