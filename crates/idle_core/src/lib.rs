//! `idle_core` — deterministic campaign-day engine.
//!
//! No IO except the metrics CSV writers. All randomness via the passed-in Rng.

pub mod campaign;
mod character;
pub mod combat;
pub mod drops;
mod id;
mod inventory;
pub mod metrics;
pub mod stats;
#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
mod types;
pub mod upgrade;

pub use campaign::{advance_day, gather_materials, hunt, UpgradePolicy};
pub use id::generate_uuid;
pub use metrics::{
    build_run_record, compute_metrics, write_metrics_csv, MetricsFileWriter, MetricsSnapshot,
    RunRecord,
};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, day: u32, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, day, event }
}
