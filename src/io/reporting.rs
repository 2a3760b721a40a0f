// src/io/reporting.rs

use crate::model::queue::TaskQueue;
use crate::model::task::Micros;
use crate::simulation::engine::BatchRecord;
use serde::Serialize;
use std::error::Error;
use std::path::Path;

/// One observed per-task delay, tagged with its flow.
#[derive(Debug, Clone, Serialize)]
pub struct DelayRecord {
    pub flow: String,
    pub delay_us: Micros,
}

/// Aggregate view of one flow at the end of a run: lifetime counters plus
/// tail statistics over the recorded delay samples.
#[derive(Debug, Clone, Serialize)]
pub struct FlowSummary {
    pub flow: String,
    pub packets: u64,
    pub slo_violations: u64,
    pub cpu_usage_us: Micros,
    pub share: f64,
    pub p50_delay_us: Option<Micros>,
    pub p95_delay_us: Option<Micros>,
    pub p99_delay_us: Option<Micros>,
    pub max_delay_us: Option<Micros>,
}

/// Writes the per-batch history to a CSV file.
pub fn write_batch_log(file_path: &str, data: &[BatchRecord]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(Path::new(file_path))?;
    for record in data {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes every flow's delay samples to a CSV file, one row per dequeued
/// task, for offline percentile/violation-rate analysis.
pub fn write_delay_samples(file_path: &str, queues: &[TaskQueue]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(Path::new(file_path))?;
    for queue in queues {
        for &delay_us in queue.packet_delays() {
            wtr.serialize(DelayRecord {
                flow: queue.name().to_string(),
                delay_us,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the per-flow summaries to a CSV file.
pub fn write_flow_summaries(
    file_path: &str,
    summaries: &[FlowSummary],
) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(Path::new(file_path))?;
    for summary in summaries {
        wtr.serialize(summary)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Condenses one queue's counters and delay samples into a summary row.
pub fn summarize(queue: &TaskQueue) -> FlowSummary {
    let mut sorted: Vec<Micros> = queue.packet_delays().to_vec();
    sorted.sort_unstable();

    FlowSummary {
        flow: queue.name().to_string(),
        packets: queue.packets_counter(),
        slo_violations: queue.slo_violation_counter(),
        cpu_usage_us: queue.cpu_usage_counter(),
        share: queue.share(),
        p50_delay_us: percentile(&sorted, 50.0),
        p95_delay_us: percentile(&sorted, 95.0),
        p99_delay_us: percentile(&sorted, 99.0),
        max_delay_us: sorted.last().copied(),
    }
}

// Ceil-rank percentile over an already sorted sample set.
fn percentile(sorted: &[Micros], pct: f64) -> Option<Micros> {
    if sorted.is_empty() {
        return None;
    }
    let len = sorted.len();
    let idx = ((len as f64 * pct / 100.0).ceil() as usize).saturating_sub(1).min(len - 1);
    Some(sorted[idx])
}
