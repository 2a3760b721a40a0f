// src/arrival/traits.rs

use crate::model::task::Micros;
use std::fmt::Debug;

/// Source of stochastic timing samples for one flow's packet arrivals.
///
/// The queue treats both samples as opaque non-negative offsets: it adds the
/// inter-arrival period to its clock and attaches the service period to the
/// new task. Distribution internals stay behind this seam, so simulations
/// can swap traffic models without touching the queue.
///
/// We require `Debug` so driver state stays printable.
pub trait ArrivalProcess: Debug {
    /// Next inter-arrival gap, in microseconds, for a flow receiving
    /// `arrival_rate` packets per second.
    fn next_arrival_period(&mut self, arrival_rate: u64) -> Micros;

    /// Next per-packet service time, in microseconds, drawn around
    /// `mean_service_time`.
    fn next_service_period(&mut self, mean_service_time: Micros) -> Micros;
}
