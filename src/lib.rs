//! Per-flow work-queue simulator for an NFV processing chain.
//!
//! Packets arrive stochastically, carry a latency budget, and are drained in
//! bounded batches; the queue accounts for deadlines, slack, delays, and
//! congestion while a driver owns the clock and the lifetime counters.

pub mod arrival;
pub mod io;
pub mod model;
pub mod simulation;

// Re-export for easier testing.
pub use model::queue::{CongestionLevel, TaskQueue, DEFAULT_BATCH_SIZE};
pub use model::task::{Micros, Task};
pub use simulation::engine::{BatchRecord, Simulation};
