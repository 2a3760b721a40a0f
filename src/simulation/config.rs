// src/simulation/config.rs

use crate::model::task::Micros;

/// Static description of one flow/chain driven by the simulation.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub name: String,
    /// Offered load, packets per second.
    pub arrival_rate: u64,
    /// Mean per-packet service cost, microseconds.
    pub service_time: Micros,
    /// End-to-end latency budget, microseconds.
    pub delay_slo: Micros,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Length of one arrival window, microseconds.
    pub window_length: Micros,
    /// How many windows to run.
    pub num_windows: usize,
    pub flows: Vec<FlowConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            window_length: 10_000,
            num_windows: 100,
            flows: vec![FlowConfig {
                name: "ACL".to_string(),
                arrival_rate: 50_000,
                service_time: 10,
                delay_slo: 1_000,
            }],
        }
    }
}
