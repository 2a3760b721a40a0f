// src/arrival/implementations.rs

use crate::arrival::traits::ArrivalProcess;
use crate::model::task::Micros;
use rand::Rng;
use rand_distr::{Distribution, Exp};

// =========================================================================
// 1. Poisson Process (exponential inter-arrivals)
// =========================================================================

/// Classic Poisson packet traffic: exponentially distributed inter-arrival
/// gaps at the flow's rate, and exponentially distributed service times
/// around the hinted mean. This is the default traffic model for the NFV
/// chain simulations.
#[derive(Debug, Clone)]
pub struct PoissonProcess;

impl PoissonProcess {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PoissonProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrivalProcess for PoissonProcess {
    fn next_arrival_period(&mut self, arrival_rate: u64) -> Micros {
        // Exp(rate in 1/s) samples in seconds; convert to microseconds.
        let exp = Exp::new(arrival_rate as f64).expect("arrival rate must be positive");
        let seconds: f64 = exp.sample(&mut rand::thread_rng());
        (seconds * 1_000_000.0).round() as Micros
    }

    fn next_service_period(&mut self, mean_service_time: Micros) -> Micros {
        if mean_service_time == 0 {
            return 0;
        }
        // Exp(1/mean) has the hinted mean, already in microseconds.
        let exp = Exp::new(1.0 / mean_service_time as f64).expect("mean must be positive");
        let sample: f64 = exp.sample(&mut rand::thread_rng());
        sample.round() as Micros
    }
}

// =========================================================================
// 2. Constant Process (deterministic)
// =========================================================================

/// Perfectly regular traffic: fixed `1_000_000 / rate` gaps and exactly the
/// hinted service time. Useful for step-response checks and for tests that
/// need reproducible arrival times.
#[derive(Debug, Clone)]
pub struct ConstantProcess;

impl ConstantProcess {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConstantProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrivalProcess for ConstantProcess {
    fn next_arrival_period(&mut self, arrival_rate: u64) -> Micros {
        // Clamp to one microsecond so arrival simulation always advances.
        (1_000_000 / arrival_rate.max(1)).max(1)
    }

    fn next_service_period(&mut self, mean_service_time: Micros) -> Micros {
        mean_service_time
    }
}

// =========================================================================
// 3. Uniform Process (bounded jitter)
// =========================================================================

/// Uniform jitter around the nominal gap and service time: gaps in
/// `[1, 2 * gap]`, service times in `[mean / 2, 3 * mean / 2]`. Burstier
/// than constant traffic but with bounded tails, for stress runs where the
/// heavy tail of the Poisson model gets in the way.
#[derive(Debug, Clone)]
pub struct UniformProcess;

impl UniformProcess {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UniformProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrivalProcess for UniformProcess {
    fn next_arrival_period(&mut self, arrival_rate: u64) -> Micros {
        let gap = (1_000_000 / arrival_rate.max(1)).max(1);
        rand::thread_rng().gen_range(1..=2 * gap)
    }

    fn next_service_period(&mut self, mean_service_time: Micros) -> Micros {
        if mean_service_time == 0 {
            return 0;
        }
        let low = mean_service_time / 2;
        let high = mean_service_time + mean_service_time / 2;
        rand::thread_rng().gen_range(low..=high)
    }
}
