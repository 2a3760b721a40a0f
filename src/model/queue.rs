// src/model/queue.rs

use crate::arrival::traits::ArrivalProcess;
use crate::model::task::{Micros, Task};
use serde::Serialize;
use std::collections::VecDeque;

/// Upper bound on how many tasks a single `process_batch` call may extract.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Coarse queue-occupancy signal derived from the SLO-based thresholds.
///
/// Levels are ordered: `Clear < Low < Medium < High`. A level is reported as
/// soon as the arrived backlog strictly exceeds the matching threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CongestionLevel {
    Clear,
    Low,
    Medium,
    High,
}

/// Per-flow packet queue for one NFV (sub)chain.
///
/// Tasks are kept sorted by arrival time. Arrival generation produces times
/// in non-decreasing order and `enqueue_packet` rejects anything older than
/// the current tail, so insertion order and arrival order coincide; `size`,
/// the head peeks, and `process_batch` all rely on that invariant.
///
/// The queue also carries the flow's lifetime counters (packets, SLO
/// violations, consumed CPU time). It never increments them itself: the
/// surrounding driver owns that contract, because only the driver knows the
/// departure time it charged a batch against (see `Simulation::step`).
#[derive(Debug)]
pub struct TaskQueue {
    name: String,
    tasks: VecDeque<Task>,

    // Flow configuration. The rate parameterizes arrival generation; the
    // service-time hint and SLO derive the occupancy thresholds below.
    arrival_rate: u64,
    service_time: Micros,
    delay_slo: Micros,

    // How many tasks of typical service time fit within the SLO, split at
    // 80%/50%/20% for congestion signaling.
    max_queue_length: u64,
    high_queue_length: u64,
    medium_queue_length: u64,
    low_queue_length: u64,

    // Lifetime counters, maintained by the driver.
    packets_counter: u64,
    slo_violation_counter: u64,
    cpu_usage_counter: Micros,

    // One observed delay per dequeued task, for offline analysis.
    packet_delays: Vec<Micros>,

    // High-water mark of the newest enqueued arrival; arrival simulation
    // resumes from here so chained windows neither overlap nor time-travel.
    last_arrival_time: Micros,
}

impl TaskQueue {
    pub fn new(name: &str) -> Self {
        let mut queue = Self {
            name: name.to_string(),
            tasks: VecDeque::new(),
            arrival_rate: 1,
            service_time: 1,
            delay_slo: 1,
            max_queue_length: 0,
            high_queue_length: 0,
            medium_queue_length: 0,
            low_queue_length: 0,
            packets_counter: 0,
            slo_violation_counter: 0,
            cpu_usage_counter: 0,
            packet_delays: Vec::new(),
            last_arrival_time: 0,
        };
        queue.update_queue_thresholds();
        queue
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tasks whose arrival time has elapsed at `now`.
    ///
    /// Counts the arrived prefix only and stops at the first task still in
    /// the future. Scanning past it would be wrong on unordered data; the
    /// arrival-order invariant makes the early stop exact.
    pub fn size(&self, now: Micros) -> usize {
        self.tasks
            .iter()
            .take_while(|task| task.arrival_time() <= now)
            .count()
    }

    /// Total number of queued tasks, arrived or not.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Estimated fraction of one time unit this flow consumes:
    /// `arrival_rate * service_time / 1_000_000` (rate in packets/second,
    /// service time in microseconds). The divisor is part of the contract:
    /// co-located queues feed the same figure to the fair-share layer, so
    /// the scale must match across flows.
    pub fn share(&self) -> f64 {
        self.arrival_rate as f64 * self.service_time as f64 / 1_000_000.0
    }

    pub fn set_arrival_rate(&mut self, arrival_rate: u64) {
        self.arrival_rate = arrival_rate;
    }

    /// Updates the per-packet service-time hint and recomputes the
    /// occupancy thresholds. The hint later divides the SLO, so zero is a
    /// caller bug and is rejected outright.
    pub fn set_service_time(&mut self, service_time: Micros) {
        assert!(service_time > 0, "service time hint must be positive");
        self.service_time = service_time;
        self.update_queue_thresholds();
    }

    pub fn set_delay_slo(&mut self, delay_slo: Micros) {
        self.delay_slo = delay_slo;
        self.update_queue_thresholds();
    }

    // Recompute the four derived queue-length thresholds. Truncating integer
    // division throughout: `max * 4 / 5`, `max / 2`, `max / 5` equal
    // floor(0.8/0.5/0.2 * max) for any integer max, which keeps the
    // low <= medium <= high <= max ordering structural.
    fn update_queue_thresholds(&mut self) {
        self.max_queue_length = self.delay_slo / self.service_time;
        self.high_queue_length = self.max_queue_length * 4 / 5;
        self.medium_queue_length = self.max_queue_length / 2;
        self.low_queue_length = self.max_queue_length / 5;
    }

    pub fn max_queue_length(&self) -> u64 {
        self.max_queue_length
    }

    pub fn high_queue_length(&self) -> u64 {
        self.high_queue_length
    }

    pub fn medium_queue_length(&self) -> u64 {
        self.medium_queue_length
    }

    pub fn low_queue_length(&self) -> u64 {
        self.low_queue_length
    }

    /// Congestion signal for the arrived backlog at `now`.
    pub fn congestion_level(&self, now: Micros) -> CongestionLevel {
        let depth = self.size(now) as u64;
        if depth > self.high_queue_length {
            CongestionLevel::High
        } else if depth > self.medium_queue_length {
            CongestionLevel::Medium
        } else if depth > self.low_queue_length {
            CongestionLevel::Low
        } else {
            CongestionLevel::Clear
        }
    }

    /// Generates stochastic packet arrivals covering `[start, end]`.
    ///
    /// Starting from `max(last_arrival_time, start)`, each step advances the
    /// clock by an inter-arrival sample (parameterized by this flow's rate),
    /// builds a task with a sampled service time around the hint and the
    /// queue's SLO, and enqueues it. The loop stops after the first arrival
    /// past `end` — that task is still enqueued ("overshoot by one"), so a
    /// caller chaining contiguous windows sees no gap: the next call resumes
    /// from the overshooting arrival.
    pub fn simulate_packet_arrivals(
        &mut self,
        start: Micros,
        end: Micros,
        process: &mut dyn ArrivalProcess,
    ) {
        let mut now = self.last_arrival_time.max(start);
        loop {
            now += process.next_arrival_period(self.arrival_rate);
            let service_time = process.next_service_period(self.service_time);
            self.enqueue_packet(Task::new(now, service_time, self.delay_slo));

            if now > end {
                break;
            }
        }
    }

    /// Appends a task at the tail and bumps `last_arrival_time`.
    ///
    /// Callers must enqueue in non-decreasing arrival-time order; the queue
    /// does not re-sort and everything downstream depends on the ordering.
    pub fn enqueue_packet(&mut self, task: Task) {
        assert!(
            task.arrival_time() >= self.last_arrival_time,
            "out-of-order enqueue on '{}': arrival {} before high-water mark {}",
            self.name,
            task.arrival_time(),
            self.last_arrival_time
        );
        self.last_arrival_time = task.arrival_time();
        self.tasks.push_back(task);
    }

    /// Deadline of the earliest-arrived task, or `Micros::MAX` when empty.
    ///
    /// Head-based peek: arrival order and deadline order coincide only
    /// because every task in this queue shares one `delay_slo`. Per-task
    /// heterogeneous SLOs would need a real priority structure instead.
    pub fn peek_earliest_deadline(&self) -> Micros {
        match self.tasks.front() {
            Some(task) => task.deadline(),
            None => Micros::MAX,
        }
    }

    /// Slack of the earliest-arrived task, or `i64::MAX` when empty.
    /// Same head-based caveat as `peek_earliest_deadline`.
    pub fn peek_least_slack(&self) -> i64 {
        match self.tasks.front() {
            Some(task) => task.slack(),
            None => i64::MAX,
        }
    }

    /// Extracts the next batch of arrived tasks from the head of the queue.
    ///
    /// Pops up to [`DEFAULT_BATCH_SIZE`] tasks whose arrival time has
    /// elapsed at `current_time`, stopping early when the head task has not
    /// arrived yet. Returns the batch in arrival order together with the sum
    /// of its service times.
    ///
    /// Every extracted task is charged the full batch service time: its
    /// recorded delay is `current_time + batch_service_time - arrival_time`,
    /// as if it only departs once the whole batch completes. That models a
    /// non-preemptive head-of-line batch, not per-task finishing times.
    ///
    /// Calling this on an empty (or not-yet-arrived) queue returns an empty
    /// batch and zero service time.
    pub fn process_batch(&mut self, current_time: Micros) -> (Vec<Task>, Micros) {
        let mut batch = Vec::new();
        while batch.len() < DEFAULT_BATCH_SIZE {
            match self.tasks.front() {
                Some(head) if head.arrival_time() <= current_time => {}
                _ => break,
            }
            if let Some(task) = self.tasks.pop_front() {
                batch.push(task);
            }
        }

        let batch_service_time: Micros = batch.iter().map(|task| task.service_time()).sum();

        for task in &batch {
            self.packet_delays
                .push(current_time + batch_service_time - task.arrival_time());
        }

        (batch, batch_service_time)
    }

    pub fn packets_counter(&self) -> u64 {
        self.packets_counter
    }

    pub fn slo_violation_counter(&self) -> u64 {
        self.slo_violation_counter
    }

    pub fn cpu_usage_counter(&self) -> Micros {
        self.cpu_usage_counter
    }

    /// Driver-side counter maintenance: packets handed downstream.
    pub fn add_packets(&mut self, count: u64) {
        self.packets_counter += count;
    }

    /// Driver-side counter maintenance: tasks whose departure missed the SLO.
    pub fn add_slo_violations(&mut self, count: u64) {
        self.slo_violation_counter += count;
    }

    /// Driver-side counter maintenance: CPU time consumed by a batch.
    pub fn add_cpu_usage(&mut self, service_time: Micros) {
        self.cpu_usage_counter += service_time;
    }

    /// Observed per-task delays, in dequeue order.
    pub fn packet_delays(&self) -> &[Micros] {
        &self.packet_delays
    }
}

// Two queues are the same flow iff their names match, regardless of
// configuration or contents.
impl PartialEq for TaskQueue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TaskQueue {}
