use nfv_queue_sim::arrival::implementations::PoissonProcess;
use nfv_queue_sim::io::reporting;
use nfv_queue_sim::simulation::config::{FlowConfig, SimulationConfig};
use nfv_queue_sim::Simulation;

fn main() {
    println!("=== NFV Chain Work-Queue Simulation ===");

    // Three chains with contrasting load: ACL is comfortable, NAT is
    // oversubscribed (share > 1 of a core) and will blow its budget, DPI is
    // nearly idle.
    let config = SimulationConfig {
        window_length: 10_000,
        num_windows: 100,
        flows: vec![
            FlowConfig {
                name: "ACL".to_string(),
                arrival_rate: 50_000,
                service_time: 10,
                delay_slo: 1_000,
            },
            FlowConfig {
                name: "NAT".to_string(),
                arrival_rate: 120_000,
                service_time: 10,
                delay_slo: 500,
            },
            FlowConfig {
                name: "DPI".to_string(),
                arrival_rate: 10_000,
                service_time: 5,
                delay_slo: 2_000,
            },
        ],
    };

    let total_time_s = config.window_length * config.num_windows as u64 / 1_000_000;
    println!(
        "Simulating {} flows over {} windows (~{}s of traffic)...",
        config.flows.len(),
        config.num_windows,
        total_time_s
    );

    let mut sim = Simulation::new(config, Box::new(PoissonProcess::new()));
    sim.run();

    match reporting::write_batch_log("batch_log.csv", &sim.history) {
        Ok(_) => println!("Batch history written to ./batch_log.csv"),
        Err(e) => eprintln!("Error writing batch log: {}", e),
    }
    match reporting::write_delay_samples("packet_delays.csv", sim.queues()) {
        Ok(_) => println!("Delay samples written to ./packet_delays.csv"),
        Err(e) => eprintln!("Error writing delay samples: {}", e),
    }

    let summaries: Vec<_> = sim.queues().iter().map(reporting::summarize).collect();
    match reporting::write_flow_summaries("flow_summaries.csv", &summaries) {
        Ok(_) => println!("Flow summaries written to ./flow_summaries.csv"),
        Err(e) => eprintln!("Error writing flow summaries: {}", e),
    }

    println!("\n=== Per-Flow Results ===");
    for summary in &summaries {
        let violation_rate = if summary.packets > 0 {
            summary.slo_violations as f64 / summary.packets as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "{}: {} packets, {:.2}% SLO violations, share {:.2}, p50/p95/p99 delay {:?}/{:?}/{:?} us",
            summary.flow,
            summary.packets,
            violation_rate,
            summary.share,
            summary.p50_delay_us,
            summary.p95_delay_us,
            summary.p99_delay_us,
        );
    }
    println!("Aggregate share across flows: {:.2}", sim.total_share());

    println!("\nSimulation complete.");
}
