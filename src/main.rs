use intersection_sim::{ApproachId, Simulation, SimulationConfig};

fn main() {
    let config = SimulationConfig {
        volumes: [180, 120, 90, 150],
        capacity: 150,
        emergency: None,
        seed: 42,
        speed_stddev: 0.1,
        ..Default::default()
    };
    let mut sim = Simulation::new(config).unwrap();

    println!("Simulating...");
    let dt = 0.2;
    for _ in 0..30 {
        for _ in 0..50 {
            sim.step(dt);
        }
        let queued = ApproachId::ALL
            .map(|id| sim.vehicles_on(id).filter(|v| v.has_stopped()).count());
        println!(
            "t={:>6.1}s phase={:?} queued N/S/E/W={:?} total={}",
            sim.frame() as f64 * dt,
            sim.phase(),
            queued,
            sim.iter_vehicles().count(),
        );
    }
}
