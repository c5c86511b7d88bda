use crate::simulation::Simulation;
use serde_json::json;

/// Builds a JSON snapshot of the current frame, sufficient for an
/// external renderer to draw every vehicle and light.
pub(crate) fn frame_snapshot(sim: &Simulation) -> serde_json::Value {
    use crate::approach::ApproachId;

    json!({
        "frame": sim.frame(),
        "phase": format!("{:?}", sim.phase()),
        "lights": ApproachId::ALL.map(|id| format!("{:?}", sim.light(id))),
        "vehicles": sim
            .iter_vehicles()
            .map(|v| {
                json!({
                    "approach": v.approach().to_string(),
                    "pos": v.pos(),
                    "vel": v.vel(),
                    "world": [v.position().x, v.position().y],
                })
            })
            .collect::<Vec<_>>(),
    })
}
