pub use approach::{Approach, ApproachId, Axis, ENTRY_POS, EXIT_POS, STOP_LINE_POS};
pub use cgmath;
pub use config::{ConfigError, SimulationConfig};
pub use signal::{optimize_green, LightState, Phase};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use util::Interval;
pub use vehicle::{Vehicle, VehicleAttributes};

mod approach;
mod config;
#[cfg(feature = "debug")]
mod debug;
pub mod math;
mod signal;
mod simulation;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
