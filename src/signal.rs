use crate::approach::{ApproachId, Axis};
use crate::config::SimulationConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Base green duration in s.
const GREEN_BASE: f64 = 20.0;

/// Green seconds added per unit of traffic density.
const GREEN_PER_DENSITY: f64 = 40.0;

/// Green seconds added to the axis serving an emergency approach.
const EMERGENCY_BONUS: f64 = 30.0;

/// Amber duration in s.
const AMBER_SEC: f64 = 3.0;

/// The signal phases, in their fixed cyclic order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    NsGreen,
    NsYellow,
    EwGreen,
    EwYellow,
}

/// The state of the light shown to one approach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LightState {
    Red,
    Amber,
    Green,
}

impl Phase {
    /// The next phase in the cycle.
    pub fn next(self) -> Phase {
        match self {
            Phase::NsGreen => Phase::NsYellow,
            Phase::NsYellow => Phase::EwGreen,
            Phase::EwGreen => Phase::EwYellow,
            Phase::EwYellow => Phase::NsGreen,
        }
    }

    /// The axis served by this phase.
    pub fn axis(self) -> Axis {
        match self {
            Phase::NsGreen | Phase::NsYellow => Axis::NorthSouth,
            Phase::EwGreen | Phase::EwYellow => Axis::EastWest,
        }
    }
}

/// Computes the green duration in seconds for one signal axis.
///
/// `green = base + alpha * (volume / capacity)`, plus a fixed bonus when
/// the axis serves a declared emergency approach.
pub fn optimize_green(volume: u32, capacity: u32, emergency: bool) -> f64 {
    let density = volume as f64 / capacity as f64;
    let mut green = GREEN_BASE + GREEN_PER_DENSITY * density;
    if emergency {
        green += EMERGENCY_BONUS;
    }
    green
}

/// The traffic light controller for the intersection.
///
/// Cycles NS-green, NS-yellow, EW-green, EW-yellow on a fixed timer.
/// Green durations are computed once per configuration from each axis's
/// peak approach volume. An emergency approach keeps its place in the
/// cycle; its axis's green is extended instead of being preempted.
pub struct SignalController {
    /// The current phase.
    phase: Phase,
    /// The time spent in the current phase, in s.
    elapsed: f64,
    /// The green duration of the north-south axis, in s.
    ns_green: f64,
    /// The green duration of the east-west axis, in s.
    ew_green: f64,
}

impl SignalController {
    /// Creates a controller with green durations derived from the configuration.
    pub(crate) fn new(config: &SimulationConfig) -> Self {
        let axis_green = |axis: Axis, a: ApproachId, b: ApproachId| {
            let volume = u32::max(config.volume(a), config.volume(b));
            let emergency = config.emergency.map(|e| e.axis()) == Some(axis);
            optimize_green(volume, config.capacity, emergency)
        };
        let ns_green = axis_green(Axis::NorthSouth, ApproachId::North, ApproachId::South);
        let ew_green = axis_green(Axis::EastWest, ApproachId::East, ApproachId::West);
        log::debug!("signal plan: NS green {ns_green:.1}s, EW green {ew_green:.1}s");
        Self {
            phase: Phase::NsGreen,
            elapsed: 0.0,
            ns_green,
            ew_green,
        }
    }

    /// Advances the signal timing by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        self.elapsed += dt;
        while self.elapsed >= self.duration(self.phase) {
            self.elapsed -= self.duration(self.phase);
            self.phase = self.phase.next();
            log::debug!("signal phase -> {:?}", self.phase);
        }
    }

    /// Gets the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Gets the light shown to the given approach.
    pub fn light(&self, approach: ApproachId) -> LightState {
        if approach.axis() != self.phase.axis() {
            return LightState::Red;
        }
        match self.phase {
            Phase::NsGreen | Phase::EwGreen => LightState::Green,
            Phase::NsYellow | Phase::EwYellow => LightState::Amber,
        }
    }

    /// The allotted duration of the given phase, in s.
    pub(crate) fn duration(&self, phase: Phase) -> f64 {
        match phase {
            Phase::NsGreen => self.ns_green,
            Phase::EwGreen => self.ew_green,
            Phase::NsYellow | Phase::EwYellow => AMBER_SEC,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn config(volumes: [u32; 4], emergency: Option<ApproachId>) -> SimulationConfig {
        SimulationConfig {
            volumes,
            capacity: 150,
            emergency,
            ..Default::default()
        }
    }

    #[test]
    fn green_time_scales_with_density() {
        assert_approx_eq!(optimize_green(120, 150, false), 52.0);
        assert_approx_eq!(optimize_green(120, 150, true), 82.0);
        assert_approx_eq!(optimize_green(0, 150, false), 20.0);
    }

    #[test]
    fn phases_cycle_in_fixed_order() {
        let mut signal = SignalController::new(&config([0; 4], None));
        assert_eq!(signal.phase(), Phase::NsGreen);

        // Zero volume on both axes gives the base 20 s green.
        signal.step(20.0);
        assert_eq!(signal.phase(), Phase::NsYellow);
        signal.step(3.0);
        assert_eq!(signal.phase(), Phase::EwGreen);
        signal.step(20.0);
        assert_eq!(signal.phase(), Phase::EwYellow);
        signal.step(3.0);
        assert_eq!(signal.phase(), Phase::NsGreen);
    }

    #[test]
    fn lights_follow_the_phase_axis() {
        let signal = SignalController::new(&config([0; 4], None));
        assert_eq!(signal.light(ApproachId::North), LightState::Green);
        assert_eq!(signal.light(ApproachId::South), LightState::Green);
        assert_eq!(signal.light(ApproachId::East), LightState::Red);
        assert_eq!(signal.light(ApproachId::West), LightState::Red);

        let mut signal = SignalController::new(&config([0; 4], None));
        signal.step(20.0);
        assert_eq!(signal.light(ApproachId::North), LightState::Amber);
        assert_eq!(signal.light(ApproachId::East), LightState::Red);
    }

    #[test]
    fn emergency_extends_the_axis_green() {
        let volumes = [60, 60, 120, 60];
        let signal = SignalController::new(&config(volumes, Some(ApproachId::East)));
        assert_approx_eq!(signal.duration(Phase::EwGreen), 82.0);
        assert_approx_eq!(signal.duration(Phase::NsGreen), 36.0);
    }

    #[test]
    fn axis_green_uses_the_peak_approach_volume() {
        let signal = SignalController::new(&config([30, 150, 0, 0], None));
        assert_approx_eq!(signal.duration(Phase::NsGreen), 60.0);
    }
}
