use crate::approach::ApproachId;
use crate::vehicle::VehicleAttributes;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The configuration of a simulation run.
///
/// Read once when the simulation is created and immutable for the run.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Per-approach traffic volumes, indexed by [ApproachId::ALL].
    pub volumes: [u32; 4],
    /// The lane capacity used to derive traffic density.
    pub capacity: u32,
    /// The approach granted emergency priority, if any.
    pub emergency: Option<ApproachId>,
    /// Seed for the arrival process, making runs reproducible.
    pub seed: u64,
    /// The desired free-flow speed in m/s.
    pub desired_speed: f64,
    /// Standard deviation of the per-vehicle desired speed adjustment factor.
    pub speed_stddev: f64,
    /// The attributes given to every injected vehicle.
    pub vehicle: VehicleAttributes,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            volumes: [60; 4],
            capacity: 150,
            emergency: None,
            seed: 0,
            desired_speed: 13.9,
            speed_stddev: 0.0,
            vehicle: VehicleAttributes::default(),
        }
    }
}

impl SimulationConfig {
    /// Gets the configured volume for the given approach.
    pub fn volume(&self, approach: ApproachId) -> u32 {
        self.volumes[approach.index()]
    }

    /// Checks the configuration, returning an error if any value
    /// would make the simulation ill-defined.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        for (name, value) in [
            ("desired speed", self.desired_speed),
            ("vehicle length", self.vehicle.length),
            ("maximum acceleration", self.vehicle.max_acc),
            ("comfortable deceleration", self.vehicle.comf_dec),
            ("time headway", self.vehicle.time_headway),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if !(self.speed_stddev.is_finite() && self.speed_stddev >= 0.0) {
            return Err(ConfigError::InvalidSpeedStddev(self.speed_stddev));
        }
        Ok(())
    }
}

/// An invalid simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("lane capacity must be a positive vehicle count")]
    ZeroCapacity,
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("speed standard deviation must be non-negative and finite, got {0}")]
    InvalidSpeedStddev(f64),
}
