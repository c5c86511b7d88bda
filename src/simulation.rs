use crate::approach::{Approach, ApproachId, ENTRY_POS, EXIT_POS, STOP_LINE_POS};
use crate::config::{ConfigError, SimulationConfig};
use crate::signal::{LightState, Phase, SignalController};
use crate::util::Interval;
use crate::vehicle::{Vehicle, MIN_GAP};
use crate::{VehicleId, VehicleSet};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use slotmap::SlotMap;

/// Normalisation constant mapping a configured volume to a
/// per-tick arrival probability.
const ARRIVAL_SCALE: f64 = 1500.0;

/// The span of an approach; vehicles outside it are removed.
const ROAD_SPAN: Interval<f64> = Interval::new(EXIT_POS, ENTRY_POS);

/// Bounds applied to the sampled desired speed adjustment factor.
const SPEED_ADJUST_RANGE: Interval<f64> = Interval::new(0.75, 1.25);

/// A traffic simulation of one signalised four-way intersection.
pub struct Simulation {
    /// The configuration, immutable for the run.
    config: SimulationConfig,
    /// The four approaches, indexed by [ApproachId::ALL].
    approaches: [Approach; 4],
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The traffic light controller.
    signal: SignalController,
    /// The arrival process generator.
    rng: StdRng,
    /// Per-vehicle desired speed adjustment distribution.
    speed_distr: Normal<f64>,
    /// The current frame of simulation.
    frame: usize,
    /// Debugging snapshot of the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation from the given configuration.
    ///
    /// Fails if the configuration is invalid; the simulator performs
    /// no implicit clamping of configured values.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let speed_distr = Normal::new(1.0, config.speed_stddev)
            .map_err(|_| ConfigError::InvalidSpeedStddev(config.speed_stddev))?;
        Ok(Self {
            approaches: ApproachId::ALL.map(|id| Approach::new(id, config.volume(id))),
            vehicles: SlotMap::with_key(),
            signal: SignalController::new(&config),
            rng: StdRng::seed_from_u64(config.seed),
            speed_distr,
            frame: 0,
            config,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        })
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// For a realistic simulation, do not use a time step greater than around 0.2.
    pub fn step(&mut self, dt: f64) {
        self.signal.step(dt);
        self.apply_accelerations();
        self.integrate(dt);
        self.remove_exited();
        self.inject_arrivals();
        self.update_vehicle_coords();
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = crate::debug::frame_snapshot(self);
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the simulation configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Gets the current signal phase.
    pub fn phase(&self) -> Phase {
        self.signal.phase()
    }

    /// Gets the light shown to the given approach.
    pub fn light(&self, approach: ApproachId) -> LightState {
        self.signal.light(approach)
    }

    /// Gets a reference to the given approach.
    pub fn approach(&self, id: ApproachId) -> &Approach {
        &self.approaches[id.index()]
    }

    /// Returns an iterator over all the approaches.
    pub fn iter_approaches(&self) -> impl Iterator<Item = &Approach> {
        self.approaches.iter()
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Returns an iterator over the vehicles on one approach, front of queue first.
    pub fn vehicles_on(&self, id: ApproachId) -> impl Iterator<Item = &Vehicle> {
        self.approaches[id.index()]
            .vehicle_ids()
            .iter()
            .map(|vid| &self.vehicles[*vid])
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> &Vehicle {
        &self.vehicles[vehicle_id]
    }

    /// Adds a vehicle at the entry of the given approach with zero speed.
    ///
    /// Arrivals are normally generated internally; this exists so callers
    /// can stage deterministic scenarios. The caller is responsible for
    /// leaving the entry clear.
    pub fn add_vehicle(&mut self, approach: ApproachId) -> VehicleId {
        self.spawn_vehicle(approach)
    }

    /// Gets the debugging snapshot of the previously simulated frame.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Calculates the accelerations of all vehicles against a single
    /// consistent snapshot of positions and speeds. No state is mutated
    /// until [Self::integrate]; candidates accumulate by minimum inside
    /// each vehicle's acceleration model.
    fn apply_accelerations(&self) {
        for (_, vehicle) in &self.vehicles {
            vehicle.reset();
        }
        for approach in &self.approaches {
            for id in approach.vehicle_ids() {
                self.vehicles[*id].apply_free_road();
            }
            for (lead, follow) in approach.vehicle_ids().iter().tuple_windows() {
                let leader = &self.vehicles[*lead];
                self.vehicles[*follow].follow_vehicle(leader.pos_rear(), leader.vel());
            }
            if self.signal.light(approach.id()) == LightState::Red {
                for id in approach.vehicle_ids() {
                    let vehicle = &self.vehicles[*id];
                    if vehicle.pos() >= STOP_LINE_POS {
                        vehicle.hold_at_red();
                    }
                }
            }
        }
    }

    /// Integrates the velocities and positions of all vehicles.
    /// Vehicles held by a red light are clamped at the stop line.
    fn integrate(&mut self, dt: f64) {
        for approach in &self.approaches {
            let red = self.signal.light(approach.id()) == LightState::Red;
            for id in approach.vehicle_ids() {
                let vehicle = &mut self.vehicles[*id];
                let barrier = (red && vehicle.pos() >= STOP_LINE_POS).then_some(STOP_LINE_POS);
                vehicle.integrate(dt, barrier);
            }
        }
    }

    /// Removes vehicles that have passed the exit boundary.
    fn remove_exited(&mut self) {
        let Self {
            approaches,
            vehicles,
            ..
        } = self;
        for approach in approaches.iter_mut() {
            let approach_id = approach.id();
            approach.retain_vehicles(|id| {
                if ROAD_SPAN.contains(vehicles[id].pos()) {
                    true
                } else {
                    vehicles.remove(id);
                    log::trace!("vehicle {id:?} exited via {approach_id}");
                    false
                }
            });
        }
    }

    /// Draws the stochastic arrival process for each approach and injects
    /// new vehicles at the entry position.
    fn inject_arrivals(&mut self) {
        for idx in 0..self.approaches.len() {
            let approach_id = self.approaches[idx].id();
            let volume = self.approaches[idx].volume();
            if volume == 0 {
                continue;
            }
            let p = f64::min(volume as f64 / ARRIVAL_SCALE, 1.0);
            if self.rng.gen::<f64>() >= p {
                continue;
            }
            if !self.entry_clear(idx) {
                continue;
            }
            self.spawn_vehicle(approach_id);
        }
    }

    /// Whether a vehicle injected at the entry would keep the minimum
    /// standstill gap to the rearmost vehicle on the approach.
    fn entry_clear(&self, idx: usize) -> bool {
        self.approaches[idx]
            .vehicle_ids()
            .last()
            .map(|id| self.vehicles[*id].pos_rear() + MIN_GAP <= ENTRY_POS)
            .unwrap_or(true)
    }

    /// Creates a vehicle at the entry of the given approach.
    fn spawn_vehicle(&mut self, approach: ApproachId) -> VehicleId {
        let factor = self.speed_distr.sample(&mut self.rng);
        let factor = factor.clamp(SPEED_ADJUST_RANGE.min, SPEED_ADJUST_RANGE.max);
        let desired_vel = factor * self.config.desired_speed;
        let attributes = self.config.vehicle;
        let vehicle_id = self.vehicles.insert_with_key(|id| {
            let mut vehicle = Vehicle::new(id, approach, &attributes, desired_vel, ENTRY_POS);
            vehicle.update_coords();
            vehicle
        });
        self.approaches[approach.index()].insert_vehicle(&self.vehicles, vehicle_id);
        log::trace!("vehicle {vehicle_id:?} entered via {approach}");
        vehicle_id
    }

    /// Updates the world coordinates of all the vehicles.
    fn update_vehicle_coords(&mut self) {
        for (_, vehicle) in &mut self.vehicles {
            vehicle.update_coords();
        }
    }
}
