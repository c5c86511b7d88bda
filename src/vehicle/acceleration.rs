use std::cell::Cell;

/// The minimum standstill gap between vehicles in m.
pub(crate) const MIN_GAP: f64 = 2.0; // m

/// The maximum deceleration of all vehicles in ms<sup>-2</sup>.
const MAX_DECEL: f64 = -6.0; // m/s^2

/// Floor applied to the net gap to keep the interaction term finite.
const GAP_EPSILON: f64 = 0.1; // m

/// The acceleration exponent of the free-road term.
const DELTA: i32 = 4;

/// The acceleration model of a vehicle.
///
/// Candidate accelerations are accumulated by minimum over one step,
/// so every constraint (free road, car following, red light) can be
/// applied independently against a shared snapshot of the simulation.
#[derive(Clone, Debug)]
pub struct AccelerationModel {
    headway: f64,
    max_acc: f64,
    comf_dec: f64,
    acc: Cell<f64>,
}

/// The parameters of the acceleration model.
pub struct ModelParams {
    /// The desired gap between this and the vehicle ahead in seconds.
    pub time_headway: f64,
    /// The vehicle's maximum acceleration in m/s<sup>2</sup>.
    pub max_acceleration: f64,
    /// The comfortable deceleration, a positive magnitude in m/s<sup>2</sup>.
    pub comf_deceleration: f64,
}

impl AccelerationModel {
    /// Creates a new acceleration model.
    pub fn new(params: &ModelParams) -> Self {
        AccelerationModel {
            headway: params.time_headway,
            max_acc: params.max_acceleration,
            comf_dec: params.comf_deceleration,
            acc: Cell::new(params.max_acceleration),
        }
    }

    /// Resets the acceleration model. Use at the start of an update.
    pub fn reset(&self) {
        self.acc.set(self.max_acc);
    }

    /// Gets the current acceleration of the vehicle.
    pub fn acc(&self) -> f64 {
        f64::max(self.acc.get(), MAX_DECEL)
    }

    /// Calculates the acceleration of a vehicle with a clear road ahead.
    ///
    /// # Arguments
    /// * `vel` - The velocity of the simulated vehicle (m/s).
    /// * `desired_vel` - The vehicle's desired free-flow speed (m/s).
    pub fn free_road(&self, vel: f64, desired_vel: f64) {
        let this_acc = self.max_acc * (1. - (vel / desired_vel).powi(DELTA));
        self.acc.set(f64::min(self.acc.get(), this_acc));
    }

    /// Calculates the acceleration needed to follow the vehicle ahead,
    /// using the intelligent driver model.
    ///
    /// # Arguments
    /// * `net_dist` - The gap between this vehicle and the rear of the vehicle ahead (m).
    /// * `my_vel` - The velocity of the simulated vehicle (m/s).
    /// * `their_vel` - The vehicle ahead's velocity (m/s).
    /// * `desired_vel` - The vehicle's desired free-flow speed (m/s).
    pub fn follow_vehicle(&self, net_dist: f64, my_vel: f64, their_vel: f64, desired_vel: f64) {
        let this_acc = if net_dist <= MIN_GAP {
            -10. * self.max_acc
        } else {
            let appr = my_vel - their_vel;
            let factor = 1. / (2. * (self.max_acc * self.comf_dec).sqrt());
            let ss = MIN_GAP + (my_vel * self.headway) + (my_vel * appr * factor);
            let term = ss / f64::max(net_dist, GAP_EPSILON);
            self.max_acc * (1. - (my_vel / desired_vel).powi(DELTA) - (term * term))
        };
        self.acc.set(f64::min(self.acc.get(), this_acc));
    }

    /// Applies a comfortable deceleration, used to hold a vehicle
    /// behind the stop line while its approach shows red.
    pub fn hold_at_red(&self) {
        self.acc.set(f64::min(self.acc.get(), -self.comf_dec));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn model() -> AccelerationModel {
        AccelerationModel::new(&ModelParams {
            time_headway: 1.5,
            max_acceleration: 2.0,
            comf_deceleration: 3.0,
        })
    }

    #[test]
    fn free_road_accelerates_up_to_desired_speed() {
        let acc = model();

        acc.reset();
        acc.free_road(0.0, 10.0);
        assert_approx_eq!(acc.acc(), 2.0);

        acc.reset();
        acc.free_road(10.0, 10.0);
        assert_approx_eq!(acc.acc(), 0.0);

        acc.reset();
        acc.free_road(5.0, 10.0);
        assert_approx_eq!(acc.acc(), 2.0 * (1.0 - 0.0625));
    }

    #[test]
    fn following_matches_idm_formula() {
        let acc = model();
        acc.reset();
        // gap 30 m, both at 10 m/s, desired 20 m/s:
        // s* = 2 + 10*1.5 = 17, a = 2*(1 - (10/20)^4 - (17/30)^2)
        acc.follow_vehicle(30.0, 10.0, 10.0, 20.0);
        assert_approx_eq!(acc.acc(), 1.2327777777777778, 1e-9);
    }

    #[test]
    fn hard_brake_inside_minimum_gap() {
        let acc = model();
        acc.reset();
        acc.follow_vehicle(1.5, 10.0, 0.0, 20.0);
        assert_approx_eq!(acc.acc(), MAX_DECEL);
    }

    #[test]
    fn red_hold_takes_minimum_with_other_constraints() {
        let acc = model();
        acc.reset();
        acc.free_road(0.0, 10.0);
        acc.hold_at_red();
        assert_approx_eq!(acc.acc(), -3.0);
    }
}
