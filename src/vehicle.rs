use self::acceleration::AccelerationModel;
use crate::approach::{ApproachId, LANE_OFFSET};
use crate::math::{rot90, Point2d, Vector2d};
use crate::VehicleId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod acceleration;

pub(crate) use acceleration::MIN_GAP;

/// A simulated vehicle.
///
/// Positions are measured as the distance of the front bumper from the
/// intersection centre along the approach axis, decreasing each tick and
/// turning negative once the vehicle has passed through.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The approach the vehicle is travelling on.
    approach: ApproachId,
    /// The vehicle's length in m.
    length: f64,
    /// The acceleration model
    acc: AccelerationModel,
    /// The front bumper's distance to the intersection centre, in m.
    pos: f64,
    /// The velocity in m/s.
    vel: f64,
    /// The vehicle's desired free-flow speed in m/s.
    desired_vel: f64,
    /// The world space coordinates of the centre of the vehicle.
    world_pos: Point2d,
    /// A world space unit vector aligned with the vehicle's heading.
    world_dir: Vector2d,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleAttributes {
    /// The vehicle length in m.
    pub length: f64,
    /// The maximum acceleration of the vehicle, in m/s^2.
    pub max_acc: f64,
    /// The comfortable deceleration of the vehicle, a positive magnitude in m/s^2.
    pub comf_dec: f64,
    /// The desired gap to the vehicle ahead, in seconds.
    pub time_headway: f64,
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            length: 4.5,
            max_acc: 2.0,
            comf_dec: 3.0,
            time_headway: 1.5,
        }
    }
}

impl Vehicle {
    /// Creates a new vehicle at the given position with zero speed.
    pub(crate) fn new(
        id: VehicleId,
        approach: ApproachId,
        attributes: &VehicleAttributes,
        desired_vel: f64,
        pos: f64,
    ) -> Self {
        Self {
            id,
            approach,
            length: attributes.length,
            acc: AccelerationModel::new(&acceleration::ModelParams {
                time_headway: attributes.time_headway,
                max_acceleration: attributes.max_acc,
                comf_deceleration: attributes.comf_dec,
            }),
            pos,
            vel: 0.0,
            desired_vel,
            world_pos: Point2d::new(0.0, 0.0),
            world_dir: Vector2d::new(0.0, 0.0),
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The approach the vehicle is travelling on.
    pub fn approach(&self) -> ApproachId {
        self.approach
    }

    /// The vehicle's length in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The front bumper's distance to the intersection centre in m.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// The rear bumper's distance to the intersection centre in m.
    pub fn pos_rear(&self) -> f64 {
        self.pos + self.length
    }

    /// The vehicle's velocity in m/s.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The vehicle's desired free-flow speed in m/s.
    pub fn desired_vel(&self) -> f64 {
        self.desired_vel
    }

    /// Whether the vehicle is stopped.
    pub fn has_stopped(&self) -> bool {
        self.vel < 0.1
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.world_pos
    }

    /// A unit vector in world space aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        self.world_dir
    }

    /// Resets the acceleration model in preparation for a new step.
    pub(crate) fn reset(&self) {
        self.acc.reset()
    }

    /// Applies the free-road acceleration toward the desired speed.
    pub(crate) fn apply_free_road(&self) {
        self.acc.free_road(self.vel, self.desired_vel);
    }

    /// Applies an acceleration to the vehicle so it follows the leader
    /// whose rear bumper is at `leader_rear` travelling at `leader_vel`.
    pub(crate) fn follow_vehicle(&self, leader_rear: f64, leader_vel: f64) {
        let net_dist = self.pos - leader_rear;
        self.acc
            .follow_vehicle(net_dist, self.vel, leader_vel, self.desired_vel);
    }

    /// Applies a comfortable deceleration, holding the vehicle for a red light.
    pub(crate) fn hold_at_red(&self) {
        self.acc.hold_at_red();
    }

    /// Integrates the vehicle's velocity and position.
    ///
    /// If a `barrier` is given, the vehicle is clamped there should the
    /// integration carry it through; this enforces the stop line while
    /// the approach shows red.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    pub(crate) fn integrate(&mut self, dt: f64, barrier: Option<f64>) {
        self.vel = f64::max(self.vel + dt * self.acc.acc(), 0.0);
        self.pos -= self.vel * dt;
        if let Some(line) = barrier {
            if self.pos < line {
                self.pos = line;
                self.vel = 0.0;
            }
        }
    }

    /// Updates the vehicle's world coordinates.
    pub(crate) fn update_coords(&mut self) {
        let heading = self.approach.heading();
        let right = -rot90(heading);
        let centre = -(self.pos + 0.5 * self.length) * heading + LANE_OFFSET * right;
        self.world_pos = Point2d::new(centre.x, centre.y);
        self.world_dir = heading;
    }
}
