use crate::math::Vector2d;
use crate::{VehicleId, VehicleSet};
use smallvec::SmallVec;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distance from the intersection centre to the approach entry, in m.
pub const ENTRY_POS: f64 = 150.0;

/// Distance from the intersection centre to the stop line, in m.
pub const STOP_LINE_POS: f64 = 12.0;

/// Position past the intersection centre at which vehicles
/// leave the simulation, in m.
pub const EXIT_POS: f64 = -20.0;

/// Lateral offset of the travel lane from the road centre line, in m.
pub(crate) const LANE_OFFSET: f64 = 1.75;

/// One of the four roads feeding the intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ApproachId {
    North,
    South,
    East,
    West,
}

/// A signal axis, grouping the two approaches served by the same green.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl ApproachId {
    /// All approaches, in the order used for indexing.
    pub const ALL: [ApproachId; 4] = [
        ApproachId::North,
        ApproachId::South,
        ApproachId::East,
        ApproachId::West,
    ];

    /// The index of this approach within [ApproachId::ALL].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The signal axis serving this approach.
    pub fn axis(self) -> Axis {
        match self {
            ApproachId::North | ApproachId::South => Axis::NorthSouth,
            ApproachId::East | ApproachId::West => Axis::EastWest,
        }
    }

    /// A unit vector in world space pointing in the direction of travel,
    /// toward the intersection centre.
    pub fn heading(self) -> Vector2d {
        match self {
            ApproachId::North => Vector2d::new(0.0, -1.0),
            ApproachId::South => Vector2d::new(0.0, 1.0),
            ApproachId::East => Vector2d::new(-1.0, 0.0),
            ApproachId::West => Vector2d::new(1.0, 0.0),
        }
    }
}

impl fmt::Display for ApproachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApproachId::North => "North",
            ApproachId::South => "South",
            ApproachId::East => "East",
            ApproachId::West => "West",
        };
        f.write_str(label)
    }
}

/// An approach represents a single lane of traffic feeding the intersection.
#[derive(Clone)]
pub struct Approach {
    /// The approach ID.
    id: ApproachId,
    /// The configured arrival intensity, immutable for a run.
    volume: u32,
    /// The vehicles on the approach, closest to the intersection first.
    vehicles: SmallVec<[VehicleId; 16]>,
}

impl Approach {
    /// Creates a new, empty approach.
    pub(crate) fn new(id: ApproachId, volume: u32) -> Self {
        Self {
            id,
            volume,
            vehicles: SmallVec::new(),
        }
    }

    /// Gets the approach ID.
    pub fn id(&self) -> ApproachId {
        self.id
    }

    /// Gets the configured traffic volume.
    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// The IDs of the vehicles on the approach, front of queue first.
    pub fn vehicle_ids(&self) -> &[VehicleId] {
        &self.vehicles
    }

    /// Inserts the vehicle with the given ID into the approach,
    /// preserving the front-to-back position ordering.
    pub(crate) fn insert_vehicle(&mut self, vehicles: &VehicleSet, id: VehicleId) {
        let veh_pos = vehicles[id].pos();
        let idx = self
            .vehicles
            .iter()
            .map(|id| vehicles[*id].pos())
            .position(|pos| pos > veh_pos)
            .unwrap_or(self.vehicles.len());
        self.vehicles.insert(idx, id);
    }

    /// Retains only the vehicles for which the predicate returns `true`.
    pub(crate) fn retain_vehicles(&mut self, mut f: impl FnMut(VehicleId) -> bool) {
        self.vehicles.retain(|id| f(*id));
    }
}
