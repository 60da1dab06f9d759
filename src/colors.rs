//! Deterministic per-vehicle colors.
//!
//! Summary cards and map routes must agree on a vehicle's color; they do so
//! by passing the same index here. Picking that index is the caller's job.

use serde::Serialize;

/// Line (primary) and marker/badge (secondary) colors for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VehicleColors {
    pub primary: &'static str,
    pub secondary: &'static str,
}

impl VehicleColors {
    const fn new(primary: &'static str, secondary: &'static str) -> Self {
        Self { primary, secondary }
    }
}

pub const PALETTE: [VehicleColors; 10] = [
    VehicleColors::new("#1f77b4", "#aec7e8"),
    VehicleColors::new("#ff7f0e", "#ffbb78"),
    VehicleColors::new("#2ca02c", "#98df8a"),
    VehicleColors::new("#d62728", "#ff9896"),
    VehicleColors::new("#9467bd", "#c5b0d5"),
    VehicleColors::new("#8c564b", "#c49c94"),
    VehicleColors::new("#e377c2", "#f7b6d2"),
    VehicleColors::new("#7f7f7f", "#c7c7c7"),
    VehicleColors::new("#bcbd22", "#dbdb8d"),
    VehicleColors::new("#17becf", "#9edae5"),
];

/// Colors for the vehicle at zero-based `index`, cycling through [`PALETTE`].
pub fn vehicle_colors(index: usize) -> VehicleColors {
    PALETTE[index % PALETTE.len()]
}
