//! fleet-map core
//!
//! Map synchronization for a fleet dispatch console: polyline decoding,
//! per-vehicle colors and the display state a map renderer follows.

pub mod camera;
pub mod colors;
pub mod config;
pub mod dto;
pub mod geo;
pub mod map_state;
pub mod osrm;
pub mod polyline;
pub mod render;
pub mod session;
pub mod traits;
