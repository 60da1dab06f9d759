//! Test fixtures for fleet-map.
//!
//! Real Las Vegas locations (from OpenStreetMap) plus builders for the
//! backend records the session consumes.

#![allow(dead_code)]

pub mod dispatch;

pub use dispatch::*;
