//! Typed records received from the dispatch backend.
//!
//! Shapes mirror the backend's JSON. Nothing reaches the map state until
//! `validate` has accepted it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub enum DtoError {
    NonFinite { field: String },
    OutOfRange { field: String, coordinate: Coordinate },
}

impl fmt::Display for DtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DtoError::NonFinite { field } => write!(f, "{} is not a finite coordinate", field),
            DtoError::OutOfRange { field, coordinate } => write!(
                f,
                "{} is out of range (lat {}, lng {})",
                field, coordinate.latitude, coordinate.longitude
            ),
        }
    }
}

impl std::error::Error for DtoError {}

fn checked(field: impl Into<String>, coordinate: Coordinate) -> Result<Coordinate, DtoError> {
    if !coordinate.is_finite() {
        return Err(DtoError::NonFinite { field: field.into() });
    }
    if !coordinate.in_range() {
        return Err(DtoError::OutOfRange {
            field: field.into(),
            coordinate,
        });
    }
    Ok(coordinate)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl AddressRecord {
    /// Position without validation.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::from_lat_lng(self.latitude, self.longitude)
    }

    pub fn validate(&self, field: &str) -> Result<Coordinate, DtoError> {
        checked(field, self.coordinate())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub source: AddressRecord,
    pub destination: AddressRecord,
}

impl OrderRecord {
    pub fn validate(&self) -> Result<(), DtoError> {
        self.source.validate("source")?;
        self.destination.validate("destination")?;
        Ok(())
    }

    /// Label shown on markers: the order name, or its id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Start,
    Job,
    End,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// `[longitude, latitude]`.
    pub location: [f64; 2],
    #[serde(default)]
    pub job: Option<String>,
    /// Encoded geometry of the leg that ends at this step.
    #[serde(default)]
    pub geometry: Option<String>,
}

impl RouteStep {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.location[0], self.location[1])
    }
}

/// One vehicle's route as returned by the optimization backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStepsResponse {
    pub vehicle_id: String,
    #[serde(default)]
    pub geometry: Option<String>,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

impl RouteStepsResponse {
    pub fn validate(&self) -> Result<(), DtoError> {
        for (index, step) in self.steps.iter().enumerate() {
            checked(format!("steps[{}].location", index), step.coordinate())?;
        }
        Ok(())
    }
}
