//! Polyline representation and codec for route geometries.
//!
//! Routing backends ship geometries in the compact Google polyline format.
//! Decoding happens once at the boundary; everything downstream works on
//! [`Polyline`] coordinate sequences.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::{Bounds, Coordinate};

/// Every encoded byte is offset by this value.
const CHAR_OFFSET: u8 = 63;
const CHAR_MAX: u8 = CHAR_OFFSET + 63;
const CONTINUATION_BIT: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;
/// 13 chunks of 5 bits cover an i64.
const MAX_SHIFT: u32 = 60;

/// Latitudes below this magnitude (after a 1e6 division) are assumed to be 1e5-encoded.
const INFERRED_LATITUDE_LIMIT: f64 = 10.0;

/// Fixed-point precision of an encoded polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 1e5, the classic Google / OSRM `polyline` format.
    #[default]
    Five,
    /// 1e6, OSRM `polyline6` / Valhalla.
    Six,
}

impl Precision {
    pub fn factor(self) -> f64 {
        match self {
            Precision::Five => 1e5,
            Precision::Six => 1e6,
        }
    }
}

/// How the decoder picks the precision of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecisionMode {
    /// The producer declared the precision.
    Fixed(Precision),
    /// Compatibility shim for geometries whose precision was never declared.
    /// See [`decode_inferred`].
    Inferred,
}

impl Default for PrecisionMode {
    fn default() -> Self {
        PrecisionMode::Fixed(Precision::default())
    }
}

/// An encoded geometry together with the precision its producer used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedGeometry {
    pub encoded: String,
    pub precision: Precision,
}

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::covering(&self.points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Byte outside the polyline alphabet (`?`..=`~`), including any non-ASCII byte.
    InvalidByte(u8),
    /// Input ended inside a value or between a latitude and its longitude.
    Truncated,
    /// A value does not fit in 64 bits.
    Overflow,
}

/// Malformed encoded polyline. `offset` is the byte offset of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError {
    pub offset: usize,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    fn new(offset: usize, kind: DecodeErrorKind) -> Self {
        Self { offset, kind }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DecodeErrorKind::InvalidByte(byte) => {
                write!(f, "invalid polyline byte 0x{:02x} at offset {}", byte, self.offset)
            }
            DecodeErrorKind::Truncated => {
                write!(f, "polyline truncated at offset {}", self.offset)
            }
            DecodeErrorKind::Overflow => {
                write!(f, "polyline value overflows at offset {}", self.offset)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes `encoded` at a known precision.
pub fn decode(encoded: &str, precision: Precision) -> Result<Polyline, DecodeError> {
    let factor = precision.factor();
    let points = decode_raw(encoded)?
        .into_iter()
        .map(|(lat, lng)| scale(lat, lng, factor))
        .collect();
    Ok(Polyline::new(points))
}

/// Decodes `encoded` guessing the precision point by point.
///
/// Compatibility shim: each point is first scaled by 1e6; if the resulting
/// latitude is nonzero and its magnitude is below 10 the raw values are
/// rescaled by 1e5 instead. Only valid when every route lies outside the
/// [-10, 10] latitude band. Prefer [`decode`] whenever the producer's
/// precision is known.
pub fn decode_inferred(encoded: &str) -> Result<Polyline, DecodeError> {
    let points = decode_raw(encoded)?
        .into_iter()
        .map(|(lat, lng)| {
            let estimate = scale(lat, lng, Precision::Six.factor());
            if estimate.latitude != 0.0 && estimate.latitude.abs() < INFERRED_LATITUDE_LIMIT {
                scale(lat, lng, Precision::Five.factor())
            } else {
                estimate
            }
        })
        .collect();
    Ok(Polyline::new(points))
}

pub fn decode_with(encoded: &str, mode: PrecisionMode) -> Result<Polyline, DecodeError> {
    match mode {
        PrecisionMode::Fixed(precision) => decode(encoded, precision),
        PrecisionMode::Inferred => decode_inferred(encoded),
    }
}

/// Encodes coordinates at the given precision.
///
/// Meant for finite, in-range coordinates. Anything else never panics but
/// does not survive a round trip: NaN encodes as 0, values beyond `i64`
/// saturate and deltas wrap.
pub fn encode(points: &[Coordinate], precision: Precision) -> String {
    let factor = precision.factor();
    let mut out = String::new();
    let (mut prev_lat, mut prev_lng) = (0i64, 0i64);

    for point in points {
        let lat = (point.latitude * factor).round() as i64;
        let lng = (point.longitude * factor).round() as i64;
        push_value(&mut out, lat.wrapping_sub(prev_lat));
        push_value(&mut out, lng.wrapping_sub(prev_lng));
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn scale(lat: i64, lng: i64, factor: f64) -> Coordinate {
    Coordinate::from_lat_lng(lat as f64 / factor, lng as f64 / factor)
}

/// Returns the running (lat, lng) accumulators after each point.
fn decode_raw(encoded: &str) -> Result<Vec<(i64, i64)>, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut cursor = 0;
    let (mut lat, mut lng) = (0i64, 0i64);
    let mut points = Vec::new();

    while cursor < bytes.len() {
        lat = accumulate(lat, bytes, &mut cursor)?;
        lng = accumulate(lng, bytes, &mut cursor)?;
        points.push((lat, lng));
    }

    Ok(points)
}

fn accumulate(total: i64, bytes: &[u8], cursor: &mut usize) -> Result<i64, DecodeError> {
    let start = *cursor;
    let delta = next_value(bytes, cursor)?;
    total
        .checked_add(delta)
        .ok_or(DecodeError::new(start, DecodeErrorKind::Overflow))
}

/// Reads one zig-zag varint starting at `cursor`.
fn next_value(bytes: &[u8], cursor: &mut usize) -> Result<i64, DecodeError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let offset = *cursor;
        let byte = *bytes
            .get(offset)
            .ok_or(DecodeError::new(offset, DecodeErrorKind::Truncated))?;
        if !(CHAR_OFFSET..=CHAR_MAX).contains(&byte) {
            return Err(DecodeError::new(offset, DecodeErrorKind::InvalidByte(byte)));
        }
        if shift > MAX_SHIFT {
            return Err(DecodeError::new(offset, DecodeErrorKind::Overflow));
        }

        let chunk = i64::from(byte - CHAR_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        *cursor += 1;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

fn push_value(out: &mut String, value: i64) {
    let mut bits = ((value << 1) ^ (value >> 63)) as u64;
    while bits >= 0x20 {
        out.push(char::from((0x20 | (bits & 0x1f)) as u8 + CHAR_OFFSET));
        bits >>= 5;
    }
    out.push(char::from(bits as u8 + CHAR_OFFSET));
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE_EXAMPLE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(actual: &[Coordinate], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len());
        for (point, (lat, lng)) in actual.iter().zip(expected) {
            assert!((point.latitude - lat).abs() < 1e-5, "lat {} != {}", point.latitude, lat);
            assert!((point.longitude - lng).abs() < 1e-5, "lng {} != {}", point.longitude, lng);
        }
    }

    #[test]
    fn test_decode_reference_example() {
        let polyline = decode(GOOGLE_EXAMPLE, Precision::Five).unwrap();
        assert_close(
            polyline.points(),
            &[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)],
        );
    }

    #[test]
    fn test_inferred_corrects_reference_example() {
        let polyline = decode_inferred(GOOGLE_EXAMPLE).unwrap();
        assert_close(
            polyline.points(),
            &[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)],
        );
    }

    #[test]
    fn test_decode_six_reads_same_string_smaller() {
        let polyline = decode(GOOGLE_EXAMPLE, Precision::Six).unwrap();
        assert_close(&polyline.points()[..1], &[(3.85, -12.02)]);
    }

    #[test]
    fn test_encode_reference_example() {
        let points = vec![
            Coordinate::from_lat_lng(38.5, -120.2),
            Coordinate::from_lat_lng(40.7, -120.95),
            Coordinate::from_lat_lng(43.252, -126.453),
        ];
        assert_eq!(encode(&points, Precision::Five), GOOGLE_EXAMPLE);
    }

    #[test]
    fn test_encode_extreme_values_does_not_panic() {
        let points = vec![
            Coordinate::from_lat_lng(f64::MAX, f64::NAN),
            Coordinate::from_lat_lng(f64::MIN, f64::INFINITY),
        ];
        let encoded = encode(&points, Precision::Five);
        assert!(!encoded.is_empty());
        assert!(encoded.bytes().all(|b| (CHAR_OFFSET..=CHAR_MAX).contains(&b)));
    }

    #[test]
    fn test_inferred_boundary_just_below_ten() {
        let encoded = encode(&[Coordinate::from_lat_lng(9.999999, 0.0)], Precision::Six);
        let polyline = decode_inferred(&encoded).unwrap();
        assert!((polyline.points()[0].latitude - 99.99999).abs() < 1e-9);
    }

    #[test]
    fn test_inferred_boundary_at_ten() {
        let encoded = encode(&[Coordinate::from_lat_lng(10.0, 0.0)], Precision::Six);
        let polyline = decode_inferred(&encoded).unwrap();
        assert!((polyline.points()[0].latitude - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_inferred_leaves_zero_latitude() {
        let encoded = encode(&[Coordinate::from_lat_lng(0.0, 2.5)], Precision::Six);
        let polyline = decode_inferred(&encoded).unwrap();
        assert_eq!(polyline.points()[0], Coordinate::from_lat_lng(0.0, 2.5));
    }

    #[test]
    fn test_decode_with_dispatches() {
        let fixed = decode_with(GOOGLE_EXAMPLE, PrecisionMode::Fixed(Precision::Five)).unwrap();
        let inferred = decode_with(GOOGLE_EXAMPLE, PrecisionMode::Inferred).unwrap();
        assert_eq!(fixed.len(), 3);
        assert_eq!(inferred.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(decode("", Precision::Five).unwrap().is_empty());
        assert!(decode_inferred("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_longitude_is_truncated() {
        let err = decode("_p~iF", Precision::Five).unwrap_err();
        assert_eq!(err, DecodeError::new(5, DecodeErrorKind::Truncated));
    }

    #[test]
    fn test_unterminated_value_is_truncated() {
        let err = decode("_p~i", Precision::Five).unwrap_err();
        assert_eq!(err, DecodeError::new(4, DecodeErrorKind::Truncated));
    }

    #[test]
    fn test_invalid_byte_offset() {
        let err = decode("_p~iF ps|U", Precision::Five).unwrap_err();
        assert_eq!(err, DecodeError::new(5, DecodeErrorKind::InvalidByte(b' ')));
        assert_eq!(err.to_string(), "invalid polyline byte 0x20 at offset 5");
    }

    #[test]
    fn test_non_ascii_is_invalid() {
        let err = decode("_p~iF\u{e9}", Precision::Five).unwrap_err();
        assert_eq!(err, DecodeError::new(5, DecodeErrorKind::InvalidByte(0xc3)));
    }

    #[test]
    fn test_overlong_value_overflows() {
        let err = decode(&"~".repeat(14), Precision::Five).unwrap_err();
        assert_eq!(err, DecodeError::new(13, DecodeErrorKind::Overflow));
    }

    #[test]
    fn test_bounds() {
        let polyline = decode(GOOGLE_EXAMPLE, Precision::Five).unwrap();
        let bounds = polyline.bounds().unwrap();
        assert!((bounds.south_west.latitude - 38.5).abs() < 1e-9);
        assert!((bounds.south_west.longitude - -126.453).abs() < 1e-9);
    }

    #[test]
    fn test_into_points() {
        let points = vec![Coordinate::from_lat_lng(38.5, -120.2)];
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.into_points(), points);
    }
}
