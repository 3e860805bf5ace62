//! Geometry payload and its text codec.
//!
//! Geometry is opaque to the editor: whatever structured value a feature
//! carries is kept as-is and only converted to and from the editable text
//! shown in the geometry field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;

/// Structured geometry value of a feature (a GeoJSON geometry in practice).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geometry(pub Value);

impl Geometry {
    /// Wraps an already structured value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the GeoJSON `type` member, if the payload has one.
    #[must_use]
    pub fn geometry_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Borrows the underlying value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Geometry {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Renders geometry as editable text.
///
/// Output is pretty-printed with two-space indentation. Object keys come out
/// in sorted order, so the same value always renders to the same text.
///
/// # Examples
///
/// ```
/// use floorplan_editor::models::geometry::{decode, Geometry};
/// use serde_json::json;
///
/// let text = decode(&Geometry::new(json!({"type": "Point", "coordinates": [0, 0]})));
/// assert!(text.starts_with("{\n  \"coordinates\""));
/// ```
#[must_use]
pub fn decode(geometry: &Geometry) -> String {
    // Serializing a `Value` to a String cannot fail.
    serde_json::to_string_pretty(&geometry.0).unwrap_or_default()
}

/// Parses edited text back into a geometry value.
///
/// Any well-formed JSON document is accepted; the payload is not checked
/// against the GeoJSON geometry schema.
///
/// # Errors
///
/// Returns a [`ParseError`] with the line and column of the first syntax error.
pub fn encode(text: &str) -> Result<Geometry, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(Geometry(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_is_indented() {
        let geometry = Geometry::new(json!({"type": "Point", "coordinates": [1, 2]}));
        let text = decode(&geometry);
        assert_eq!(
            text,
            "{\n  \"coordinates\": [\n    1,\n    2\n  ],\n  \"type\": \"Point\"\n}"
        );
    }

    #[test]
    fn test_decode_is_deterministic() {
        let a = Geometry::new(json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}));
        assert_eq!(decode(&a), decode(&a.clone()));
    }

    #[test]
    fn test_round_trip_polygon() {
        let geometry = Geometry::new(json!({
            "type": "Polygon",
            "coordinates": [[[0.5, 0.25], [10.0, 0.0], [10.0, 7.5], [0.5, 0.25]]]
        }));
        assert_eq!(encode(&decode(&geometry)).unwrap(), geometry);
    }

    #[test]
    fn test_round_trip_keeps_every_coordinate_bit() {
        // xorshift64, fixed seed
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        let mut coordinates = vec![111.520_627_183_947_17, 1.071_566_039_146_582_6e-75];
        for _ in 0..5_000 {
            let unit = (next() >> 11) as f64 / (1u64 << 53) as f64;
            coordinates.push(unit.mul_add(360.0, -180.0));
            let bits = f64::from_bits(next());
            if bits.is_finite() {
                coordinates.push(bits);
            }
        }

        for x in coordinates {
            let geometry = Geometry::new(json!({"type": "Point", "coordinates": [x, 0.0]}));
            let back = encode(&decode(&geometry)).unwrap();
            assert_eq!(back, geometry, "coordinate {x:e} drifted");
        }
    }

    #[test]
    fn test_round_trip_null_geometry() {
        let geometry = Geometry::default();
        assert_eq!(decode(&geometry), "null");
        assert_eq!(encode("null").unwrap(), geometry);
    }

    #[test]
    fn test_encode_rejects_malformed_text() {
        let err = encode("{\"type\": \"Point\", \"coordinates\": [1, 1]").unwrap_err();
        assert!(err.line >= 1);
        assert!(encode("").is_err());
        assert!(encode("not json").is_err());
    }

    #[test]
    fn test_geometry_type() {
        let geometry = Geometry::new(json!({"type": "LineString", "coordinates": []}));
        assert_eq!(geometry.geometry_type(), Some("LineString"));
        assert_eq!(Geometry::new(json!([1, 2])).geometry_type(), None);
    }
}
