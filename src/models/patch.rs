//! Partial attribute patches and the field-level validation gate.
//!
//! Raw field input is checked here before a patch exists at all. Input that
//! fails never reaches a collection or the remote store.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::models::{FeatureKind, FurnitureProperties, RoomColor, RoomProperties};

/// Characters allowed in a room number.
static ROOM_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9/]*$").expect("room number pattern is valid"));

/// Returns true if `input` is an acceptable room number (digits and `/`, possibly empty).
#[must_use]
pub fn is_valid_room_number(input: &str) -> bool {
    ROOM_NUMBER_PATTERN.is_match(input)
}

/// Coerces numeric field text the way a numeric form input does.
///
/// Blank text becomes 0. Text that is not a number becomes NaN, which is
/// still written to the room; only the numeric input type guards against it.
#[must_use]
pub fn coerce_number(input: &str) -> f64 {
    match input.trim() {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        text => text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .unwrap_or(f64::NAN),
    }
}

/// Editable room field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomField {
    /// Room name
    Name,
    /// Room number
    Number,
    /// Room color
    Color,
    /// Bookable toggle
    Bookable,
    /// Seat capacity
    Capacity,
    /// Purpose text
    Purpose,
}

impl RoomField {
    /// All room fields, in form order.
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Number,
        Self::Color,
        Self::Bookable,
        Self::Capacity,
        Self::Purpose,
    ];

    /// Form label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Number => "Room number",
            Self::Color => "Color",
            Self::Bookable => "Bookable",
            Self::Capacity => "Capacity",
            Self::Purpose => "Purpose",
        }
    }

    /// Remote column name.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Number => "number",
            Self::Color => "color",
            Self::Bookable => "bookable",
            Self::Capacity => "capacity",
            Self::Purpose => "purpose",
        }
    }

    /// Turns raw field input into a single-field patch.
    ///
    /// # Errors
    ///
    /// - Room number containing anything other than digits and `/`
    /// - Color that is not a hex color
    /// - Bookable input that is not a true/false word
    pub fn patch_from_input(self, input: &str) -> Result<RoomPatch, ValidationError> {
        let mut patch = RoomPatch::default();
        match self {
            Self::Name => patch.name = Some(input.to_string()),
            Self::Purpose => patch.purpose = Some(input.to_string()),
            Self::Number => {
                if !is_valid_room_number(input) {
                    return Err(ValidationError::new(
                        ValidationErrorKind::DisallowedCharacters,
                        self.column(),
                        format!("'{input}' may only contain digits and '/'"),
                    ));
                }
                patch.number = Some(input.to_string());
            }
            Self::Color => {
                let color = RoomColor::from_hex(input).map_err(|e| {
                    ValidationError::new(ValidationErrorKind::InvalidColor, self.column(), e.to_string())
                })?;
                patch.color = Some(color);
            }
            Self::Bookable => {
                let bookable = parse_toggle(input).ok_or_else(|| {
                    ValidationError::new(
                        ValidationErrorKind::NotABoolean,
                        self.column(),
                        format!("'{input}' is not true or false"),
                    )
                })?;
                patch.bookable = Some(bookable);
            }
            Self::Capacity => patch.capacity = Some(coerce_number(input)),
        }
        Ok(patch)
    }
}

impl fmt::Display for RoomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

impl FromStr for RoomField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.column().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown room field '{s}'"))
    }
}

fn parse_toggle(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Partial update of room attributes.
///
/// Serializes to exactly the columns that are set, which is the body of the
/// remote update. A NaN capacity serializes as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RoomPatch {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New room number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// New color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<RoomColor>,
    /// New bookable flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookable: Option<bool>,
    /// New capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    /// New purpose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl RoomPatch {
    /// Merges the set fields into room properties.
    pub fn apply_to(&self, properties: &mut RoomProperties) {
        if let Some(name) = &self.name {
            properties.name = Some(name.clone());
        }
        if let Some(number) = &self.number {
            properties.number = Some(number.clone());
        }
        if let Some(color) = self.color {
            properties.color = Some(color);
        }
        if let Some(bookable) = self.bookable {
            properties.bookable = Some(bookable);
        }
        if let Some(capacity) = self.capacity {
            properties.capacity = Some(capacity);
        }
        if let Some(purpose) = &self.purpose {
            properties.purpose = Some(purpose.clone());
        }
    }
}

/// Partial update of furniture attributes.
///
/// Rotation is deliberately absent: it goes through the commit buffer and is
/// never sent to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FurniturePatch {
    /// New label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FurniturePatch {
    /// Patch that sets the label.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    /// Merges the set fields into furniture properties.
    pub fn apply_to(&self, properties: &mut FurnitureProperties) {
        if let Some(label) = &self.label {
            properties.label = Some(label.clone());
        }
    }
}

/// Patch aimed at one kind of feature.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePatch {
    /// Room attributes
    Room(RoomPatch),
    /// Furniture attributes
    Furniture(FurniturePatch),
}

impl AttributePatch {
    /// Kind of feature the patch applies to.
    #[must_use]
    pub const fn kind(&self) -> FeatureKind {
        match self {
            Self::Room(_) => FeatureKind::Room,
            Self::Furniture(_) => FeatureKind::Furniture,
        }
    }

    /// The patch fields as remote columns.
    #[must_use]
    pub fn columns(&self) -> Map<String, Value> {
        let value = match self {
            Self::Room(patch) => serde_json::to_value(patch),
            Self::Furniture(patch) => serde_json::to_value(patch),
        };
        match value {
            Ok(Value::Object(columns)) => columns,
            _ => Map::new(),
        }
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }
}

impl From<RoomPatch> for AttributePatch {
    fn from(patch: RoomPatch) -> Self {
        Self::Room(patch)
    }
}

impl From<FurniturePatch> for AttributePatch {
    fn from(patch: FurniturePatch) -> Self {
        Self::Furniture(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_number_pattern() {
        assert!(is_valid_room_number(""));
        assert!(is_valid_room_number("12/3"));
        assert!(is_valid_room_number("///"));
        assert!(!is_valid_room_number("ab"));
        assert!(!is_valid_room_number("12 3"));
        assert!(!is_valid_room_number("1-2"));
        assert!(!is_valid_room_number("12/3\n"));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("  "), 0.0);
        assert_eq!(coerce_number("42"), 42.0);
        assert_eq!(coerce_number(" 7.5 "), 7.5);
        assert_eq!(coerce_number("-3"), -3.0);
        assert!(coerce_number("abc").is_nan());
        assert!(coerce_number("12seats").is_nan());
        assert_eq!(coerce_number("Infinity"), f64::INFINITY);
    }

    #[test]
    fn test_number_field_rejects_letters() {
        let err = RoomField::Number.patch_from_input("ab").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::DisallowedCharacters);
        assert_eq!(err.field, "number");
    }

    #[test]
    fn test_color_field() {
        let patch = RoomField::Color.patch_from_input("#00AAFF").unwrap();
        assert_eq!(patch.color, Some(RoomColor::new(0, 0xAA, 0xFF)));
        let err = RoomField::Color.patch_from_input("blue").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidColor);
    }

    #[test]
    fn test_bookable_field() {
        assert_eq!(RoomField::Bookable.patch_from_input("on").unwrap().bookable, Some(true));
        assert_eq!(RoomField::Bookable.patch_from_input("False").unwrap().bookable, Some(false));
        assert!(RoomField::Bookable.patch_from_input("maybe").is_err());
    }

    #[test]
    fn test_capacity_nan_is_still_a_patch() {
        let patch = RoomField::Capacity.patch_from_input("lots").unwrap();
        assert!(patch.capacity.unwrap().is_nan());
        let columns = AttributePatch::Room(patch).columns();
        assert_eq!(columns.get("capacity"), Some(&Value::Null));
    }

    #[test]
    fn test_columns_only_contain_set_fields() {
        let patch = AttributePatch::from(RoomField::Number.patch_from_input("12/3").unwrap());
        assert_eq!(Value::Object(patch.columns()), json!({"number": "12/3"}));

        let patch = AttributePatch::from(FurniturePatch::label("Desk"));
        assert_eq!(Value::Object(patch.columns()), json!({"label": "Desk"}));
        assert_eq!(patch.kind(), FeatureKind::Furniture);
    }

    #[test]
    fn test_apply_to_merges_without_clearing() {
        let mut props = RoomProperties {
            name: Some("Old".to_string()),
            purpose: Some("Meetings".to_string()),
            ..RoomProperties::default()
        };
        RoomPatch {
            name: Some("New".to_string()),
            ..RoomPatch::default()
        }
        .apply_to(&mut props);
        assert_eq!(props.name.as_deref(), Some("New"));
        assert_eq!(props.purpose.as_deref(), Some("Meetings"));
    }

    #[test]
    fn test_room_field_from_str() {
        assert_eq!("number".parse::<RoomField>().unwrap(), RoomField::Number);
        assert_eq!("Capacity".parse::<RoomField>().unwrap(), RoomField::Capacity);
        assert!("label".parse::<RoomField>().is_err());
    }
}
