//! Line commands understood by the interactive front end.

use std::fmt;
use std::str::FromStr;

use crate::models::RoomField;

/// Field targeted by `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldName {
    /// A room attribute
    Room(RoomField),
    /// Furniture label
    Label,
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("label") {
            return Ok(Self::Label);
        }
        s.parse::<RoomField>()
            .map(Self::Room)
            .map_err(|_| format!("Unknown field '{s}' (expected name, number, color, bookable, capacity, purpose or label)"))
    }
}

impl FieldName {
    /// Whether the field takes free text that is stored exactly as typed.
    #[must_use]
    pub const fn is_free_text(self) -> bool {
        matches!(
            self,
            Self::Room(RoomField::Name | RoomField::Purpose) | Self::Label
        )
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room(field) => write!(f, "{field}"),
            Self::Label => write!(f, "label"),
        }
    }
}

/// One user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// List rooms
    Rooms,
    /// List walls
    Walls,
    /// List furniture
    Furniture,
    /// Select a room or wall by id
    Select(String),
    /// Select a piece of furniture by id
    SelectFurniture(String),
    /// Clear the selection
    Clear,
    /// Show the panel for the current selection
    Show,
    /// Type into a field
    Set {
        /// Target field
        field: FieldName,
        /// Raw input, possibly empty
        value: String,
    },
    /// Replace the geometry text
    Geometry(String),
    /// Type into the rotation field
    Rotate(f64),
    /// Leave the rotation field (commits the buffered rotation)
    Blur,
    /// Delete the selected feature
    Delete,
    /// Export GeoJSON files
    Export,
    /// Show remote write history
    History,
    /// Show command help
    Help,
    /// Exit
    Quit,
}

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  rooms | walls | furniture     List features
  select <id>                   Select a room or wall
  furniture-select <id>         Select a piece of furniture
  clear                         Clear the selection
  show                          Show the properties panel
  set <field> [value]           Edit a field (name, number, color, bookable,
                                capacity, purpose, label)
  geometry <json>               Replace the geometry of the selection
  rotate <degrees>              Type into the rotation field
  blur                          Leave the rotation field (commit)
  delete                        Delete the selected feature
  export                        Export GeoJSON files
  history                       Show remote write history
  help                          Show this help
  quit                          Exit";

fn required<'a>(verb: &str, rest: &'a str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("'{verb}' needs an argument"))
    } else {
        Ok(rest)
    }
}

impl FromStr for Command {
    type Err = String;

    /// Parses one input line. Leading and trailing whitespace is ignored,
    /// except in the value of a free-text `set`, which is kept as typed.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (verb, raw_rest) = line
            .split_once(char::is_whitespace)
            .map_or((line.trim_end(), ""), |(verb, rest)| (verb, rest));
        let rest = raw_rest.trim();

        let command = match verb.to_ascii_lowercase().as_str() {
            "rooms" => Self::Rooms,
            "walls" => Self::Walls,
            "furniture" => Self::Furniture,
            "select" => Self::Select(required(verb, rest)?.to_string()),
            "furniture-select" => Self::SelectFurniture(required(verb, rest)?.to_string()),
            "clear" => Self::Clear,
            "show" => Self::Show,
            "set" => {
                required(verb, rest)?;
                let raw_rest = raw_rest.trim_start();
                let (field, value) = raw_rest
                    .split_once(char::is_whitespace)
                    .unwrap_or((raw_rest.trim_end(), ""));
                let field: FieldName = field.parse()?;
                let value = if field.is_free_text() { value } else { value.trim() };
                Self::Set {
                    field,
                    value: value.to_string(),
                }
            }
            "geometry" => Self::Geometry(required(verb, rest)?.to_string()),
            "rotate" => {
                let degrees = required(verb, rest)?;
                let degrees = degrees
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| format!("'{degrees}' is not a number"))?;
                Self::Rotate(degrees)
            }
            "blur" => Self::Blur,
            "delete" => Self::Delete,
            "export" => Self::Export,
            "history" => Self::History,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "" => return Err("Empty command".to_string()),
            other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("rooms".parse::<Command>().unwrap(), Command::Rooms);
        assert_eq!("  QUIT ".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("blur".parse::<Command>().unwrap(), Command::Blur);
        assert_eq!(
            "select r1".parse::<Command>().unwrap(),
            Command::Select("r1".to_string())
        );
        assert_eq!(
            "furniture-select f2".parse::<Command>().unwrap(),
            Command::SelectFurniture("f2".to_string())
        );
    }

    #[test]
    fn test_parse_set_keeps_value_text() {
        assert_eq!(
            "set purpose Team meetings".parse::<Command>().unwrap(),
            Command::Set {
                field: FieldName::Room(RoomField::Purpose),
                value: "Team meetings".to_string()
            }
        );
        assert_eq!(
            "set number".parse::<Command>().unwrap(),
            Command::Set {
                field: FieldName::Room(RoomField::Number),
                value: String::new()
            }
        );
        assert_eq!(
            "set label Desk".parse::<Command>().unwrap(),
            Command::Set {
                field: FieldName::Label,
                value: "Desk".to_string()
            }
        );
        assert!("set rotation 5".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_set_free_text_is_not_trimmed() {
        assert_eq!(
            "set name   Lab ".parse::<Command>().unwrap(),
            Command::Set {
                field: FieldName::Room(RoomField::Name),
                value: "  Lab ".to_string()
            }
        );
        assert_eq!(
            "set label  Desk  ".parse::<Command>().unwrap(),
            Command::Set {
                field: FieldName::Label,
                value: " Desk  ".to_string()
            }
        );
        assert_eq!(
            "set purpose \t".parse::<Command>().unwrap(),
            Command::Set {
                field: FieldName::Room(RoomField::Purpose),
                value: "\t".to_string()
            }
        );
        assert_eq!(
            "set capacity  12 ".parse::<Command>().unwrap(),
            Command::Set {
                field: FieldName::Room(RoomField::Capacity),
                value: "12".to_string()
            }
        );
    }

    #[test]
    fn test_parse_geometry_keeps_json() {
        let command = r#"geometry {"type": "Point", "coordinates": [1, 1]}"#
            .parse::<Command>()
            .unwrap();
        assert_eq!(
            command,
            Command::Geometry(r#"{"type": "Point", "coordinates": [1, 1]}"#.to_string())
        );
    }

    #[test]
    fn test_parse_rotate() {
        assert_eq!("rotate 45".parse::<Command>().unwrap(), Command::Rotate(45.0));
        assert_eq!("rotate -12.5".parse::<Command>().unwrap(), Command::Rotate(-12.5));
        assert!("rotate abc".parse::<Command>().is_err());
        assert!("rotate".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("select".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().unwrap_err().contains("Unknown command"));
    }
}
