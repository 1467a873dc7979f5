//! Identifier newtypes and the small enumerations messages carry.
//!
//! Messages reference game objects by identifier string, never by live
//! object; these newtypes keep the different id spaces from mixing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a unit, e.g. `"unit:42"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of a map tile, e.g. `"tile:128"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub String);

impl TileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of a settlement, e.g. `"settlement:7"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementId(pub String);

impl SettlementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SettlementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of the player a connection acts for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The eight map directions a unit can look or move in.
///
/// The wire spelling is the variant name (`"N"`, `"NE"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// The wire spelling of this direction.
    pub fn name(self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
        }
    }

    /// Parses the wire spelling. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities a unit may carry, as far as messages care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Ability {
    /// May look inside a foreign settlement without entering it.
    SpyOnColony,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_names_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(
                Direction::from_name(direction.name()),
                Some(direction)
            );
        }
    }

    #[test]
    fn test_direction_rejects_unknown_name() {
        assert_eq!(Direction::from_name("NORTH"), None);
        assert_eq!(Direction::from_name("n"), None);
        assert_eq!(Direction::from_name(""), None);
    }

    #[test]
    fn test_direction_serializes_as_wire_spelling() {
        let json = serde_json::to_string(&Direction::NE).unwrap();
        assert_eq!(json, "\"NE\"");
    }

    #[test]
    fn test_ids_display_raw() {
        assert_eq!(UnitId::from("unit:42").to_string(), "unit:42");
        assert_eq!(TileId::from("tile:128").to_string(), "tile:128");
        assert_eq!(PlayerId::from("player:1").to_string(), "player:1");
    }
}
