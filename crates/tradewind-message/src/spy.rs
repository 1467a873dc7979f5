//! The spy-settlement exchange: a scout looks inside a foreign
//! settlement one tile away without entering it.

use tradewind_wire::Element;

use crate::error::MessageError;
use crate::game::{Game, Rejection};
use crate::message::{require_attribute, Message};
use crate::types::{Ability, Direction, PlayerId, UnitId};

/// Asks the server to reveal the settlement adjacent to a unit.
///
/// Carries the spying unit's identifier and the direction it is
/// looking. The reply describes the settlement's contents; every
/// failed precondition comes back as an `error` document instead, and
/// a failed precondition mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpySettlementMessage {
    unit_id: UnitId,
    direction: Direction,
}

impl SpySettlementMessage {
    pub const TAG: &'static str = "spySettlement";
    const UNIT_ATTRIBUTE: &'static str = "unit";
    const DIRECTION_ATTRIBUTE: &'static str = "direction";

    /// Creates the message a client sends for `unit_id` looking in
    /// `direction`.
    pub fn new(unit_id: UnitId, direction: Direction) -> Self {
        Self { unit_id, direction }
    }

    /// Decodes the message from its wire document.
    pub fn from_document(document: &Element) -> Result<Self, MessageError> {
        let unit_id =
            require_attribute(document, Self::TAG, Self::UNIT_ATTRIBUTE)?;
        let raw = require_attribute(
            document,
            Self::TAG,
            Self::DIRECTION_ATTRIBUTE,
        )?;
        let direction = Direction::from_name(raw).ok_or_else(|| {
            MessageError::InvalidAttribute {
                tag: Self::TAG,
                attribute: Self::DIRECTION_ATTRIBUTE,
                value: raw.to_string(),
            }
        })?;
        Ok(Self::new(UnitId::from(unit_id), direction))
    }

    pub fn unit_id(&self) -> &UnitId {
        &self.unit_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Message for SpySettlementMessage {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn to_document(&self) -> Element {
        Element::new(Self::TAG)
            .with_attribute(Self::UNIT_ATTRIBUTE, self.unit_id.as_str())
            .with_attribute(Self::DIRECTION_ATTRIBUTE, self.direction.name())
    }

    fn handle(
        &self,
        game: &mut dyn Game,
        player: &PlayerId,
    ) -> Result<Option<Element>, Rejection> {
        let unit = game.unit(player, &self.unit_id)?;
        if !unit.has_ability(Ability::SpyOnColony) {
            return Err(Rejection::new(format!(
                "Unit lacks ability to spy on colony: {}",
                self.unit_id
            )));
        }

        let tile = game.neighbour_tile(&unit, self.direction)?;
        let settlement = match tile.settlement {
            Some(settlement) => settlement,
            None => {
                return Err(Rejection::new(format!(
                    "There is no settlement at: {}",
                    tile.id
                )));
            }
        };

        if let Err(why) = game.scout_entry(&unit, &settlement) {
            return Err(Rejection::new(format!(
                "Unable to enter at: {}: {}",
                settlement.name, why
            )));
        }

        Ok(Some(game.spy_settlement(player, &unit, &settlement)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Settlement, Tile, Unit};
    use crate::types::{SettlementId, TileId};

    /// One unit on a tiny map with a single northern neighbour tile.
    struct MapGame {
        unit: Unit,
        north: Tile,
        scout_refusal: Option<String>,
        spied: Vec<SettlementId>,
    }

    impl MapGame {
        fn new() -> Self {
            Self {
                unit: Unit {
                    id: UnitId::from("U-1"),
                    abilities: vec![Ability::SpyOnColony],
                },
                north: Tile {
                    id: TileId::from("tile:12"),
                    settlement: Some(Settlement {
                        id: SettlementId::from("settlement:3"),
                        name: "Isabella".to_string(),
                    }),
                },
                scout_refusal: None,
                spied: Vec::new(),
            }
        }
    }

    impl Game for MapGame {
        fn unit(
            &self,
            _player: &PlayerId,
            unit: &UnitId,
        ) -> Result<Unit, Rejection> {
            if *unit == self.unit.id {
                Ok(self.unit.clone())
            } else {
                Err(Rejection::new(format!("Unknown unit: {unit}")))
            }
        }

        fn neighbour_tile(
            &self,
            _unit: &Unit,
            direction: Direction,
        ) -> Result<Tile, Rejection> {
            if direction == Direction::N {
                Ok(self.north.clone())
            } else {
                Err(Rejection::new(format!(
                    "No neighbour tile towards: {direction}"
                )))
            }
        }

        fn scout_entry(
            &self,
            _unit: &Unit,
            _settlement: &Settlement,
        ) -> Result<(), String> {
            match &self.scout_refusal {
                Some(why) => Err(why.clone()),
                None => Ok(()),
            }
        }

        fn spy_settlement(
            &mut self,
            _player: &PlayerId,
            _unit: &Unit,
            settlement: &Settlement,
        ) -> Element {
            self.spied.push(settlement.id.clone());
            Element::new(SpySettlementMessage::TAG)
                .with_attribute("settlement", settlement.id.as_str())
        }
    }

    fn player() -> PlayerId {
        PlayerId::from("player:1")
    }

    #[test]
    fn test_round_trip() {
        let message =
            SpySettlementMessage::new(UnitId::from("U-1"), Direction::NW);
        let decoded =
            SpySettlementMessage::from_document(&message.to_document())
                .expect("should decode");
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_from_document_requires_unit() {
        let document = Element::new(SpySettlementMessage::TAG)
            .with_attribute("direction", "N");
        match SpySettlementMessage::from_document(&document) {
            Err(MessageError::MissingAttribute { attribute, .. }) => {
                assert_eq!(attribute, "unit");
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_from_document_rejects_bad_direction() {
        let document = Element::new(SpySettlementMessage::TAG)
            .with_attribute("unit", "U-1")
            .with_attribute("direction", "UP");
        match SpySettlementMessage::from_document(&document) {
            Err(MessageError::InvalidAttribute { value, .. }) => {
                assert_eq!(value, "UP");
            }
            other => panic!("expected InvalidAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_handle_reveals_settlement() {
        let mut game = MapGame::new();
        let message =
            SpySettlementMessage::new(UnitId::from("U-1"), Direction::N);

        let reply = message
            .handle(&mut game, &player())
            .expect("handle should succeed")
            .expect("spying should produce a reply");

        assert_eq!(reply.tag(), SpySettlementMessage::TAG);
        assert_eq!(reply.attribute("settlement"), Some("settlement:3"));
        assert_eq!(game.spied, vec![SettlementId::from("settlement:3")]);
    }

    #[test]
    fn test_handle_rejects_unknown_unit() {
        let mut game = MapGame::new();
        let message =
            SpySettlementMessage::new(UnitId::from("U-9"), Direction::N);

        let rejection = message
            .handle(&mut game, &player())
            .expect_err("unknown unit should be rejected");
        assert_eq!(rejection.reason(), "Unknown unit: U-9");
        assert!(game.spied.is_empty());
    }

    #[test]
    fn test_handle_rejects_unit_without_ability() {
        let mut game = MapGame::new();
        game.unit.abilities.clear();
        let message =
            SpySettlementMessage::new(UnitId::from("U-1"), Direction::N);

        let rejection = message
            .handle(&mut game, &player())
            .expect_err("spying without the ability should be rejected");
        assert_eq!(
            rejection.reason(),
            "Unit lacks ability to spy on colony: U-1"
        );
        assert!(game.spied.is_empty());
    }

    #[test]
    fn test_handle_rejects_empty_tile() {
        let mut game = MapGame::new();
        game.north.settlement = None;
        let message =
            SpySettlementMessage::new(UnitId::from("U-1"), Direction::N);

        let rejection = message
            .handle(&mut game, &player())
            .expect_err("an empty tile should be rejected");
        assert_eq!(rejection.reason(), "There is no settlement at: tile:12");
        assert!(game.spied.is_empty());
    }

    #[test]
    fn test_handle_rejects_map_edge() {
        let mut game = MapGame::new();
        let message =
            SpySettlementMessage::new(UnitId::from("U-1"), Direction::E);

        let rejection = message
            .handle(&mut game, &player())
            .expect_err("the map edge should be rejected");
        assert_eq!(rejection.reason(), "No neighbour tile towards: E");
        assert!(game.spied.is_empty());
    }

    #[test]
    fn test_handle_rejects_blocked_entry() {
        let mut game = MapGame::new();
        game.scout_refusal = Some("Blocked by hostile units".to_string());
        let message =
            SpySettlementMessage::new(UnitId::from("U-1"), Direction::N);

        let rejection = message
            .handle(&mut game, &player())
            .expect_err("a blocked entry should be rejected");
        assert_eq!(
            rejection.reason(),
            "Unable to enter at: Isabella: Blocked by hostile units"
        );
        assert!(game.spied.is_empty());
    }
}
