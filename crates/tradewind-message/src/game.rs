//! The server-side state boundary handlers run against.
//!
//! Messages never hold live game objects; they resolve identifiers
//! through [`Game`] at handle time, so a stale id is a [`Rejection`]
//! carried back to the sender, not a dangling reference.

use thiserror::Error;
use tradewind_wire::Element;

use crate::types::{Ability, Direction, PlayerId, SettlementId, TileId, UnitId};

/// A domain-level refusal from a [`Game`] operation or a handler.
///
/// The reason is client-visible text: it crosses the wire inside an
/// `error` document. Failure here is data, never a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Rejection(String);

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

/// A unit as the message layer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub abilities: Vec<Ability>,
}

impl Unit {
    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }
}

/// A map tile and whatever settlement sits on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub settlement: Option<Settlement>,
}

/// A settlement a foreign unit may try to look inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
}

/// Server-side game state, as narrow as the messages need it.
///
/// Read operations reject with a reason the handler forwards verbatim;
/// the one mutating operation, [`spy_settlement`](Game::spy_settlement),
/// runs only after every precondition has been checked and cannot fail.
pub trait Game: Send + 'static {
    /// Resolves a unit owned by `player`. Unknown and foreign units
    /// are both rejections.
    fn unit(
        &self,
        player: &PlayerId,
        unit: &UnitId,
    ) -> Result<Unit, Rejection>;

    /// Resolves the tile one step from `unit`'s position in
    /// `direction`, rejecting at the map edge.
    fn neighbour_tile(
        &self,
        unit: &Unit,
        direction: Direction,
    ) -> Result<Tile, Rejection>;

    /// Checks whether `unit` may enter `settlement` as a scout; the
    /// error is the reason it may not.
    fn scout_entry(
        &self,
        unit: &Unit,
        settlement: &Settlement,
    ) -> Result<(), String>;

    /// Reveals `settlement` to `player` and returns the document
    /// describing what the spy saw.
    fn spy_settlement(
        &mut self,
        player: &PlayerId,
        unit: &Unit,
        settlement: &Settlement,
    ) -> Element;
}
