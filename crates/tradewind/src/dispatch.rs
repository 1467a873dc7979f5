//! Bridges inbound wire documents to the message taxonomy.

use std::sync::Arc;

use tokio::sync::Mutex;
use tradewind_message::{
    decode, ErrorMessage, Game, Message, MessageError, PlayerId,
};
use tradewind_net::{async_trait, Connection, DispatchError, Dispatcher};
use tradewind_wire::Element;

/// The standard dispatcher: decodes each document into its message
/// variant and runs the variant's handler against the shared game, on
/// behalf of one player.
///
/// One `GameDispatcher` per connection, all sharing the game behind a
/// mutex. The player binding is fixed at construction; which player a
/// socket speaks for is the server's business, not the connection's.
///
/// A handler's [`Rejection`](tradewind_message::Rejection) does not
/// fail the dispatch: it becomes an `error` document sent back as the
/// answer, so the remote caller reads the reason instead of hanging.
pub struct GameDispatcher<G: Game> {
    player: PlayerId,
    game: Arc<Mutex<G>>,
}

impl<G: Game> GameDispatcher<G> {
    pub fn new(player: PlayerId, game: Arc<Mutex<G>>) -> Self {
        Self { player, game }
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    async fn run_message(
        &self,
        document: Element,
    ) -> Result<Option<Element>, DispatchError> {
        let message = decode(&document).map_err(|e| match e {
            MessageError::UnknownTag(tag) => DispatchError::UnknownTag(tag),
            other => DispatchError::InvalidMessage(other.to_string()),
        })?;

        let mut game = self.game.lock().await;
        match message.handle(&mut *game, &self.player) {
            Ok(reply) => Ok(reply),
            Err(rejection) => {
                tracing::debug!(
                    player = %self.player,
                    tag = message.tag(),
                    reason = %rejection,
                    "message rejected"
                );
                Ok(Some(ErrorMessage::new(rejection.reason()).to_document()))
            }
        }
    }
}

#[async_trait]
impl<G: Game> Dispatcher for GameDispatcher<G> {
    async fn dispatch(
        &self,
        _connection: &Connection,
        document: Element,
    ) -> Result<Option<Element>, DispatchError> {
        self.run_message(document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradewind_message::{
        Ability, Direction, Rejection, Settlement, SettlementId, Tile,
        TileId, Unit, UnitId,
    };

    /// A game whose only unit can spy in any direction onto one
    /// settlement.
    struct OneTileGame {
        spied: usize,
    }

    impl Game for OneTileGame {
        fn unit(
            &self,
            _player: &PlayerId,
            unit: &UnitId,
        ) -> Result<Unit, Rejection> {
            if unit.as_str() == "U-1" {
                Ok(Unit {
                    id: unit.clone(),
                    abilities: vec![Ability::SpyOnColony],
                })
            } else {
                Err(Rejection::new(format!("Unknown unit: {unit}")))
            }
        }

        fn neighbour_tile(
            &self,
            _unit: &Unit,
            _direction: Direction,
        ) -> Result<Tile, Rejection> {
            Ok(Tile {
                id: TileId::from("tile:1"),
                settlement: Some(Settlement {
                    id: SettlementId::from("settlement:1"),
                    name: "Port Royal".to_string(),
                }),
            })
        }

        fn scout_entry(
            &self,
            _unit: &Unit,
            _settlement: &Settlement,
        ) -> Result<(), String> {
            Ok(())
        }

        fn spy_settlement(
            &mut self,
            _player: &PlayerId,
            _unit: &Unit,
            settlement: &Settlement,
        ) -> Element {
            self.spied += 1;
            Element::new("spySettlement")
                .with_attribute("settlement", settlement.id.as_str())
        }
    }

    fn dispatcher() -> GameDispatcher<OneTileGame> {
        GameDispatcher::new(
            PlayerId::from("player:1"),
            Arc::new(Mutex::new(OneTileGame { spied: 0 })),
        )
    }

    #[test]
    fn test_game_dispatcher_erases_to_dyn_dispatcher() {
        // The server hands each accepted connection an Arc<dyn Dispatcher>.
        let erased: Arc<dyn Dispatcher> = Arc::new(dispatcher());
        assert_eq!(Arc::strong_count(&erased), 1);
    }

    #[tokio::test]
    async fn test_run_message_runs_handler() {
        let dispatcher = dispatcher();
        let document = Element::new("spySettlement")
            .with_attribute("unit", "U-1")
            .with_attribute("direction", "N");

        let reply = dispatcher
            .run_message(document)
            .await
            .expect("dispatch should succeed")
            .expect("spying should produce a reply");
        assert_eq!(reply.tag(), "spySettlement");
        assert_eq!(dispatcher.game.lock().await.spied, 1);
    }

    #[tokio::test]
    async fn test_run_message_turns_rejection_into_error_document() {
        let dispatcher = dispatcher();
        let document = Element::new("spySettlement")
            .with_attribute("unit", "U-9")
            .with_attribute("direction", "N");

        let reply = dispatcher
            .run_message(document)
            .await
            .expect("a rejection is still a successful dispatch")
            .expect("the rejection should produce an error document");
        assert_eq!(reply.tag(), "error");
        assert_eq!(reply.attribute("message"), Some("Unknown unit: U-9"));
        assert_eq!(dispatcher.game.lock().await.spied, 0);
    }

    #[tokio::test]
    async fn test_run_message_rejects_unknown_tag() {
        let dispatcher = dispatcher();

        match dispatcher.run_message(Element::new("teleport")).await {
            Err(DispatchError::UnknownTag(tag)) => {
                assert_eq!(tag, "teleport");
            }
            other => panic!("expected UnknownTag, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_message_rejects_invalid_message() {
        let dispatcher = dispatcher();
        let document = Element::new("spySettlement")
            .with_attribute("unit", "U-1")
            .with_attribute("direction", "UP");

        match dispatcher.run_message(document).await {
            Err(DispatchError::InvalidMessage(reason)) => {
                assert!(reason.contains("direction"), "got: {reason}");
            }
            other => panic!("expected InvalidMessage, got {other:?}"),
        }
    }
}
