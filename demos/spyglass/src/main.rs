//! Spyglass: a server with one island and a client that looks at it.
//!
//! Starts a Tradewind server hosting a tiny map, connects a client,
//! spies on the settlement to the north, then gets refused over open
//! water. Run with `RUST_LOG=tradewind_net=trace` to watch the wire.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tradewind::prelude::*;

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// One scout anchored off an island chain. North lies Isabella;
/// every other direction is open sea.
struct IslandGame {
    scout: Unit,
    isabella: Settlement,
    visits: usize,
}

impl IslandGame {
    fn new() -> Self {
        Self {
            scout: Unit {
                id: UnitId::from("U-1"),
                abilities: vec![Ability::SpyOnColony],
            },
            isabella: Settlement {
                id: SettlementId::from("settlement:3"),
                name: "Isabella".to_string(),
            },
            visits: 0,
        }
    }
}

impl Game for IslandGame {
    fn unit(
        &self,
        _player: &PlayerId,
        unit: &UnitId,
    ) -> Result<Unit, Rejection> {
        if *unit == self.scout.id {
            Ok(self.scout.clone())
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
            Ok(Tile {
                id: TileId::from("tile:1"),
                settlement: Some(self.isabella.clone()),
            })
        } else {
            Ok(Tile {
                id: TileId(format!("tile:sea-{direction}")),
                settlement: None,
            })
        }
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
        player: &PlayerId,
        _unit: &Unit,
        settlement: &Settlement,
    ) -> Element {
        self.visits += 1;
        tracing::info!(%player, settlement = %settlement.name, "settlement spied upon");
        Element::new("spySettlement")
            .with_attribute("settlement", settlement.id.as_str())
            .with_attribute("name", settlement.name.as_str())
            .with_attribute("visits", self.visits.to_string())
    }
}

/// Client-side dispatcher; this client only asks.
struct Lookout;

#[async_trait]
impl Dispatcher for Lookout {
    async fn dispatch(
        &self,
        _connection: &Connection,
        _document: Element,
    ) -> Result<Option<Element>, DispatchError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spyglass=info,tradewind=info".into()),
        )
        .init();

    let game = Arc::new(Mutex::new(IslandGame::new()));

    let server = Server::builder().bind("127.0.0.1:0").build().await?;
    let addr = server.local_addr()?;
    tracing::info!(%addr, "server up");

    let game_for_server = Arc::clone(&game);
    let next_player = AtomicU64::new(1);
    tokio::spawn(async move {
        let _ = server
            .run(move || {
                let n = next_player.fetch_add(1, Ordering::Relaxed);
                Arc::new(GameDispatcher::new(
                    PlayerId(format!("player:{n}")),
                    Arc::clone(&game_for_server),
                )) as Arc<dyn Dispatcher>
            })
            .await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let client = Connection::connect(addr, Arc::new(Lookout)).await?;

    // A successful look inside Isabella.
    let request = SpySettlementMessage::new(UnitId::from("U-1"), Direction::N);
    match client.ask(request.to_document()).await? {
        Some(reply) => tracing::info!(
            settlement = reply.attribute("name").unwrap_or("?"),
            visits = reply.attribute("visits").unwrap_or("?"),
            "the spy reports"
        ),
        None => tracing::warn!("the spy came back with nothing"),
    }

    // Spying east finds only water; the server says so.
    let request = SpySettlementMessage::new(UnitId::from("U-1"), Direction::E);
    match client.ask(request.to_document()).await {
        Err(NetError::Rejected(reason)) => {
            tracing::info!(%reason, "the server refused, as it should")
        }
        other => tracing::warn!(?other, "expected a refusal"),
    }

    client.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn start() -> String {
        let game = Arc::new(Mutex::new(IslandGame::new()));
        let server = Server::builder()
            .bind("127.0.0.1:0")
            .build()
            .await
            .unwrap();
        let addr = server.local_addr().unwrap().to_string();
        let next_player = AtomicU64::new(1);
        tokio::spawn(async move {
            let _ = server
                .run(move || {
                    let n = next_player.fetch_add(1, Ordering::Relaxed);
                    Arc::new(GameDispatcher::new(
                        PlayerId(format!("player:{n}")),
                        Arc::clone(&game),
                    )) as Arc<dyn Dispatcher>
                })
                .await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        addr
    }

    #[tokio::test]
    async fn test_spy_round_trip() {
        let addr = start().await;
        let client = Connection::connect(addr.as_str(), Arc::new(Lookout))
            .await
            .unwrap();

        let request =
            SpySettlementMessage::new(UnitId::from("U-1"), Direction::N);
        let reply = client
            .ask(request.to_document())
            .await
            .unwrap()
            .expect("spying should produce a reply");
        assert_eq!(reply.attribute("name"), Some("Isabella"));
        assert_eq!(reply.attribute("visits"), Some("1"));
    }

    #[tokio::test]
    async fn test_open_sea_is_refused() {
        let addr = start().await;
        let client = Connection::connect(addr.as_str(), Arc::new(Lookout))
            .await
            .unwrap();

        let request =
            SpySettlementMessage::new(UnitId::from("U-1"), Direction::SE);
        match client.ask(request.to_document()).await {
            Err(NetError::Rejected(reason)) => {
                assert_eq!(reason, "There is no settlement at: tile:sea-SE");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
