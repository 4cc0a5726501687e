//! Websocket relay for a remote opponent.
//!
//! Client messages: `{"move": {"hole": 4, "color": "B"}}` with zero-based
//! holes. Server messages: `{"move": ...}` for each move played on this
//! side, `{"board": ...}` after every turn, `{"error": "..."}` when a remote
//! move is refused and `{"end": ...}` once the game is over.

use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::board::{Move, Side};
use crate::error::GameError;
use crate::game::Snapshot;
use crate::player::RemoteOpponent;

/// Network half of a [`RemoteOpponent`].
pub struct Relay {
    moves: mpsc::Sender<Move>,
    rejections: mpsc::UnboundedReceiver<String>,
}

/// A remote player and the relay that feeds it.
pub fn channel() -> (RemoteOpponent, Relay) {
    let (move_tx, move_rx) = mpsc::channel(1);
    let (reject_tx, reject_rx) = mpsc::unbounded_channel();
    (RemoteOpponent::new(move_rx, reject_tx), Relay { moves: move_tx, rejections: reject_rx })
}

/// Wait for the opponent's TCP connection on `address`.
pub async fn accept_one(address: &str) -> Result<TcpStream, GameError> {
    let listener = TcpListener::bind(address).await?;
    info!("Listening on: {}", address);
    let (stream, peer) = listener.accept().await?;
    info!("Peer address: {}", peer);
    Ok(stream)
}

impl Relay {
    /// Shuttle messages between the websocket on `stream` and the game until
    /// either side goes away or the game ends.
    pub async fn run(
        mut self,
        stream: TcpStream,
        remote_side: Side,
        mut snapshots: watch::Receiver<Snapshot>,
    ) -> Result<(), GameError> {
        let ws_stream = tokio_tungstenite::accept_async(stream).await?;
        info!("Websocket connection open, remote plays as {}", remote_side);
        let (mut write, mut read) = ws_stream.split();

        let greeting = json!({ "side": remote_side, "board": snapshots.borrow().board.clone() });
        write.send(Message::text(greeting.to_string())).await?;

        loop {
            tokio::select! {
                incoming = read.next() => {
                    let raw_message = match incoming {
                        Some(Ok(raw_message)) => raw_message,
                        Some(Err(e)) => {
                            error!("Error reading websocket message: {:?}", e);
                            continue;
                        }
                        None => {
                            info!("Remote closed the connection");
                            break;
                        }
                    };
                    if !raw_message.is_text() && !raw_message.is_binary() { continue; }
                    match decode_move(&raw_message.into_data()) {
                        Ok(mv) => {
                            info!("Received: {}", mv);
                            if self.moves.send(mv).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Ignoring message: {}", e);
                            let reply = json!({ "error": e.to_string() });
                            write.send(Message::text(reply.to_string())).await?;
                        }
                    }
                }
                Some(reason) = self.rejections.recv() => {
                    let reply = json!({ "error": reason });
                    write.send(Message::text(reply.to_string())).await?;
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    for message in outbound_messages(&snapshot, remote_side) {
                        let text = message.to_string();
                        write.send(Message::text(text.clone())).await?;
                        info!("Sent: {}", text);
                    }
                    if snapshot.status.is_over() {
                        break;
                    }
                }
            }
        }

        if let Err(e) = write.close().await {
            warn!("Error closing websocket: {:?}", e);
        }
        Ok(())
    }
}

/// Decode a client frame into a move.
pub fn decode_move(data: &[u8]) -> Result<Move, GameError> {
    let value: Value = serde_json::from_slice(data)?;
    let map = value.as_object()
        .ok_or_else(|| GameError::Protocol("expected a dict".to_string()))?;
    let mv = map.get("move")
        .ok_or_else(|| GameError::Protocol(format!("invalid message: {}", value)))?;
    Ok(serde_json::from_value(mv.clone())?)
}

/// Frames to send after a turn: our own move if one was played, then the
/// board, then the result once the game is over.
pub fn outbound_messages(snapshot: &Snapshot, remote_side: Side) -> Vec<Value> {
    let mut messages = Vec::new();
    if let Some(played) = snapshot.last_move {
        if played.side != remote_side {
            messages.push(json!({ "move": played.mv }));
        }
    }
    messages.push(json!({ "board": snapshot.board, "status": snapshot.status }));
    if snapshot.status.is_over() {
        messages.push(json!({ "end": snapshot.status }));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, SeedColor};
    use crate::game::PlayedMove;
    use crate::player::Player;
    use crate::status::GameStatus;

    #[test]
    fn test_decode_move() {
        let mv = decode_move(br#"{"move": {"hole": 4, "color": "B"}}"#).unwrap();
        assert_eq!(mv, Move::new(4, SeedColor::Blue));

        assert!(matches!(decode_move(b"[1, 2]"), Err(GameError::Protocol(_))));
        assert!(matches!(decode_move(br#"{"start": true}"#), Err(GameError::Protocol(_))));
        assert!(matches!(decode_move(b"not json"), Err(GameError::Json(_))));
        assert!(matches!(decode_move(br#"{"move": {"hole": 4}}"#), Err(GameError::Json(_))));
    }

    #[test]
    fn test_outbound_skips_the_remote_side_own_move() {
        let snapshot = Snapshot {
            board: Board::with_first_player(Side::One),
            last_move: Some(PlayedMove { side: Side::Two, mv: Move::new(3, SeedColor::Red), captured: 0 }),
            status: GameStatus::ongoing(),
        };
        let messages = outbound_messages(&snapshot, Side::Two);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].get("board").is_some());

        let messages = outbound_messages(&snapshot, Side::One);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], json!({ "move": { "hole": 3, "color": "R" } }));
    }

    #[tokio::test]
    async fn test_channel_pairs_relay_and_player() {
        let (opponent, relay) = channel();
        relay.moves.send(Move::new(1, SeedColor::Blue)).await.unwrap();

        let mut player = Player::Remote(opponent);
        let board = Board::with_first_player(Side::Two);
        assert_eq!(player.make_move(&board).await.unwrap(), Move::new(1, SeedColor::Blue));

        drop(relay);
        assert!(matches!(player.make_move(&board).await, Err(GameError::Disconnected(Side::Two))));
    }
}
