//! Match hub: registry of live matches and their players.
//!
//! One engine per match behind an async mutex — the single-writer
//! discipline that keeps budget deduction, hand mutation and phase
//! transitions atomic per action. Matches are fully isolated from each
//! other; reads lock briefly and only ever see fully-applied states.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use uuid::Uuid;

use super::messages::{IncomingMessage, OutgoingMessage};
use crate::cards::CardId;
use crate::core::{Actor, GameConfig, GameState};
use crate::engine::{Game, GameError};
use crate::services::ServiceId;

/// Capacity of each room's broadcast queue.
const ROOM_CHANNEL_CAPACITY: usize = 32;

/// Transport-level rejections (everything the engine itself does not
/// decide).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    #[error("game '{0}' not found")]
    NotFound(String),
    #[error("seat '{0}' is already occupied")]
    SeatTaken(String),
    #[error("not authorized: {0}")]
    NotAuthorized(String),
}

impl HubError {
    /// Stable wire code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            HubError::NotFound(_) => "NOT_FOUND",
            HubError::SeatTaken(_) => "SEAT_TAKEN",
            HubError::NotAuthorized(_) => "NOT_AUTHORIZED",
        }
    }
}

/// A joined participant, identified by bearer token.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub game_id: String,
    pub seat: Actor,
    pub display_name: String,
    pub token: String,
}

/// One live match: engine plus its broadcast channel.
pub struct MatchRoom {
    pub engine: Mutex<Game>,
    pub broadcast: broadcast::Sender<String>,
}

impl MatchRoom {
    fn new(game: Game) -> Self {
        let (tx, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            engine: Mutex::new(game),
            broadcast: tx,
        }
    }

    /// Push a snapshot to every connected client.
    pub fn broadcast_snapshot(&self, state: &GameState) {
        // Send fails only when no client is connected; that is fine.
        let _ = self.broadcast.send(OutgoingMessage::snapshot(state).to_json());
    }
}

/// Registry of live matches and the players allowed into them.
#[derive(Default)]
pub struct MatchHub {
    rooms: RwLock<HashMap<String, Arc<MatchRoom>>>,
    players: RwLock<HashMap<String, Player>>,
}

impl MatchHub {
    /// Open a new match and register its creator.
    pub async fn create_match(
        &self,
        config: GameConfig,
        display_name: String,
        seat: Actor,
    ) -> (Player, GameState) {
        let game_id = Uuid::new_v4().to_string();
        let game = Game::create(config, game_id.clone());
        let state = game.state().clone();

        let room = Arc::new(MatchRoom::new(game));
        self.rooms.write().await.insert(game_id.clone(), room);

        let player = self.register_player(&game_id, display_name, seat).await;
        log::info!("opened match {game_id}");
        (player, state)
    }

    /// Join an existing match. Each player seat may be claimed once;
    /// additional facilitators are always allowed.
    pub async fn join(
        &self,
        game_id: &str,
        display_name: String,
        seat: Actor,
    ) -> Result<Player, HubError> {
        if !self.rooms.read().await.contains_key(game_id) {
            return Err(HubError::NotFound(game_id.to_string()));
        }

        if let Actor::Seat(_) = seat {
            let players = self.players.read().await;
            let taken = players
                .values()
                .any(|p| p.game_id == game_id && p.seat == seat);
            if taken {
                return Err(HubError::SeatTaken(seat.as_str().to_string()));
            }
        }

        Ok(self.register_player(game_id, display_name, seat).await)
    }

    async fn register_player(&self, game_id: &str, display_name: String, seat: Actor) -> Player {
        let player = Player {
            id: Uuid::new_v4().to_string(),
            game_id: game_id.to_string(),
            seat,
            display_name,
            token: Uuid::new_v4().to_string(),
        };
        self.players
            .write()
            .await
            .insert(player.token.clone(), player.clone());
        player
    }

    /// Resolve a bearer token against a match.
    pub async fn authorize(&self, game_id: &str, token: &str) -> Result<Player, HubError> {
        let players = self.players.read().await;
        let player = players
            .get(token)
            .ok_or_else(|| HubError::NotAuthorized("invalid token".into()))?;
        if player.game_id != game_id {
            return Err(HubError::NotAuthorized(
                "token does not belong to this game".into(),
            ));
        }
        Ok(player.clone())
    }

    /// Get a match's room.
    pub async fn room(&self, game_id: &str) -> Result<Arc<MatchRoom>, HubError> {
        self.rooms
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or_else(|| HubError::NotFound(game_id.to_string()))
    }

    /// Start a match and broadcast the opening snapshot.
    pub async fn start(&self, game_id: &str, token: &str) -> Result<GameState, ApiError> {
        self.authorize(game_id, token).await?;
        let room = self.room(game_id).await?;
        let mut engine = room.engine.lock().await;
        let state = engine.start()?.clone();
        room.broadcast_snapshot(&state);
        Ok(state)
    }

    /// Consistent snapshot of a match.
    pub async fn snapshot(&self, game_id: &str, token: &str) -> Result<GameState, ApiError> {
        self.authorize(game_id, token).await?;
        let room = self.room(game_id).await?;
        let engine = room.engine.lock().await;
        Ok(engine.state().clone())
    }

    /// Apply one action message for `player`, broadcasting the new
    /// snapshot on success.
    pub async fn apply_action(
        &self,
        game_id: &str,
        player: &Player,
        message: IncomingMessage,
    ) -> Result<GameState, ApiError> {
        let room = self.room(game_id).await?;
        let mut engine = room.engine.lock().await;

        let state = match message {
            IncomingMessage::AdvancePhase {} => engine.advance_phase(player.seat)?,
            IncomingMessage::UseBasicAction { side, target } => {
                let target = target.as_deref().map(parse_service).transpose()?;
                engine.use_basic_action(player.seat, side, target)?
            }
            IncomingMessage::PlayCard {
                side,
                card_id,
                targets,
            } => {
                let targets = targets
                    .iter()
                    .map(|t| parse_service(t))
                    .collect::<Result<Vec<ServiceId>, GameError>>()?;
                engine.play_card(player.seat, side, &CardId::new(card_id), &targets)?
            }
        }
        .clone();

        room.broadcast_snapshot(&state);
        Ok(state)
    }
}

fn parse_service(raw: &str) -> Result<ServiceId, GameError> {
    ServiceId::parse(raw)
        .ok_or_else(|| GameError::InvalidTarget(format!("unknown service '{raw}'")))
}

/// Engine or transport rejection, unified for the REST and WS layers.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Hub(#[from] HubError),
}

impl ApiError {
    /// Stable wire code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            ApiError::Game(e) => e.code(),
            ApiError::Hub(e) => e.code(),
        }
    }

    /// HTTP status for REST responses.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            ApiError::Hub(HubError::NotFound(_)) => 404,
            ApiError::Hub(HubError::SeatTaken(_)) => 409,
            ApiError::Hub(HubError::NotAuthorized(_))
            | ApiError::Game(GameError::NotAuthorized(_)) => 401,
            ApiError::Game(_) => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Seat;

    fn facilitator() -> Actor {
        Actor::Facilitator
    }

    #[tokio::test]
    async fn test_create_join_start() {
        let hub = MatchHub::default();
        let (creator, state) = hub
            .create_match(GameConfig::new(), "Fac".into(), facilitator())
            .await;
        assert_eq!(state.seats.malosos.hand.len(), 0);

        let mal = hub
            .join(&creator.game_id, "Attacker".into(), Actor::Seat(Seat::Malosos))
            .await
            .unwrap();
        hub.join(&creator.game_id, "Defender".into(), Actor::Seat(Seat::Buenosos))
            .await
            .unwrap();

        let started = hub.start(&creator.game_id, &mal.token).await.unwrap();
        assert_eq!(started.seats.malosos.hand.len(), 5);
        assert_eq!(started.markers.stability, 100);
    }

    #[tokio::test]
    async fn test_seat_claimed_once() {
        let hub = MatchHub::default();
        let (creator, _) = hub
            .create_match(GameConfig::new(), "Fac".into(), facilitator())
            .await;

        hub.join(&creator.game_id, "A".into(), Actor::Seat(Seat::Malosos))
            .await
            .unwrap();
        let err = hub
            .join(&creator.game_id, "B".into(), Actor::Seat(Seat::Malosos))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SEAT_TAKEN");

        // A second facilitator is fine.
        hub.join(&creator.game_id, "Obs".into(), facilitator())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_token_is_match_scoped() {
        let hub = MatchHub::default();
        let (a, _) = hub
            .create_match(GameConfig::new(), "A".into(), facilitator())
            .await;
        let (b, _) = hub
            .create_match(GameConfig::new(), "B".into(), facilitator())
            .await;

        assert!(hub.authorize(&a.game_id, &a.token).await.is_ok());
        let err = hub.authorize(&a.game_id, &b.token).await.unwrap_err();
        assert_eq!(err.code(), "NOT_AUTHORIZED");
        let err = hub.authorize(&a.game_id, "nope").await.unwrap_err();
        assert_eq!(err.code(), "NOT_AUTHORIZED");
    }

    #[tokio::test]
    async fn test_matches_are_isolated() {
        let hub = MatchHub::default();
        let (a, _) = hub
            .create_match(GameConfig::new().with_seed(1), "A".into(), facilitator())
            .await;
        let (b, _) = hub
            .create_match(GameConfig::new().with_seed(2), "B".into(), facilitator())
            .await;

        hub.start(&a.game_id, &a.token).await.unwrap();

        let state_b = hub.snapshot(&b.game_id, &b.token).await.unwrap();
        assert_eq!(state_b.seats.malosos.hand.len(), 0, "match B untouched");
    }

    #[tokio::test]
    async fn test_action_errors_carry_codes() {
        let hub = MatchHub::default();
        let (creator, _) = hub
            .create_match(GameConfig::new(), "Fac".into(), facilitator())
            .await;
        let err = hub
            .apply_action(
                &creator.game_id,
                &creator,
                IncomingMessage::AdvancePhase {},
            )
            .await
            .unwrap_err();
        // Not started yet.
        assert_eq!(err.code(), "GAME_NOT_RUNNING");
        assert_eq!(err.http_status(), 400);
    }
}
