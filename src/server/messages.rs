//! Wire shapes for the real-time action channel.
//!
//! On connect the server pushes the current snapshot; the client answers
//! with action messages; the server broadcasts updated snapshots to the
//! room or answers the sender with an error frame.

use serde::{Deserialize, Serialize};

use crate::core::{GameState, Seat};

/// Client → server action messages.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum IncomingMessage {
    #[serde(rename = "ADVANCE_PHASE")]
    AdvancePhase {},
    #[serde(rename = "USE_BASIC_ACTION")]
    UseBasicAction {
        side: Seat,
        #[serde(default)]
        target: Option<String>,
    },
    #[serde(rename = "PLAY_CARD")]
    #[serde(rename_all = "camelCase")]
    PlayCard {
        side: Seat,
        card_id: String,
        #[serde(default)]
        targets: Vec<String>,
    },
}

/// Server → client frames.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    #[serde(rename = "GAME_STATE")]
    GameState { state: Box<GameState> },
    #[serde(rename = "ERROR")]
    Error { code: String, message: String },
}

impl OutgoingMessage {
    /// Snapshot frame for broadcast.
    #[must_use]
    pub fn snapshot(state: &GameState) -> Self {
        OutgoingMessage::GameState {
            state: Box::new(state.clone()),
        }
    }

    /// Error frame from an engine or hub rejection.
    #[must_use]
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        OutgoingMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Serialize for the socket. Message shapes always serialize.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("wire messages always serialize")
    }
}
