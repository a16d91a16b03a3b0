//! Engine error taxonomy.
//!
//! Every validation failure is surfaced to the caller with a stable wire
//! code; nothing is silently swallowed. Rejections are atomic: a failed
//! action leaves the state untouched.
//!
//! Two outcomes are deliberately NOT errors: a second campaign-phase card
//! in one turn (its side effects land, phase completion is withheld) and
//! cascade deferral at the wave cap (the remainder carries to next turn).

use thiserror::Error;

/// A rejected action, with the wire code the transport layer reports.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Action attempted outside the acting seat's authorized phase.
    #[error("action not allowed for this seat in the current phase")]
    NotYourTurn,

    /// Basic action repeated within the same turn.
    #[error("basic action already used this turn")]
    ActionAlreadyUsed,

    /// Referenced card id not currently held by the seat.
    #[error("card '{0}' is not in hand")]
    CardNotInHand(String),

    /// An unmet prerequisite tag.
    #[error("card requirements not met: {0}")]
    CardRequirementsNotMet(String),

    /// Cost exceeds the seat's remaining per-turn budget.
    #[error("not enough budget: needs {needed}, has {available}")]
    InsufficientBudget { needed: u32, available: u32 },

    /// Target count or kind mismatches the card's targeting rule.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The match is not in the lifecycle state the action requires.
    #[error("game is not running")]
    GameNotRunning,

    /// Token does not authorize this action.
    #[error("not authorized: {0}")]
    NotAuthorized(String),
}

impl GameError {
    /// Stable wire code, as reported in REST bodies and WS error frames.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::ActionAlreadyUsed => "ACTION_ALREADY_USED",
            GameError::CardNotInHand(_) => "CARD_NOT_IN_HAND",
            GameError::CardRequirementsNotMet(_) => "CARD_REQUIREMENTS_NOT_MET",
            GameError::InsufficientBudget { .. } => "INSUFFICIENT_BUDGET",
            GameError::InvalidTarget(_) => "INVALID_TARGET",
            GameError::GameNotRunning => "GAME_NOT_RUNNING",
            GameError::NotAuthorized(_) => "NOT_AUTHORIZED",
        }
    }
}
