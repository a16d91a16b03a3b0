//! Core types: configuration, deterministic RNG, and the root game state.

pub mod config;
pub mod rng;
pub mod state;

pub use config::{GameConfig, IntermittenceMode};
pub use rng::GameRng;
pub use state::{
    Actor, CampaignState, GameState, GameStatus, LogEntry, Markers, Phase, Seat, SeatState,
    Seats, TempEffectKind, TemporaryEffect,
};
