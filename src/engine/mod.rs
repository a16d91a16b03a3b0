//! The authoritative game engine: phase machine, validators, campaign
//! tracker, cascade resolver, marker calculator and victory evaluation.

pub mod campaign;
pub mod cascade;
pub mod error;
pub mod game;
pub mod markers;
pub mod victory;

pub use cascade::{CascadeOutcome, MAX_WAVES};
pub use error::GameError;
pub use game::Game;
pub use markers::MarkerUpdate;
