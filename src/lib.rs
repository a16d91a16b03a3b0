//! # fenyflow
//!
//! Authoritative game server for **BuenOsos vs MalOsos**, a turn-based,
//! two-sided cyber-crisis strategy game: MalOsos runs a multi-phase attack
//! campaign against a city's 12 infrastructure services while BuenOsos
//! defends, all scored by per-turn civic-stability and citizen-trust
//! markers.
//!
//! ## Design Principles
//!
//! 1. **Single writer per match**: a match's `GameState` is owned by its
//!    engine and every action is serialized behind one lock. Actions apply
//!    atomically or reject with a typed error.
//!
//! 2. **Deterministic by configuration**: all shuffles derive from the
//!    configured seed, so identical configurations replay identically.
//!
//! 3. **Catalog-driven rules**: cards are static data (cost, requirement
//!    tags, targeting rule, tagged effect variants) interpreted by the
//!    engine, never code of their own.
//!
//! ## Modules
//!
//! - `core`: configuration, seeded RNG, the root `GameState` aggregate
//! - `services`: the 12-service board with its cyclic dependency graph
//! - `cards`: card definitions and the static M/B/E catalog
//! - `engine`: phase machine, validators, campaign tracker, cascade
//!   resolver, marker calculator
//! - `server`: REST lifecycle routes and the WebSocket action channel

pub mod cards;
pub mod core;
pub mod engine;
pub mod server;
pub mod services;

// Re-export commonly used types
pub use crate::cards::{catalog, CampaignPhase, Card, CardEffect, CardId, Targeting};
pub use crate::core::{
    Actor, GameConfig, GameRng, GameState, GameStatus, IntermittenceMode, Phase, Seat,
};
pub use crate::engine::{Game, GameError};
pub use crate::services::{Service, ServiceId, ServiceState};
