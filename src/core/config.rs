//! Match configuration.
//!
//! A match is configured once at creation time. Everything the engine
//! randomizes (deck order) derives from `seed`, so two matches created
//! with the same configuration play out identically under the same
//! action sequence when `intermittence_mode` is deterministic.

use serde::{Deserialize, Serialize};

/// How the engine seeds its random streams.
///
/// The engine itself is fully deterministic given a seed; this mode only
/// decides where that seed comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntermittenceMode {
    /// All shuffles derive from `GameConfig::seed`. Same configuration,
    /// same decks.
    #[default]
    Deterministic,
    /// A fresh seed is drawn from OS entropy at match start and recorded
    /// on the state, so a finished match can still be replayed.
    Random,
}

/// Configuration for a single match.
///
/// ## Example
///
/// ```
/// use fenyflow::core::GameConfig;
///
/// let config = GameConfig::new()
///     .with_turn_limit(4)
///     .with_budget_per_turn(2);
///
/// assert_eq!(config.turn_limit, 4);
/// assert_eq!(config.budget_per_turn, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    /// Last playable turn. The match ends after this turn's `TURN_END`.
    pub turn_limit: u32,

    /// Per-seat spending allowance, reset every `MAINTENANCE`.
    pub budget_per_turn: u32,

    /// Seeding mode for the engine's random streams.
    pub intermittence_mode: IntermittenceMode,

    /// Board identifier. Only `"standard"` is defined.
    pub map_id: String,

    /// Seed for deterministic shuffles. Ignored in `Random` mode.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            turn_limit: 8,
            budget_per_turn: 8,
            intermittence_mode: IntermittenceMode::default(),
            map_id: "standard".to_string(),
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Create a configuration with the standard defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the turn limit.
    #[must_use]
    pub fn with_turn_limit(mut self, turns: u32) -> Self {
        self.turn_limit = turns;
        self
    }

    /// Set the per-turn budget.
    #[must_use]
    pub fn with_budget_per_turn(mut self, budget: u32) -> Self {
        self.budget_per_turn = budget;
        self
    }

    /// Set the intermittence mode.
    #[must_use]
    pub fn with_intermittence_mode(mut self, mode: IntermittenceMode) -> Self {
        self.intermittence_mode = mode;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::new();
        assert_eq!(config.turn_limit, 8);
        assert_eq!(config.budget_per_turn, 8);
        assert_eq!(config.intermittence_mode, IntermittenceMode::Deterministic);
        assert_eq!(config.map_id, "standard");
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_builder() {
        let config = GameConfig::new()
            .with_turn_limit(4)
            .with_budget_per_turn(2)
            .with_seed(42);

        assert_eq!(config.turn_limit, 4);
        assert_eq!(config.budget_per_turn, 2);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"budgetPerTurn": 2}"#).unwrap();
        assert_eq!(config.budget_per_turn, 2);
        assert_eq!(config.turn_limit, 8);
        assert_eq!(config.map_id, "standard");
    }

    #[test]
    fn test_mode_wire_format() {
        let json = serde_json::to_string(&IntermittenceMode::Deterministic).unwrap();
        assert_eq!(json, r#""deterministic""#);
    }
}
