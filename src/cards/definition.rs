//! Card definitions - static card data.
//!
//! A `Card` holds the immutable properties of a playable card: cost,
//! prerequisite tags, targeting rule and the effects it applies. Cards are
//! owned by the catalog; game state only ever references them by id.

use serde::{Deserialize, Serialize};

use crate::core::TempEffectKind;
use crate::services::ServiceId;

/// Identifier of a card in one of the three deck namespaces:
/// `M*` (MalOsos), `B*` (BuenOsos), `E*` (events).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Create a card id from its wire form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Wire representation, e.g. `"M01"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The deck namespace this id belongs to, from its prefix.
    #[must_use]
    pub fn side(&self) -> Option<CardSide> {
        match self.0.chars().next() {
            Some('M') => Some(CardSide::Malosos),
            Some('B') => Some(CardSide::Buenosos),
            Some('E') => Some(CardSide::Event),
            _ => None,
        }
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Which deck a card belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardSide {
    Malosos,
    Buenosos,
    Event,
}

/// Thematic category. Detection/Response and DRP matter mechanically
/// (cost modifiers, prerequisite tags); the rest are flavor grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardCategory {
    Recon,
    Access,
    Persistence,
    LateralMovement,
    Impact,
    Social,
    Prevention,
    DetectionResponse,
    Drp,
    Bcp,
    Event,
}

/// A milestone in MalOsos's multi-step attack campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignPhase {
    Recon,
    Access,
    Persistence,
    LateralMovement,
    Impact,
}

/// What a card's `targets` argument must look like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Targeting {
    /// No targets.
    None,
    /// Exactly one service, any state.
    AnyService,
    /// The card always operates on this service; callers may pass it
    /// explicitly or pass no targets at all.
    Fixed(ServiceId),
    /// Exactly one citizen-facing service.
    CitizenFacingOnly,
    /// Exactly one service currently `DOWN`.
    DownOnly,
    /// Exactly two distinct services.
    Pair,
}

/// A prerequisite tag that must be satisfied by current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// The named campaign phase must be completed. `RECON` is also
    /// satisfied by this turn's basic recon action.
    Campaign(CampaignPhase),
    /// `backupsVerified` must be set (by the backup-verification card).
    BackupsVerified,
    /// BuenOsos must have played a Detection/Response card earlier.
    PrevDetection,
    /// At least this many services in `DEGRADED` or worse.
    ServicesDegraded(u32),
}

/// Condition guarding a [`CardEffect::Conditional`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectCondition {
    /// The service is `DEGRADED` or worse.
    ServiceNotOk(ServiceId),
    /// The turn counter has reached this value.
    TurnAtLeast(u32),
}

/// Where an effect lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    /// Every service the player chose for this play (one for single-target
    /// cards, both for `Pair` cards).
    Chosen,
    /// A service baked into the card.
    Fixed(ServiceId),
}

/// An atomic card effect.
///
/// One variant per effect family: service-state mutators, marker mutators,
/// temporary-effect creators, campaign bookkeeping, hand attacks, and a
/// conditional wrapper. Campaign *advancement* is deliberately not an
/// effect: it is a card-level tag handled by the campaign tracker, so that
/// the one-phase-per-turn guard can withhold it while these effects still
/// land.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEffect {
    /// Step the target one severity step worse.
    Degrade { target: EffectTarget },
    /// Force the target all the way to `DOWN`.
    TakeDown { target: EffectTarget },
    /// Step the target one severity step better.
    Restore { target: EffectTarget },
    /// Direct stability nudge (clamped to `[0, 100]` on apply).
    ModifyStability { amount: i32 },
    /// Direct trust nudge (clamped to `[0, 100]` on apply).
    ModifyTrust { amount: i32 },
    /// Create a temporary effect bound to the chosen targets, expiring
    /// after `turns` full turns.
    Grant { kind: TempEffectKind, turns: u32 },
    /// Mark backups as verified, unlocking DRP recovery cards.
    VerifyBackups,
    /// Remove the first completed campaign phase found among `choices`.
    RollbackCampaign { choices: Vec<CampaignPhase> },
    /// Opponent discards their highest-cost cards.
    DiscardOpponent { count: usize },
    /// Apply the nested effects only while the condition holds.
    Conditional {
        condition: EffectCondition,
        effects: Vec<CardEffect>,
    },
}

/// Static card definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub side: CardSide,
    pub category: CardCategory,
    pub cost: u32,
    pub requirements: Vec<Requirement>,
    pub targeting: Targeting,
    /// Set on campaign-phase cards; playing one delegates phase completion
    /// to the campaign tracker.
    pub campaign_phase: Option<CampaignPhase>,
    pub effects: Vec<CardEffect>,
}

impl Card {
    /// Create a new card definition.
    #[must_use]
    pub fn new(
        id: &str,
        name: &str,
        side: CardSide,
        category: CardCategory,
        cost: u32,
    ) -> Self {
        Self {
            id: CardId::new(id),
            name: name.to_string(),
            side,
            category,
            cost,
            requirements: Vec::new(),
            targeting: Targeting::None,
            campaign_phase: None,
            effects: Vec::new(),
        }
    }

    /// Set the targeting rule (builder pattern).
    #[must_use]
    pub fn with_targeting(mut self, targeting: Targeting) -> Self {
        self.targeting = targeting;
        self
    }

    /// Add a prerequisite tag.
    #[must_use]
    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Tag this card as completing a campaign phase.
    #[must_use]
    pub fn advances(mut self, phase: CampaignPhase) -> Self {
        self.campaign_phase = Some(phase);
        self
    }

    /// Add an effect.
    #[must_use]
    pub fn with_effect(mut self, effect: CardEffect) -> Self {
        self.effects.push(effect);
        self
    }
}
