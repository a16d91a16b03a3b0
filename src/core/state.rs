//! Root game state: the single mutable aggregate per match.
//!
//! The engine is the sole mutator. Everything here is plain data with
//! small bookkeeping helpers (hand/deck movement, marker clamping); the
//! rules that decide *when* these helpers run live in `crate::engine`.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use super::config::GameConfig;
use super::rng::GameRng;
use crate::cards::{CampaignPhase, CardId};
use crate::services::{Service, ServiceId, ServiceState};

/// One of the two competing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Seat {
    Malosos,
    Buenosos,
}

impl Seat {
    /// The opposing seat.
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Seat::Malosos => Seat::Buenosos,
            Seat::Buenosos => Seat::Malosos,
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Seat::Malosos => "MALOSOS",
            Seat::Buenosos => "BUENOSOS",
        }
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is performing an action: a seated player or the out-of-band
/// facilitator, who can drive phases but never plays cards.
///
/// Wire form is a bare string: `"MALOSOS"`, `"BUENOSOS"` or
/// `"FACILITATOR"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    Seat(Seat),
    Facilitator,
}

impl Actor {
    /// The seat behind this actor, if any.
    #[must_use]
    pub fn seat(self) -> Option<Seat> {
        match self {
            Actor::Seat(seat) => Some(seat),
            Actor::Facilitator => None,
        }
    }

    /// Parse the wire form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MALOSOS" => Some(Actor::Seat(Seat::Malosos)),
            "BUENOSOS" => Some(Actor::Seat(Seat::Buenosos)),
            "FACILITATOR" => Some(Actor::Facilitator),
            _ => None,
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Actor::Seat(seat) => seat.as_str(),
            Actor::Facilitator => "FACILITATOR",
        }
    }
}

impl Serialize for Actor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Actor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Actor::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown actor '{s}'")))
    }
}

/// Match lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Lobby,
    Running,
    Ended,
}

/// Per-turn phases, in fixed order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Maintenance,
    Event,
    MalososPrep,
    MalososAttack,
    BuenososResponse,
    CascadeEval,
    TurnEnd,
}

impl Phase {
    /// Phases that execute their effects the moment they are entered,
    /// without waiting for player input.
    #[must_use]
    pub fn is_automatic(self) -> bool {
        matches!(
            self,
            Phase::Maintenance | Phase::Event | Phase::CascadeEval | Phase::TurnEnd
        )
    }

    /// The seat allowed to play cards in this phase, if any.
    #[must_use]
    pub fn card_owner(self) -> Option<Seat> {
        match self {
            Phase::MalososPrep | Phase::MalososAttack => Some(Seat::Malosos),
            Phase::BuenososResponse => Some(Seat::Buenosos),
            _ => None,
        }
    }
}

/// Turn markers: the civic-stability and citizen-trust meters plus the
/// turn/phase cursor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Markers {
    pub stability: i32,
    pub trust: i32,
    pub turn: u32,
    pub phase: Phase,
}

impl Markers {
    /// Apply a stability delta, clamping to `[0, 100]`.
    pub fn modify_stability(&mut self, delta: i32) {
        self.stability = (self.stability + delta).clamp(0, 100);
    }

    /// Apply a trust delta, clamping to `[0, 100]`.
    pub fn modify_trust(&mut self, delta: i32) {
        self.trust = (self.trust + delta).clamp(0, 100);
    }
}

/// One seat's cards and per-turn allowances.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatState {
    pub hand: Vec<CardId>,
    /// Remaining draw pile, top at the end.
    pub deck: Vec<CardId>,
    pub discard: Vec<CardId>,
    pub budget_remaining: u32,
    pub basic_action_used: bool,
}

impl SeatState {
    /// Remove a card from the hand. Returns false if it was not held.
    pub fn remove_from_hand(&mut self, card: &CardId) -> bool {
        if let Some(pos) = self.hand.iter().position(|c| c == card) {
            self.hand.remove(pos);
            true
        } else {
            false
        }
    }
}

/// Both seats.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Seats {
    #[serde(rename = "MALOSOS")]
    pub malosos: SeatState,
    #[serde(rename = "BUENOSOS")]
    pub buenosos: SeatState,
}

impl Seats {
    /// Get a seat's state.
    #[must_use]
    pub fn seat(&self, seat: Seat) -> &SeatState {
        match seat {
            Seat::Malosos => &self.malosos,
            Seat::Buenosos => &self.buenosos,
        }
    }

    /// Get a seat's state mutably.
    pub fn seat_mut(&mut self, seat: Seat) -> &mut SeatState {
        match seat {
            Seat::Malosos => &mut self.malosos,
            Seat::Buenosos => &mut self.buenosos,
        }
    }
}

/// MalOsos's campaign progress. Owned by the campaign tracker.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignState {
    pub completed_phases: Vec<CampaignPhase>,
    /// Basic recon used this turn; satisfies RECON requirements without
    /// permanently completing the phase.
    pub recon_this_turn: bool,
    /// 0 or 1: the anti-rush-down guard.
    pub phases_completed_this_turn: u32,
}

/// What a temporary effect does while it is active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TempEffectKind {
    /// One-shot shield: absorbs the next degradation step on its target.
    MonitoringShield,
    /// BCP manual operation: the target counts as `DEGRADED` instead of
    /// `DOWN` in marker calculations only.
    ManualOp,
    /// BCP prioritization: half of the two targets' stability penalty is
    /// added back after the cap.
    Prioritization,
    /// DRP cards cost `amount` less this turn (floor 1).
    DrpCostReduction { amount: u32 },
    /// Detection/Response cards cost `amount` more this turn.
    DetectionCostIncrease { amount: u32 },
    /// Suppresses the trust-zero stability panic penalty.
    TrustPanicShield,
}

/// A temporary effect created by a card or basic action, purged at turn
/// boundaries once expired.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryEffect {
    pub kind: TempEffectKind,
    /// Bound services: one for shields/manual op, two for prioritization,
    /// none for global modifiers.
    pub targets: SmallVec<[ServiceId; 2]>,
    /// Purged at the first `MAINTENANCE` where `turn >= expires_at_turn`.
    pub expires_at_turn: Option<u32>,
}

impl TemporaryEffect {
    /// Does this effect bind the given service?
    #[must_use]
    pub fn targets_service(&self, id: ServiceId) -> bool {
        self.targets.contains(&id)
    }
}

/// One line of the match's action log.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub turn: u32,
    pub phase: Phase,
    pub action: String,
    pub actor: Option<Seat>,
    pub details: serde_json::Value,
}

/// Complete state of one match.
///
/// Created at match creation, mutated exclusively by the engine in
/// response to validated actions, frozen once `status` is `Ended`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: String,
    pub status: GameStatus,
    pub config: GameConfig,
    pub services: BTreeMap<ServiceId, Service>,
    pub seats: Seats,
    pub event_deck: Vec<CardId>,
    pub event_discard: Vec<CardId>,
    pub markers: Markers,
    pub campaign: CampaignState,
    pub temporary_effects: Vec<TemporaryEffect>,
    /// Set only by the backup-verification card; gates DRP recovery.
    pub backups_verified: bool,
    /// BuenOsos has played at least one Detection/Response card.
    pub detection_played: bool,
    /// Services that came back from `DOWN`.
    pub services_recovered: Vec<ServiceId>,
    /// Services that ever reached `DOWN`.
    pub services_went_down: Vec<ServiceId>,
    /// Cascade triggers deferred by the wave cap, re-fed next turn.
    pub pending_cascade: Vec<ServiceId>,
    pub winner: Option<Seat>,
    /// Seed actually used for shuffles (records the entropy draw in
    /// random mode).
    pub seed: u64,
    pub log: Vector<LogEntry>,
    #[serde(skip, default)]
    pub(crate) rng: GameRng,
}

impl GameState {
    /// Get a service.
    #[must_use]
    pub fn service(&self, id: ServiceId) -> &Service {
        &self.services[&id]
    }

    /// Get a service mutably.
    pub fn service_mut(&mut self, id: ServiceId) -> &mut Service {
        self.services.get_mut(&id).expect("roster always holds all 12 services")
    }

    /// Set a service's state, tracking DOWN transitions and recoveries.
    pub fn set_service_state(&mut self, id: ServiceId, new_state: ServiceState) {
        let old = self.service(id).state;
        if old == new_state {
            return;
        }
        self.service_mut(id).state = new_state;

        if new_state == ServiceState::Down && !self.services_went_down.contains(&id) {
            self.services_went_down.push(id);
        }
        if old == ServiceState::Down
            && new_state != ServiceState::Down
            && self.services_went_down.contains(&id)
            && !self.services_recovered.contains(&id)
        {
            self.services_recovered.push(id);
        }
    }

    /// Draw from a seat's deck until its hand holds `target` cards,
    /// reshuffling the discard into the deck when the deck runs dry.
    /// Stops early once both piles are empty.
    pub fn draw_to_hand(&mut self, seat: Seat, target: usize) {
        while self.seats.seat(seat).hand.len() < target {
            if self.seats.seat(seat).deck.is_empty() {
                if self.seats.seat(seat).discard.is_empty() {
                    break;
                }
                let mut reshuffled = std::mem::take(&mut self.seats.seat_mut(seat).discard);
                self.rng.shuffle(&mut reshuffled);
                self.seats.seat_mut(seat).deck = reshuffled;
            }
            let card = self
                .seats
                .seat_mut(seat)
                .deck
                .pop()
                .expect("deck refilled above");
            self.seats.seat_mut(seat).hand.push(card);
        }
    }

    /// Discard cards beyond the hand limit, oldest draws last.
    pub fn clamp_hand(&mut self, seat: Seat, max: usize) {
        let seat = self.seats.seat_mut(seat);
        while seat.hand.len() > max {
            let excess = seat.hand.pop().expect("hand larger than max");
            seat.discard.push(excess);
        }
    }

    /// Append a log entry at the current turn/phase cursor.
    pub fn push_log(&mut self, action: &str, actor: Option<Seat>, details: serde_json::Value) {
        self.log.push_back(LogEntry {
            turn: self.markers.turn,
            phase: self.markers.phase,
            action: action.to_string(),
            actor,
            details,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state() -> GameState {
        GameState {
            id: "test".to_string(),
            status: GameStatus::Lobby,
            config: GameConfig::new(),
            services: crate::services::initial_services(),
            seats: Seats::default(),
            event_deck: Vec::new(),
            event_discard: Vec::new(),
            markers: Markers {
                stability: 100,
                trust: 50,
                turn: 1,
                phase: Phase::Maintenance,
            },
            campaign: CampaignState::default(),
            temporary_effects: Vec::new(),
            backups_verified: false,
            detection_played: false,
            services_recovered: Vec::new(),
            services_went_down: Vec::new(),
            pending_cascade: Vec::new(),
            winner: None,
            seed: 0,
            log: Vector::new(),
            rng: GameRng::new(0),
        }
    }

    #[test]
    fn test_marker_clamping() {
        let mut markers = Markers {
            stability: 10,
            trust: 95,
            turn: 1,
            phase: Phase::Maintenance,
        };

        markers.modify_stability(-40);
        assert_eq!(markers.stability, 0);

        markers.modify_trust(20);
        assert_eq!(markers.trust, 100);
    }

    #[test]
    fn test_down_and_recovery_tracking() {
        let mut state = empty_state();

        state.set_service_state(ServiceId::S5, ServiceState::Down);
        assert_eq!(state.services_went_down, vec![ServiceId::S5]);
        assert!(state.services_recovered.is_empty());

        state.set_service_state(ServiceId::S5, ServiceState::Degraded);
        assert_eq!(state.services_recovered, vec![ServiceId::S5]);

        // Going down again does not double-count.
        state.set_service_state(ServiceId::S5, ServiceState::Down);
        assert_eq!(state.services_went_down, vec![ServiceId::S5]);
    }

    #[test]
    fn test_draw_reshuffles_discard() {
        let mut state = empty_state();
        state.seats.malosos.discard = vec![CardId::new("M01"), CardId::new("M02")];

        state.draw_to_hand(Seat::Malosos, 2);

        assert_eq!(state.seats.malosos.hand.len(), 2);
        assert!(state.seats.malosos.discard.is_empty());
    }

    #[test]
    fn test_draw_stops_when_both_piles_empty() {
        let mut state = empty_state();
        state.seats.buenosos.deck = vec![CardId::new("B01")];

        state.draw_to_hand(Seat::Buenosos, 5);

        assert_eq!(state.seats.buenosos.hand.len(), 1);
    }

    #[test]
    fn test_clamp_hand() {
        let mut state = empty_state();
        state.seats.malosos.hand = (1..=9).map(|i| CardId::new(format!("M{i:02}"))).collect();

        state.clamp_hand(Seat::Malosos, 7);

        assert_eq!(state.seats.malosos.hand.len(), 7);
        assert_eq!(state.seats.malosos.discard.len(), 2);
    }

    #[test]
    fn test_phase_ownership() {
        assert_eq!(Phase::MalososAttack.card_owner(), Some(Seat::Malosos));
        assert_eq!(Phase::BuenososResponse.card_owner(), Some(Seat::Buenosos));
        assert_eq!(Phase::Maintenance.card_owner(), None);
        assert!(Phase::CascadeEval.is_automatic());
        assert!(!Phase::MalososPrep.is_automatic());
    }

    #[test]
    fn test_snapshot_serializes_without_rng() {
        let state = empty_state();
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("rng").is_none());
        assert_eq!(json["markers"]["stability"], 100);
        assert_eq!(json["status"], "lobby");
    }
}
