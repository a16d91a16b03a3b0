//! Game engine: the phase state machine and action validators.
//!
//! The engine owns a match's `GameState` and is its sole mutator. Every
//! public operation either fully applies or rejects with a `GameError`
//! and no state change. `ADVANCE_PHASE` chains through automatic phases
//! synchronously, so one external call can execute several phases and
//! lands on the next phase that needs player input.

use serde_json::json;

use super::campaign;
use super::cascade::{self, consume_shield};
use super::error::GameError;
use super::markers;
use super::victory;
use crate::cards::{
    catalog, Card, CardCategory, CardEffect, CardId, CardSide, EffectCondition, EffectTarget,
    Requirement, Targeting,
};
use crate::core::{
    Actor, GameConfig, GameRng, GameState, GameStatus, IntermittenceMode, Markers, Phase, Seat,
    Seats, TempEffectKind, TemporaryEffect,
};
use crate::services::{initial_services, ServiceId, ServiceState};

/// Cards dealt at match start and drawn back up to each maintenance.
const HAND_TARGET: usize = 5;
/// Hand limit enforced at maintenance.
const HAND_LIMIT: usize = 7;

/// One match's engine.
pub struct Game {
    state: GameState,
}

impl Game {
    /// Create a match in the lobby.
    #[must_use]
    pub fn create(config: GameConfig, id: impl Into<String>) -> Self {
        let (rng, seed) = match config.intermittence_mode {
            IntermittenceMode::Deterministic => (GameRng::new(config.seed), config.seed),
            IntermittenceMode::Random => GameRng::from_entropy(),
        };

        let mut seats = Seats::default();
        seats.malosos.deck = catalog().malosos_deck().to_vec();
        seats.malosos.budget_remaining = config.budget_per_turn;
        seats.buenosos.deck = catalog().buenosos_deck().to_vec();
        seats.buenosos.budget_remaining = config.budget_per_turn;

        let state = GameState {
            id: id.into(),
            status: GameStatus::Lobby,
            services: initial_services(),
            seats,
            event_deck: catalog().event_deck().to_vec(),
            event_discard: Vec::new(),
            markers: Markers {
                stability: 100,
                trust: 50,
                turn: 1,
                phase: Phase::Maintenance,
            },
            campaign: Default::default(),
            temporary_effects: Vec::new(),
            backups_verified: false,
            detection_played: false,
            services_recovered: Vec::new(),
            services_went_down: Vec::new(),
            pending_cascade: Vec::new(),
            winner: None,
            seed,
            log: im::Vector::new(),
            rng,
            config,
        };

        Self { state }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Start the match: shuffle all decks from the seed and deal 5 cards
    /// to each seat from its own deck.
    pub fn start(&mut self) -> Result<&GameState, GameError> {
        if self.state.status != GameStatus::Lobby {
            return Err(GameError::GameNotRunning);
        }

        let base = GameRng::new(self.state.seed);
        base.for_context("malosos-deck")
            .shuffle(&mut self.state.seats.malosos.deck);
        base.for_context("buenosos-deck")
            .shuffle(&mut self.state.seats.buenosos.deck);
        base.for_context("event-deck")
            .shuffle(&mut self.state.event_deck);
        // Live stream for mid-match reshuffles.
        self.state.rng = base.for_context("match");

        self.state.draw_to_hand(Seat::Malosos, HAND_TARGET);
        self.state.draw_to_hand(Seat::Buenosos, HAND_TARGET);

        self.state.status = GameStatus::Running;
        self.state.push_log("GAME_STARTED", None, json!({ "seed": self.state.seed }));
        log::info!("match {} started", self.state.id);

        Ok(&self.state)
    }

    /// Advance the phase machine.
    ///
    /// Executes the entry effects of every automatic phase crossed and
    /// returns once the machine rests on a phase requiring input (or the
    /// match ends). Callers must not assume one call advances one phase.
    pub fn advance_phase(&mut self, actor: Actor) -> Result<&GameState, GameError> {
        if self.state.status != GameStatus::Running {
            return Err(GameError::GameNotRunning);
        }
        if !may_drive_phase(actor, self.state.markers.phase) {
            return Err(GameError::NotYourTurn);
        }

        let from = self.state.markers.phase;
        loop {
            match self.state.markers.phase {
                Phase::Maintenance => {
                    self.run_maintenance();
                    self.state.markers.phase = Phase::Event;
                }
                Phase::Event => {
                    self.run_event();
                    self.state.markers.phase = Phase::MalososPrep;
                    break;
                }
                Phase::MalososPrep => {
                    self.state.markers.phase = Phase::MalososAttack;
                    break;
                }
                Phase::MalososAttack => {
                    self.state.markers.phase = Phase::BuenososResponse;
                    break;
                }
                Phase::BuenososResponse => {
                    self.state.markers.phase = Phase::CascadeEval;
                }
                Phase::CascadeEval => {
                    self.run_cascade_eval();
                    if self.state.status == GameStatus::Ended {
                        break;
                    }
                    self.state.markers.phase = Phase::TurnEnd;
                }
                Phase::TurnEnd => {
                    self.run_turn_end();
                    break;
                }
            }
        }

        self.state.push_log(
            "PHASE_ADVANCED",
            actor.seat(),
            json!({ "from": from, "to": self.state.markers.phase }),
        );
        Ok(&self.state)
    }

    /// The free once-per-turn move: reconnaissance for MalOsos, a
    /// one-shot monitoring shield for BuenOsos.
    pub fn use_basic_action(
        &mut self,
        actor: Actor,
        side: Seat,
        target: Option<ServiceId>,
    ) -> Result<&GameState, GameError> {
        if self.state.status != GameStatus::Running {
            return Err(GameError::GameNotRunning);
        }
        authorize_side(actor, side)?;
        if self.state.seats.seat(side).basic_action_used {
            return Err(GameError::ActionAlreadyUsed);
        }

        match side {
            Seat::Malosos => {
                campaign::use_basic_recon(&mut self.state.campaign);
                self.state
                    .push_log("BASIC_ACTION_RECON", Some(side), json!({}));
            }
            Seat::Buenosos => {
                let target = target.ok_or_else(|| {
                    GameError::InvalidTarget("basic monitoring requires a target service".into())
                })?;
                let expires = self.state.markers.turn + 1;
                self.state.temporary_effects.push(TemporaryEffect {
                    kind: TempEffectKind::MonitoringShield,
                    targets: smallvec::smallvec![target],
                    expires_at_turn: Some(expires),
                });
                self.state.push_log(
                    "BASIC_ACTION_MONITORING",
                    Some(side),
                    json!({ "target": target }),
                );
            }
        }
        self.state.seats.seat_mut(side).basic_action_used = true;

        Ok(&self.state)
    }

    /// Play a card. Validation order: phase/ownership, hand, requirement
    /// tags, budget, targeting — rejecting atomically on the first miss.
    pub fn play_card(
        &mut self,
        actor: Actor,
        side: Seat,
        card_id: &CardId,
        targets: &[ServiceId],
    ) -> Result<&GameState, GameError> {
        if self.state.status != GameStatus::Running {
            return Err(GameError::GameNotRunning);
        }
        authorize_side(actor, side)?;

        // 1. Ownership and phase.
        let card = catalog()
            .get(card_id)
            .ok_or_else(|| GameError::CardNotInHand(card_id.to_string()))?
            .clone();
        let seat_side = match side {
            Seat::Malosos => CardSide::Malosos,
            Seat::Buenosos => CardSide::Buenosos,
        };
        if card.side != seat_side || self.state.markers.phase.card_owner() != Some(side) {
            return Err(GameError::NotYourTurn);
        }

        // 2. The card must actually be held.
        if !self.state.seats.seat(side).hand.contains(card_id) {
            return Err(GameError::CardNotInHand(card_id.to_string()));
        }

        // 3. Requirement tags.
        self.check_requirements(&card)?;

        // 4. Budget, at the effective cost.
        let cost = self.effective_cost(&card);
        let available = self.state.seats.seat(side).budget_remaining;
        if cost > available {
            return Err(GameError::InsufficientBudget {
                needed: cost,
                available,
            });
        }

        // 5. Targeting.
        self.check_targets(&card, targets)?;

        // All checks passed; the action now applies as one step.
        let seat = self.state.seats.seat_mut(side);
        seat.budget_remaining -= cost;
        seat.remove_from_hand(card_id);
        seat.discard.push(card_id.clone());

        for effect in &card.effects {
            self.apply_effect(effect, Some(side), targets);
        }

        // Campaign-phase cards delegate to the tracker: completion may be
        // withheld (one phase per turn) while the effects above stand.
        if side == Seat::Malosos {
            if let Some(phase) = card.campaign_phase {
                campaign::complete_phase(&mut self.state.campaign, phase);
            }
        }
        if side == Seat::Buenosos && card.category == CardCategory::DetectionResponse {
            self.state.detection_played = true;
        }

        self.state.push_log(
            "CARD_PLAYED",
            Some(side),
            json!({
                "cardId": card.id,
                "cardName": card.name,
                "category": card.category,
                "targets": targets,
                "effectiveCost": cost,
            }),
        );

        if let Some(winner) = victory::immediate_winner(&self.state) {
            self.end_match(winner);
        }

        Ok(&self.state)
    }

    // === Automatic phases ===

    fn run_maintenance(&mut self) {
        let budget = self.state.config.budget_per_turn;
        for side in [Seat::Malosos, Seat::Buenosos] {
            let seat = self.state.seats.seat_mut(side);
            seat.budget_remaining = budget;
            seat.basic_action_used = false;
        }

        for side in [Seat::Malosos, Seat::Buenosos] {
            self.state.draw_to_hand(side, HAND_TARGET);
            self.state.clamp_hand(side, HAND_LIMIT);
        }

        campaign::reset_turn_state(&mut self.state.campaign);

        let turn = self.state.markers.turn;
        self.state
            .temporary_effects
            .retain(|e| e.expires_at_turn.map_or(true, |t| t > turn));

        self.state.push_log("MAINTENANCE_DONE", None, json!({}));
    }

    fn run_event(&mut self) {
        if self.state.event_deck.is_empty() {
            if self.state.event_discard.is_empty() {
                self.state.push_log("EVENT_SKIPPED", None, json!({}));
                return;
            }
            let mut reshuffled = std::mem::take(&mut self.state.event_discard);
            self.state.rng.shuffle(&mut reshuffled);
            self.state.event_deck = reshuffled;
        }

        let event_id = self.state.event_deck.pop().expect("event deck refilled above");
        let Some(card) = catalog().get(&event_id).cloned() else {
            return;
        };
        for effect in &card.effects {
            self.apply_effect(effect, None, &[]);
        }
        self.state.event_discard.push(event_id.clone());
        self.state.push_log(
            "EVENT_DRAWN",
            None,
            json!({ "cardId": event_id, "cardName": card.name }),
        );

        if let Some(winner) = victory::immediate_winner(&self.state) {
            self.end_match(winner);
        }
    }

    fn run_cascade_eval(&mut self) {
        let carried = std::mem::take(&mut self.state.pending_cascade);
        let outcome = cascade::resolve_cascades(
            &self.state.services,
            &mut self.state.temporary_effects,
            &carried,
        );
        for (id, state) in &outcome.changes {
            self.state.set_service_state(*id, *state);
        }
        self.state.pending_cascade = outcome.deferred.clone();

        let update = markers::calculate(&self.state);
        markers::apply(&mut self.state, &update);

        self.state.push_log(
            "CASCADE_EVALUATED",
            None,
            json!({
                "waves": outcome.waves,
                "changed": outcome.changes.len(),
                "deferred": outcome.deferred,
                "stabilityDelta": update.stability_delta,
                "trustDelta": update.trust_delta,
            }),
        );

        if let Some(winner) = victory::immediate_winner(&self.state) {
            self.end_match(winner);
        }
    }

    fn run_turn_end(&mut self) {
        if self.state.markers.turn >= self.state.config.turn_limit {
            let winner = victory::final_winner(&self.state);
            self.end_match(winner);
            return;
        }
        let new_turn = self.state.markers.turn + 1;
        self.state.push_log("TURN_ENDED", None, json!({ "newTurn": new_turn }));
        self.state.markers.turn = new_turn;
        self.state.markers.phase = Phase::Maintenance;
    }

    fn end_match(&mut self, winner: Seat) {
        if self.state.status == GameStatus::Ended {
            return;
        }
        self.state.status = GameStatus::Ended;
        self.state.winner = Some(winner);
        self.state
            .push_log("MATCH_ENDED", None, json!({ "winner": winner }));
        log::info!("match {} ended, winner {}", self.state.id, winner);
    }

    // === Validation helpers ===

    fn check_requirements(&self, card: &Card) -> Result<(), GameError> {
        for requirement in &card.requirements {
            match requirement {
                Requirement::Campaign(phase) => {
                    if !campaign::phase_satisfied(&self.state.campaign, *phase) {
                        return Err(GameError::CardRequirementsNotMet(format!(
                            "campaign phase {phase:?} not completed"
                        )));
                    }
                }
                Requirement::BackupsVerified => {
                    if !self.state.backups_verified {
                        return Err(GameError::CardRequirementsNotMet(
                            "backups not verified".into(),
                        ));
                    }
                }
                Requirement::PrevDetection => {
                    if !self.state.detection_played {
                        return Err(GameError::CardRequirementsNotMet(
                            "no detection/response card played yet".into(),
                        ));
                    }
                }
                Requirement::ServicesDegraded(n) => {
                    let affected = self
                        .state
                        .services
                        .values()
                        .filter(|s| s.state != ServiceState::Ok)
                        .count() as u32;
                    if affected < *n {
                        return Err(GameError::CardRequirementsNotMet(format!(
                            "requires {n} services degraded or worse"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn effective_cost(&self, card: &Card) -> u32 {
        let mut cost = card.cost;
        if card.category == CardCategory::Drp {
            let reduction: u32 = self
                .state
                .temporary_effects
                .iter()
                .filter_map(|e| match e.kind {
                    TempEffectKind::DrpCostReduction { amount } => Some(amount),
                    _ => None,
                })
                .sum();
            cost = cost.saturating_sub(reduction).max(1);
        }
        if card.category == CardCategory::DetectionResponse {
            let increase: u32 = self
                .state
                .temporary_effects
                .iter()
                .filter_map(|e| match e.kind {
                    TempEffectKind::DetectionCostIncrease { amount } => Some(amount),
                    _ => None,
                })
                .sum();
            cost += increase;
        }
        cost
    }

    fn check_targets(&self, card: &Card, targets: &[ServiceId]) -> Result<(), GameError> {
        match card.targeting {
            Targeting::None => {
                if !targets.is_empty() {
                    return Err(GameError::InvalidTarget("card takes no targets".into()));
                }
            }
            Targeting::AnyService => {
                if targets.len() != 1 {
                    return Err(GameError::InvalidTarget(
                        "card requires exactly one target service".into(),
                    ));
                }
            }
            Targeting::Fixed(expected) => {
                // The board position is printed on the card; callers may
                // repeat it or omit it.
                if !(targets.is_empty() || targets == [expected]) {
                    return Err(GameError::InvalidTarget(format!(
                        "card always targets {expected}"
                    )));
                }
            }
            Targeting::CitizenFacingOnly => {
                if targets.len() != 1 || !self.state.service(targets[0]).citizen_facing {
                    return Err(GameError::InvalidTarget(
                        "card requires one citizen-facing service".into(),
                    ));
                }
            }
            Targeting::DownOnly => {
                if targets.len() != 1
                    || self.state.service(targets[0]).state != ServiceState::Down
                {
                    return Err(GameError::InvalidTarget(
                        "card requires one DOWN service".into(),
                    ));
                }
            }
            Targeting::Pair => {
                if targets.len() != 2 || targets[0] == targets[1] {
                    return Err(GameError::InvalidTarget(
                        "card requires two distinct target services".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    // === Effect application (validated, cannot fail) ===

    fn apply_effect(&mut self, effect: &CardEffect, actor: Option<Seat>, targets: &[ServiceId]) {
        match effect {
            CardEffect::Degrade { target } => {
                for id in resolve_targets(*target, targets) {
                    if consume_shield(&mut self.state.temporary_effects, id) {
                        continue;
                    }
                    let next = self.state.service(id).state.degraded_once();
                    self.state.set_service_state(id, next);
                }
            }
            CardEffect::TakeDown { target } => {
                for id in resolve_targets(*target, targets) {
                    // A shield soaks one severity step off the takedown.
                    let next = if consume_shield(&mut self.state.temporary_effects, id) {
                        self.state.service(id).state.degraded_once()
                    } else {
                        ServiceState::Down
                    };
                    self.state.set_service_state(id, next);
                }
            }
            CardEffect::Restore { target } => {
                for id in resolve_targets(*target, targets) {
                    let next = self.state.service(id).state.restored_once();
                    self.state.set_service_state(id, next);
                }
            }
            CardEffect::ModifyStability { amount } => {
                self.state.markers.modify_stability(*amount);
            }
            CardEffect::ModifyTrust { amount } => {
                self.state.markers.modify_trust(*amount);
            }
            CardEffect::Grant { kind, turns } => {
                let expires = self.state.markers.turn + turns;
                self.state.temporary_effects.push(TemporaryEffect {
                    kind: kind.clone(),
                    targets: targets.iter().copied().collect(),
                    expires_at_turn: Some(expires),
                });
            }
            CardEffect::VerifyBackups => {
                self.state.backups_verified = true;
            }
            CardEffect::RollbackCampaign { choices } => {
                campaign::rollback_phase(&mut self.state.campaign, choices);
            }
            CardEffect::DiscardOpponent { count } => {
                if let Some(actor) = actor {
                    self.discard_opponent_cards(actor.opponent(), *count);
                }
            }
            CardEffect::Conditional { condition, effects } => {
                if self.condition_holds(*condition) {
                    for nested in effects {
                        self.apply_effect(nested, actor, targets);
                    }
                }
            }
        }
    }

    fn condition_holds(&self, condition: EffectCondition) -> bool {
        match condition {
            EffectCondition::ServiceNotOk(id) => {
                self.state.service(id).state != ServiceState::Ok
            }
            EffectCondition::TurnAtLeast(turn) => self.state.markers.turn >= turn,
        }
    }

    /// Opponent discards their most expensive cards.
    fn discard_opponent_cards(&mut self, victim: Seat, count: usize) {
        for _ in 0..count {
            let seat = self.state.seats.seat(victim);
            let most_expensive = seat
                .hand
                .iter()
                .max_by_key(|id| catalog().get(id).map_or(0, |c| c.cost))
                .cloned();
            let Some(card) = most_expensive else { break };
            let seat = self.state.seats.seat_mut(victim);
            seat.remove_from_hand(&card);
            seat.discard.push(card);
        }
    }
}

/// Phase authority for `ADVANCE_PHASE`: the facilitator drives anything,
/// seats drive their own phases, and anyone may kick an automatic phase.
fn may_drive_phase(actor: Actor, phase: Phase) -> bool {
    match actor {
        Actor::Facilitator => true,
        Actor::Seat(seat) => match phase.card_owner() {
            Some(owner) => owner == seat,
            None => true,
        },
    }
}

fn authorize_side(actor: Actor, side: Seat) -> Result<(), GameError> {
    match actor {
        Actor::Facilitator => Ok(()),
        Actor::Seat(seat) if seat == side => Ok(()),
        Actor::Seat(_) => Err(GameError::NotAuthorized(
            "cannot act for the other seat".into(),
        )),
    }
}

fn resolve_targets(target: EffectTarget, chosen: &[ServiceId]) -> Vec<ServiceId> {
    match target {
        EffectTarget::Chosen => chosen.to_vec(),
        EffectTarget::Fixed(id) => vec![id],
    }
}
