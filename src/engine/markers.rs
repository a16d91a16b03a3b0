//! Marker calculator: per-turn stability and trust deltas derived from
//! the service roster and active temporary effects.
//!
//! Computation order mirrors the rulebook:
//! 1. base stability penalties per service, floored at −25 for the turn
//! 2. trust penalties from citizen-facing services, floored at −15
//!    (trust has its own floor and is never subject to the stability cap)
//! 3. BCP prioritization refunds, applied after the caps
//! 4. the trust-zero panic penalty, unless suppressed

use crate::core::{GameState, TempEffectKind, TemporaryEffect};
use crate::services::{Service, ServiceState};

const PENALTY_DEGRADED: i32 = -2;
const PENALTY_DOWN: i32 = -6;
/// Total base stability loss per turn never exceeds 25.
const BASE_PENALTY_FLOOR: i32 = -25;
/// Total trust loss per turn never exceeds 15.
const TRUST_PENALTY_FLOOR: i32 = -15;
const TRUST_DOWN_PENALTY: i32 = -3;
/// Extra stability loss while trust sits at zero.
const TRUST_ZERO_PANIC: i32 = -5;

/// The deltas one `CASCADE_EVAL` contributes, before clamping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerUpdate {
    pub stability_delta: i32,
    pub trust_delta: i32,
}

fn penalty(state: ServiceState) -> i32 {
    match state {
        ServiceState::Ok => 0,
        ServiceState::Degraded => PENALTY_DEGRADED,
        ServiceState::Down => PENALTY_DOWN,
    }
}

/// The state a service contributes to marker math: a manual-operation
/// workaround makes a real `DOWN` count as `DEGRADED`. The stored state
/// itself is untouched.
fn effective_state(service: &Service, effects: &[TemporaryEffect]) -> ServiceState {
    let manual_op = effects
        .iter()
        .any(|e| e.kind == TempEffectKind::ManualOp && e.targets_service(service.id));
    if manual_op && service.state == ServiceState::Down {
        ServiceState::Degraded
    } else {
        service.state
    }
}

/// Compute this turn's marker deltas from the current roster.
#[must_use]
pub fn calculate(state: &GameState) -> MarkerUpdate {
    let effects = &state.temporary_effects;

    // Base stability penalties, floored.
    let base: i32 = state
        .services
        .values()
        .map(|svc| penalty(effective_state(svc, effects)))
        .sum();
    let mut stability_delta = base.max(BASE_PENALTY_FLOOR);

    // Trust penalties from citizen-facing services, independently floored.
    let trust_raw: i32 = state
        .services
        .values()
        .filter(|svc| svc.citizen_facing)
        .filter(|svc| effective_state(svc, effects) == ServiceState::Down)
        .map(|svc| TRUST_DOWN_PENALTY * svc.trust_weight as i32)
        .sum();
    let trust_delta = trust_raw.max(TRUST_PENALTY_FLOOR);

    // BCP prioritization: half of each target's penalty is given back,
    // after the cap.
    for effect in effects {
        if effect.kind != TempEffectKind::Prioritization {
            continue;
        }
        for target in &effect.targets {
            let svc = state.service(*target);
            let pen = penalty(effective_state(svc, effects));
            stability_delta += pen.abs() / 2;
        }
    }

    // Panic: trust bottoming out costs extra stability, unless a crisis
    // communication effect is holding the line.
    let trust_after = (state.markers.trust + trust_delta).max(0);
    let panic_shielded = effects
        .iter()
        .any(|e| e.kind == TempEffectKind::TrustPanicShield);
    if trust_after == 0 && !panic_shielded {
        stability_delta += TRUST_ZERO_PANIC;
    }

    MarkerUpdate {
        stability_delta,
        trust_delta,
    }
}

/// Apply a computed update, clamping both markers to `[0, 100]`.
pub fn apply(state: &mut GameState, update: &MarkerUpdate) {
    state.markers.modify_stability(update.stability_delta);
    state.markers.modify_trust(update.trust_delta);
}
