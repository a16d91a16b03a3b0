//! Campaign tracker: MalOsos's multi-phase attack progress.
//!
//! The tracker's one job is the anti-rush-down guard: no matter how many
//! campaign cards are played, at most one campaign phase becomes
//! permanently completed per turn. The guard is a silent no-op, not an
//! error — the calling card's other effects still land.

use crate::cards::CampaignPhase;
use crate::core::CampaignState;

/// Record a phase as permanently completed.
///
/// No-ops (without error) when the phase is already recorded or when a
/// phase was already completed this turn.
pub fn complete_phase(campaign: &mut CampaignState, phase: CampaignPhase) {
    if campaign.completed_phases.contains(&phase) {
        return;
    }
    if campaign.phases_completed_this_turn >= 1 {
        return;
    }
    campaign.completed_phases.push(phase);
    campaign.phases_completed_this_turn = 1;
}

/// Remove the first completed phase found among `choices`.
///
/// Used by defender eradication cards. Does nothing if none of the
/// choices is completed.
pub fn rollback_phase(campaign: &mut CampaignState, choices: &[CampaignPhase]) {
    for phase in choices {
        if let Some(pos) = campaign.completed_phases.iter().position(|p| p == phase) {
            campaign.completed_phases.remove(pos);
            return;
        }
    }
}

/// Mark basic recon as used for this turn only.
pub fn use_basic_recon(campaign: &mut CampaignState) {
    campaign.recon_this_turn = true;
}

/// Is a campaign-phase requirement satisfied?
///
/// A completed phase always satisfies it; `RECON` is additionally
/// satisfied by this turn's basic recon action.
#[must_use]
pub fn phase_satisfied(campaign: &CampaignState, phase: CampaignPhase) -> bool {
    campaign.completed_phases.contains(&phase)
        || (phase == CampaignPhase::Recon && campaign.recon_this_turn)
}

/// Clear per-turn flags. Called at the start of every `MAINTENANCE`.
pub fn reset_turn_state(campaign: &mut CampaignState) {
    campaign.recon_this_turn = false;
    campaign.phases_completed_this_turn = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_one_phase_per_turn() {
        let mut campaign = CampaignState::default();

        complete_phase(&mut campaign, CampaignPhase::Recon);
        assert_eq!(campaign.completed_phases, vec![CampaignPhase::Recon]);
        assert_eq!(campaign.phases_completed_this_turn, 1);

        // Second completion in the same turn is withheld.
        complete_phase(&mut campaign, CampaignPhase::Access);
        assert_eq!(campaign.completed_phases, vec![CampaignPhase::Recon]);
        assert_eq!(campaign.phases_completed_this_turn, 1);

        // Next turn it goes through.
        reset_turn_state(&mut campaign);
        complete_phase(&mut campaign, CampaignPhase::Access);
        assert_eq!(
            campaign.completed_phases,
            vec![CampaignPhase::Recon, CampaignPhase::Access]
        );
    }

    #[test]
    fn test_duplicate_phase_is_ignored() {
        let mut campaign = CampaignState::default();

        complete_phase(&mut campaign, CampaignPhase::Recon);
        reset_turn_state(&mut campaign);
        complete_phase(&mut campaign, CampaignPhase::Recon);

        assert_eq!(campaign.completed_phases, vec![CampaignPhase::Recon]);
        // A duplicate does not burn the per-turn allowance.
        assert_eq!(campaign.phases_completed_this_turn, 0);
    }

    #[test]
    fn test_basic_recon_satisfies_recon_only_this_turn() {
        let mut campaign = CampaignState::default();
        assert!(!phase_satisfied(&campaign, CampaignPhase::Recon));

        use_basic_recon(&mut campaign);
        assert!(phase_satisfied(&campaign, CampaignPhase::Recon));
        assert!(!phase_satisfied(&campaign, CampaignPhase::Access));

        reset_turn_state(&mut campaign);
        assert!(!phase_satisfied(&campaign, CampaignPhase::Recon));
    }

    #[test]
    fn test_rollback_removes_first_match() {
        let mut campaign = CampaignState::default();
        campaign.completed_phases =
            vec![CampaignPhase::Recon, CampaignPhase::Access, CampaignPhase::Persistence];

        rollback_phase(
            &mut campaign,
            &[CampaignPhase::LateralMovement, CampaignPhase::Persistence],
        );
        assert_eq!(
            campaign.completed_phases,
            vec![CampaignPhase::Recon, CampaignPhase::Access]
        );

        // No match: untouched.
        rollback_phase(&mut campaign, &[CampaignPhase::LateralMovement]);
        assert_eq!(campaign.completed_phases.len(), 2);
    }

    #[test]
    fn test_rolled_back_phase_can_be_recompleted() {
        let mut campaign = CampaignState::default();
        complete_phase(&mut campaign, CampaignPhase::Recon);
        reset_turn_state(&mut campaign);

        rollback_phase(&mut campaign, &[CampaignPhase::Recon]);
        assert!(campaign.completed_phases.is_empty());

        complete_phase(&mut campaign, CampaignPhase::Recon);
        assert_eq!(campaign.completed_phases, vec![CampaignPhase::Recon]);
    }
}
