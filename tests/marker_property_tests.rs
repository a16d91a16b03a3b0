//! Property tests for the marker calculator and the deal invariants.

use proptest::prelude::*;

use fenyflow::cards::CardSide;
use fenyflow::core::GameConfig;
use fenyflow::engine::{markers, Game};
use fenyflow::services::{ServiceId, ServiceState};

fn any_service_state() -> impl Strategy<Value = ServiceState> {
    prop_oneof![
        Just(ServiceState::Ok),
        Just(ServiceState::Degraded),
        Just(ServiceState::Down),
    ]
}

proptest! {
    /// The total base stability loss per turn never exceeds 25, no matter
    /// how many of the 12 services are simultaneously degraded or down
    /// (all 12 DOWN would be a theoretical −72).
    #[test]
    fn prop_base_penalty_floor(states in proptest::collection::vec(any_service_state(), 12)) {
        let game = Game::create(GameConfig::new(), "prop");
        let mut state = game.state().clone();
        for (id, service_state) in ServiceId::ALL.iter().zip(&states) {
            state.services.get_mut(id).unwrap().state = *service_state;
        }

        let update = markers::calculate(&state);

        // Trust starts at 50 and its own floored penalty (≥ −15) cannot
        // empty it, so no panic surcharge applies here: the delta is the
        // floored base penalty alone.
        prop_assert!(update.stability_delta >= -25);
        prop_assert!(update.stability_delta <= 0);
    }

    /// Trust damage has its own floor and ignores the stability cap.
    #[test]
    fn prop_trust_floor(states in proptest::collection::vec(any_service_state(), 12)) {
        let game = Game::create(GameConfig::new(), "prop");
        let mut state = game.state().clone();
        for (id, service_state) in ServiceId::ALL.iter().zip(&states) {
            state.services.get_mut(id).unwrap().state = *service_state;
        }

        let update = markers::calculate(&state);

        prop_assert!(update.trust_delta >= -15);
        prop_assert!(update.trust_delta <= 0);
    }

    /// Every start deals 5 cards per seat, strictly from that seat's own
    /// namespace, with no event card ever reaching a hand.
    #[test]
    fn prop_deal_is_namespace_pure(seed in any::<u64>()) {
        let mut game = Game::create(GameConfig::new().with_seed(seed), "prop");
        game.start().unwrap();
        let state = game.state();

        prop_assert_eq!(state.seats.malosos.hand.len(), 5);
        prop_assert_eq!(state.seats.buenosos.hand.len(), 5);
        for id in &state.seats.malosos.hand {
            prop_assert_eq!(id.side(), Some(CardSide::Malosos));
        }
        for id in &state.seats.buenosos.hand {
            prop_assert_eq!(id.side(), Some(CardSide::Buenosos));
        }
    }
}
