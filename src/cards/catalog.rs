//! The standard card catalog.
//!
//! Holds every card both decks and the event pile are built from. Game
//! state stores card ids only; validation and effect application always go
//! through a catalog lookup.

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

use super::definition::{
    Card, CardCategory, CardEffect, CardId, CardSide, CampaignPhase, EffectCondition,
    EffectTarget, Requirement, Targeting,
};
use crate::core::TempEffectKind;
use crate::services::ServiceId;

/// Card lookup plus the three deck lists in printed order.
#[derive(Clone, Debug)]
pub struct Catalog {
    cards: FxHashMap<CardId, Card>,
    malosos_deck: Vec<CardId>,
    buenosos_deck: Vec<CardId>,
    event_deck: Vec<CardId>,
}

impl Catalog {
    /// Build the standard catalog: 18 MalOsos cards, 18 BuenOsos cards,
    /// 6 event cards.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self {
            cards: FxHashMap::default(),
            malosos_deck: Vec::new(),
            buenosos_deck: Vec::new(),
            event_deck: Vec::new(),
        };

        for card in malosos_cards() {
            catalog.malosos_deck.push(card.id.clone());
            catalog.cards.insert(card.id.clone(), card);
        }
        for card in buenosos_cards() {
            catalog.buenosos_deck.push(card.id.clone());
            catalog.cards.insert(card.id.clone(), card);
        }
        for card in event_cards() {
            catalog.event_deck.push(card.id.clone());
            catalog.cards.insert(card.id.clone(), card);
        }

        catalog
    }

    /// Look up a card by id.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    /// MalOsos deck list in printed order.
    #[must_use]
    pub fn malosos_deck(&self) -> &[CardId] {
        &self.malosos_deck
    }

    /// BuenOsos deck list in printed order.
    #[must_use]
    pub fn buenosos_deck(&self) -> &[CardId] {
        &self.buenosos_deck
    }

    /// Event pile in printed order.
    #[must_use]
    pub fn event_deck(&self) -> &[CardId] {
        &self.event_deck
    }
}

/// The process-wide standard catalog.
#[must_use]
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(Catalog::standard)
}

fn malosos_cards() -> Vec<Card> {
    use CampaignPhase::*;
    use CardCategory as Cat;
    use CardSide::Malosos as M;

    vec![
        Card::new("M01", "Escaneo de red", M, Cat::Recon, 2)
            .with_targeting(Targeting::AnyService)
            .advances(Recon),
        Card::new("M02", "Ingeniería social", M, Cat::Recon, 2)
            .advances(Recon)
            .with_effect(CardEffect::ModifyTrust { amount: -1 }),
        Card::new("M03", "Phishing dirigido", M, Cat::Access, 3)
            .requires(Requirement::Campaign(Recon))
            .advances(Access),
        Card::new("M04", "Explotación de vulnerabilidad", M, Cat::Access, 3)
            .with_targeting(Targeting::AnyService)
            .requires(Requirement::Campaign(Recon))
            .advances(Access)
            .with_effect(CardEffect::Degrade {
                target: EffectTarget::Chosen,
            }),
        Card::new("M05", "Credenciales robadas", M, Cat::Access, 2)
            .with_targeting(Targeting::Fixed(ServiceId::S3))
            .requires(Requirement::Campaign(Recon))
            .advances(Access)
            .with_effect(CardEffect::Degrade {
                target: EffectTarget::Fixed(ServiceId::S3),
            }),
        Card::new("M06", "Rumores de brecha", M, Cat::Social, 2)
            .with_effect(CardEffect::ModifyTrust { amount: -1 })
            .with_effect(CardEffect::DiscardOpponent { count: 1 }),
        Card::new("M07", "Puerta trasera", M, Cat::Persistence, 2)
            .requires(Requirement::Campaign(Access))
            .advances(Persistence),
        Card::new("M08", "Persistencia silenciosa", M, Cat::Persistence, 3)
            .requires(Requirement::Campaign(Access))
            .advances(Persistence)
            .with_effect(CardEffect::Grant {
                kind: TempEffectKind::DetectionCostIncrease { amount: 1 },
                turns: 1,
            }),
        Card::new("M09", "Movimiento lateral", M, Cat::LateralMovement, 3)
            .with_targeting(Targeting::AnyService)
            .requires(Requirement::Campaign(Persistence))
            .advances(LateralMovement)
            .with_effect(CardEffect::Degrade {
                target: EffectTarget::Chosen,
            }),
        Card::new("M10", "Salto entre redes", M, Cat::LateralMovement, 3)
            .with_targeting(Targeting::Pair)
            .requires(Requirement::Campaign(Persistence))
            .advances(LateralMovement)
            .with_effect(CardEffect::Degrade {
                target: EffectTarget::Chosen,
            }),
        Card::new("M11", "Ransomware", M, Cat::Impact, 4)
            .with_targeting(Targeting::AnyService)
            .requires(Requirement::Campaign(LateralMovement))
            .advances(Impact)
            .with_effect(CardEffect::TakeDown {
                target: EffectTarget::Chosen,
            }),
        Card::new("M12", "Borrado de backups", M, Cat::Impact, 5)
            .with_targeting(Targeting::Fixed(ServiceId::S4))
            .requires(Requirement::Campaign(LateralMovement))
            .advances(Impact)
            .with_effect(CardEffect::TakeDown {
                target: EffectTarget::Fixed(ServiceId::S4),
            }),
        Card::new("M13", "Apagón dirigido", M, Cat::Impact, 5)
            .with_targeting(Targeting::Fixed(ServiceId::S5))
            .requires(Requirement::Campaign(LateralMovement))
            .advances(Impact)
            .with_effect(CardEffect::TakeDown {
                target: EffectTarget::Fixed(ServiceId::S5),
            }),
        Card::new("M14", "Secuestro del portal", M, Cat::Impact, 4)
            .with_targeting(Targeting::CitizenFacingOnly)
            .requires(Requirement::Campaign(LateralMovement))
            .advances(Impact)
            .with_effect(CardEffect::TakeDown {
                target: EffectTarget::Chosen,
            })
            .with_effect(CardEffect::ModifyTrust { amount: -2 }),
        Card::new("M15", "Pánico mediático", M, Cat::Social, 3)
            .with_effect(CardEffect::ModifyTrust { amount: -3 }),
        Card::new("M16", "Caos coordinado", M, Cat::Impact, 5)
            .with_targeting(Targeting::Pair)
            .requires(Requirement::ServicesDegraded(2))
            .with_effect(CardEffect::Degrade {
                target: EffectTarget::Chosen,
            }),
        Card::new("M17", "Noticias falsas", M, Cat::Social, 2)
            .with_effect(CardEffect::ModifyTrust { amount: -2 }),
        Card::new("M18", "Vandalismo digital", M, Cat::Impact, 3)
            .with_targeting(Targeting::AnyService)
            .with_effect(CardEffect::Degrade {
                target: EffectTarget::Chosen,
            }),
    ]
}

fn buenosos_cards() -> Vec<Card> {
    use CampaignPhase::*;
    use CardCategory as Cat;
    use CardSide::Buenosos as B;

    vec![
        Card::new("B01", "Parcheo de emergencia", B, Cat::Prevention, 3)
            .with_targeting(Targeting::AnyService)
            .with_effect(CardEffect::Restore {
                target: EffectTarget::Chosen,
            }),
        Card::new("B02", "Formación de usuarios", B, Cat::Prevention, 2)
            .with_effect(CardEffect::ModifyTrust { amount: 1 }),
        Card::new("B03", "Hardening de servicio", B, Cat::Prevention, 3)
            .with_targeting(Targeting::AnyService)
            .with_effect(CardEffect::Grant {
                kind: TempEffectKind::MonitoringShield,
                turns: 1,
            }),
        Card::new("B04", "Análisis forense", B, Cat::DetectionResponse, 2)
            .with_targeting(Targeting::AnyService)
            .with_effect(CardEffect::Restore {
                target: EffectTarget::Chosen,
            }),
        Card::new("B05", "Aislamiento de red", B, Cat::DetectionResponse, 3)
            .with_effect(CardEffect::RollbackCampaign {
                choices: vec![LateralMovement, Persistence],
            }),
        Card::new("B06", "Búsqueda y erradicación", B, Cat::DetectionResponse, 3)
            .with_effect(CardEffect::RollbackCampaign {
                choices: vec![Persistence, Access, Recon],
            }),
        Card::new("B07", "Monitorización SOC", B, Cat::DetectionResponse, 2)
            .with_targeting(Targeting::AnyService)
            .with_effect(CardEffect::Grant {
                kind: TempEffectKind::MonitoringShield,
                turns: 1,
            }),
        Card::new("B08", "Caza de amenazas", B, Cat::DetectionResponse, 3)
            .requires(Requirement::PrevDetection)
            .with_effect(CardEffect::RollbackCampaign {
                choices: vec![LateralMovement, Persistence, Access, Recon],
            }),
        Card::new("B09", "Respuesta a incidentes", B, Cat::DetectionResponse, 3)
            .with_targeting(Targeting::DownOnly)
            .with_effect(CardEffect::Restore {
                target: EffectTarget::Chosen,
            }),
        Card::new("B10", "Comunicación de crisis", B, Cat::Social, 4)
            .with_effect(CardEffect::ModifyTrust { amount: 3 })
            .with_effect(CardEffect::Grant {
                kind: TempEffectKind::TrustPanicShield,
                turns: 1,
            }),
        Card::new("B11", "Campaña de transparencia", B, Cat::Social, 2)
            .with_effect(CardEffect::ModifyTrust { amount: 2 }),
        Card::new("B12", "Backups verificados", B, Cat::Drp, 3)
            .with_targeting(Targeting::AnyService)
            .with_effect(CardEffect::VerifyBackups),
        Card::new("B13", "Restore controlado", B, Cat::Drp, 3)
            .with_targeting(Targeting::DownOnly)
            .requires(Requirement::BackupsVerified)
            .with_effect(CardEffect::Restore {
                target: EffectTarget::Chosen,
            }),
        Card::new("B14", "Runbook automatizado", B, Cat::Drp, 2)
            .with_effect(CardEffect::Grant {
                kind: TempEffectKind::DrpCostReduction { amount: 1 },
                turns: 1,
            }),
        Card::new("B15", "Operación manual temporal", B, Cat::Bcp, 3)
            .with_targeting(Targeting::AnyService)
            .with_effect(CardEffect::Grant {
                kind: TempEffectKind::ManualOp,
                turns: 1,
            }),
        Card::new("B16", "BCP: priorización", B, Cat::Bcp, 3)
            .with_targeting(Targeting::Pair)
            .with_effect(CardEffect::Grant {
                kind: TempEffectKind::Prioritization,
                turns: 1,
            }),
        Card::new("B17", "Simulacro de crisis", B, Cat::Prevention, 2)
            .with_effect(CardEffect::ModifyStability { amount: 2 }),
        Card::new("B18", "Acuerdo de apoyo mutuo", B, Cat::Prevention, 2)
            .with_effect(CardEffect::ModifyStability { amount: 1 })
            .with_effect(CardEffect::ModifyTrust { amount: 1 }),
    ]
}

fn event_cards() -> Vec<Card> {
    use CardCategory as Cat;
    use CardSide::Event as E;

    vec![
        Card::new("E01", "Ola de calor", E, Cat::Event, 0).with_effect(CardEffect::Degrade {
            target: EffectTarget::Fixed(ServiceId::S5),
        }),
        Card::new("E02", "Tormenta eléctrica", E, Cat::Event, 0).with_effect(
            CardEffect::Degrade {
                target: EffectTarget::Fixed(ServiceId::S6),
            },
        ),
        Card::new("E03", "Pico de demanda", E, Cat::Event, 0).with_effect(
            CardEffect::Conditional {
                condition: EffectCondition::ServiceNotOk(ServiceId::S10),
                effects: vec![CardEffect::ModifyTrust { amount: -2 }],
            },
        ),
        Card::new("E04", "Auditoría externa", E, Cat::Event, 0)
            .with_effect(CardEffect::ModifyStability { amount: 2 }),
        Card::new("E05", "Filtración en prensa", E, Cat::Event, 0)
            .with_effect(CardEffect::ModifyTrust { amount: -2 }),
        Card::new("E06", "Voluntarios civiles", E, Cat::Event, 0)
            .with_effect(CardEffect::ModifyStability { amount: 1 })
            .with_effect(CardEffect::ModifyTrust { amount: 1 }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_sizes() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.malosos_deck().len(), 18);
        assert_eq!(catalog.buenosos_deck().len(), 18);
        assert_eq!(catalog.event_deck().len(), 6);
    }

    #[test]
    fn test_deck_namespaces_are_disjoint() {
        let catalog = Catalog::standard();
        for id in catalog.malosos_deck() {
            assert_eq!(id.side(), Some(CardSide::Malosos), "{id}");
        }
        for id in catalog.buenosos_deck() {
            assert_eq!(id.side(), Some(CardSide::Buenosos), "{id}");
        }
        for id in catalog.event_deck() {
            assert_eq!(id.side(), Some(CardSide::Event), "{id}");
        }
    }

    #[test]
    fn test_ids_match_declared_side() {
        let catalog = Catalog::standard();
        for deck in [
            catalog.malosos_deck(),
            catalog.buenosos_deck(),
            catalog.event_deck(),
        ] {
            for id in deck {
                let card = catalog.get(id).expect("deck id must resolve");
                assert_eq!(Some(card.side), id.side(), "{id}");
            }
        }
    }

    #[test]
    fn test_backup_verification_chain() {
        let catalog = Catalog::standard();
        let verify = catalog.get(&CardId::new("B12")).unwrap();
        assert!(verify
            .effects
            .iter()
            .any(|e| matches!(e, CardEffect::VerifyBackups)));

        let restore = catalog.get(&CardId::new("B13")).unwrap();
        assert!(restore.requirements.contains(&Requirement::BackupsVerified));
        assert_eq!(restore.targeting, Targeting::DownOnly);
    }

    #[test]
    fn test_campaign_cards_are_tagged_not_effected() {
        let catalog = Catalog::standard();
        for id in catalog.malosos_deck() {
            let card = catalog.get(id).unwrap();
            if card.campaign_phase.is_some() {
                // Advancement goes through the tracker, never the effect list.
                assert!(
                    !card.effects.iter().any(|e| matches!(
                        e,
                        CardEffect::RollbackCampaign { .. }
                    )),
                    "{id}"
                );
            }
        }
    }

    #[test]
    fn test_known_costs() {
        // Cost table the acceptance suite drives against.
        let catalog = Catalog::standard();
        for (id, cost) in [
            ("M01", 2),
            ("M06", 2),
            ("M15", 3),
            ("M17", 2),
            ("M18", 3),
            ("B01", 3),
            ("B10", 4),
            ("B12", 3),
            ("B18", 2),
        ] {
            assert_eq!(catalog.get(&CardId::new(id)).unwrap().cost, cost, "{id}");
        }
    }

    #[test]
    fn test_global_catalog_is_cached() {
        let a: *const Catalog = catalog();
        let b: *const Catalog = catalog();
        assert_eq!(a, b);
    }
}
