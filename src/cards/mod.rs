//! Card system: definitions and the static catalog.

pub mod catalog;
pub mod definition;

pub use catalog::{catalog, Catalog};
pub use definition::{
    CampaignPhase, Card, CardCategory, CardEffect, CardId, CardSide, EffectCondition,
    EffectTarget, Requirement, Targeting,
};
