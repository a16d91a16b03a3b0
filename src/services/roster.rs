//! Service definitions and the standard board roster.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// One of the 12 modeled infrastructure nodes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ServiceId {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    S9,
    S10,
    S11,
    S12,
}

impl ServiceId {
    /// All service ids in board order.
    pub const ALL: [ServiceId; 12] = [
        ServiceId::S1,
        ServiceId::S2,
        ServiceId::S3,
        ServiceId::S4,
        ServiceId::S5,
        ServiceId::S6,
        ServiceId::S7,
        ServiceId::S8,
        ServiceId::S9,
        ServiceId::S10,
        ServiceId::S11,
        ServiceId::S12,
    ];

    /// Parse a wire id like `"S10"`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.as_str() == s)
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceId::S1 => "S1",
            ServiceId::S2 => "S2",
            ServiceId::S3 => "S3",
            ServiceId::S4 => "S4",
            ServiceId::S5 => "S5",
            ServiceId::S6 => "S6",
            ServiceId::S7 => "S7",
            ServiceId::S8 => "S8",
            ServiceId::S9 => "S9",
            ServiceId::S10 => "S10",
            ServiceId::S11 => "S11",
            ServiceId::S12 => "S12",
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Degradation state of a service.
///
/// Severity is ordered: `OK < DEGRADED < DOWN`. The cascade resolver moves
/// services one step at a time along this ladder.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceState {
    Ok,
    Degraded,
    Down,
}

impl ServiceState {
    /// One severity step worse. `DOWN` saturates.
    #[must_use]
    pub fn degraded_once(self) -> Self {
        match self {
            ServiceState::Ok => ServiceState::Degraded,
            ServiceState::Degraded | ServiceState::Down => ServiceState::Down,
        }
    }

    /// One severity step better. `OK` saturates.
    #[must_use]
    pub fn restored_once(self) -> Self {
        match self {
            ServiceState::Down => ServiceState::Degraded,
            ServiceState::Degraded | ServiceState::Ok => ServiceState::Ok,
        }
    }
}

/// A single infrastructure service on the board.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    /// Citizen-facing services feed the trust marker when they fail.
    pub citizen_facing: bool,
    /// Weight applied to this service's trust penalty. 1 for most
    /// citizen-facing services; emergency response counts double.
    pub trust_weight: u32,
    pub state: ServiceState,
    /// Services this one depends on. May participate in cycles.
    pub dependencies: SmallVec<[ServiceId; 4]>,
}

impl Service {
    fn new(id: ServiceId, name: &str, dependencies: &[ServiceId]) -> Self {
        Self {
            id,
            name: name.to_string(),
            citizen_facing: false,
            trust_weight: 1,
            state: ServiceState::Ok,
            dependencies: SmallVec::from_slice(dependencies),
        }
    }

    fn citizen_facing(mut self) -> Self {
        self.citizen_facing = true;
        self
    }

    fn with_trust_weight(mut self, weight: u32) -> Self {
        self.trust_weight = weight;
        self
    }
}

/// Build the standard 12-service board, everything `OK`.
///
/// S5 (power grid) and S6 (telecom) form a deliberate dependency cycle:
/// grid control needs connectivity, cell sites need power.
#[must_use]
pub fn initial_services() -> BTreeMap<ServiceId, Service> {
    use ServiceId::*;

    let services = [
        Service::new(S1, "Centro de datos", &[S5]),
        Service::new(S2, "Red corporativa", &[S1, S5]),
        Service::new(S3, "Identidad digital", &[S1]),
        Service::new(S4, "Backups y almacenamiento", &[S1]),
        Service::new(S5, "Red eléctrica", &[S6]),
        Service::new(S6, "Telecomunicaciones", &[S5]),
        Service::new(S7, "Portal ciudadano", &[S1, S3, S6]).citizen_facing(),
        Service::new(S8, "Agua y saneamiento", &[S5]),
        Service::new(S9, "Transporte público", &[S5, S6]),
        Service::new(S10, "Pagos/Banca", &[S2, S6]).citizen_facing(),
        Service::new(S11, "Salud/Hospitales", &[S5, S8]),
        Service::new(S12, "Emergencias 112", &[S6])
            .citizen_facing()
            .with_trust_weight(2),
    ];

    services.into_iter().map(|s| (s.id, s)).collect()
}

/// Service ids that list `of` among their dependencies.
pub fn dependents_of(
    services: &BTreeMap<ServiceId, Service>,
    of: ServiceId,
) -> impl Iterator<Item = ServiceId> + '_ {
    services
        .values()
        .filter(move |s| s.dependencies.contains(&of))
        .map(|s| s.id)
}
