//! The infrastructure board: 12 services with degradation state and a
//! dependency graph.
//!
//! Dependencies are adjacency sets, not a tree: the graph is allowed to
//! contain cycles (S5 and S6, the energy–telecom pair, depend on each
//! other). The cascade resolver's wave cap is what makes traversal of
//! cyclic subgraphs terminate, so nothing here tries to break cycles.

pub mod roster;

pub use roster::{dependents_of, initial_services, Service, ServiceId, ServiceState};
