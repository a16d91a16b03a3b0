//! Transport layer: REST match lifecycle plus the WebSocket action
//! channel, over a per-match single-writer hub.

pub mod hub;
pub mod messages;
pub mod routes;
pub mod socket;

pub use hub::{ApiError, HubError, MatchHub, MatchRoom, Player};
pub use messages::{IncomingMessage, OutgoingMessage};
pub use routes::Server;
