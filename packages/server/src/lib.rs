//! Password-gated multi-room chat relay.
//!
//! Clients connect over WebSocket, join a named room with a shared password,
//! receive the room's history, and exchange messages with the other members.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
