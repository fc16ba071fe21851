//! Data Transfer Objects (DTOs) for the chat relay.
//!
//! - `websocket`: WebSocket event envelopes
//! - `conversion`: domain → DTO conversions

pub mod conversion;
pub mod websocket;
