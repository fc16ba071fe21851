//! Utilities shared by the Parley packages.

pub mod logger;
pub mod time;
