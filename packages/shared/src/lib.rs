//! Utilities shared by the Streamcircle crates.

pub mod logger;
pub mod time;
