//! Step definitions for sync run behaviour scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
