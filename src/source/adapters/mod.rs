//! Adapter implementations for source ports.

pub mod memory;
pub mod postgres;
