//! Unit tests for connector mapping, error classification, and selection.

mod error_tests;
mod mapping_tests;
