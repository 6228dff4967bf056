//! Unit tests for the task source module.

mod domain_tests;
