//! Cross-component integration tests.

pub mod scenarios;
