//! Integration tests - translator behavior against the fixture schema,
//! asserting on the exact SQL handed to the executor.

#[path = "../fixtures/mod.rs"]
mod fixtures;

mod translator_tests;
