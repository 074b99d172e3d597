//! # Tidemark Testkit
//!
//! Testing utilities for Tidemark: deterministic fixtures bundling an
//! author identity with a store, and proptest generators for documents
//! and their parts.

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_author_fixtures, TestFixture};
