//! SQLite model implementation.
//!
//! SQLite has no TTL monitor. Expired rows are removed by the
//! [`Sweeper`](super::expiry::Sweeper) through [`purge()`](super::index::TokenIndex::purge).

pub mod conn;
pub mod index;
