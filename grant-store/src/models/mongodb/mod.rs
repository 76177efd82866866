//! MongoDB model implementation.
//!
//! Expired documents are removed by the server's TTL monitor through the `expires_at` index.

pub mod conn;
pub mod index;
