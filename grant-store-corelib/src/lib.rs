//! Common libraries of the grant-store modules.

pub mod constants;
pub mod logger;
pub mod strings;
