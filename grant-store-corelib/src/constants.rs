//! Common constants for grant-store modules.

pub struct DbEngine;

impl DbEngine {
    pub const MONGODB: &'static str = "mongodb";
    pub const SQLITE: &'static str = "sqlite";
}
