//! Persistence layer for OAuth2 grants.
//!
//! This crate stores authorization codes, access tokens and refresh tokens issued by an OAuth2
//! authorization server. One grant is written to up to three collections, each keyed by one of
//! its token strings and expiring on its own clock:
//!
//! - Basic: keyed by the authorization code.
//! - Access: keyed by the access token.
//! - Refresh: keyed by the refresh token.
//!
//! MongoDB and SQLite are supported.
//!
//! # Use grant-store in your server
//!
//! ```no_run
//! use clap::Command;
//! use grant_store::{libs, models::token::TokenRecord, store};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let args = libs::config::reg_args(Command::new("your-project-name")).get_matches();
//!
//!     let conf = libs::config::read_args(&args);
//!     let (token_store, sweeper) = match store::new_store(&conf).await {
//!         Err(e) => {
//!             println!("Error: {}", e);
//!             return;
//!         }
//!         Ok(store) => store,
//!     };
//!     let cancel = CancellationToken::new();
//!     let record = TokenRecord {
//!         access: "access-token".to_string(),
//!         ..Default::default()
//!     };
//!     if let Err(e) = token_store.create(&cancel, &record).await {
//!         println!("Error: {}", e);
//!     }
//!     sweeper.stop().await;
//!     let _ = token_store.model().close().await;
//! }
//! ```
//!
//! Please see `bin/grant-store.rs` to get the real world example.

pub mod libs;
pub mod models;
pub mod store;
