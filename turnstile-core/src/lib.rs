//! # Turnstile Core
//!
//! PIN authentication and subscription lifecycle for a media server.
//!
//! ## Overview
//!
//! - **Authentication Resolver**: [`domain::auth::AuthenticationResolver`]
//!   decides per request between PIN mode and token mode and returns an
//!   [`domain::auth::IdentityResult`].
//! - **Subscription Model**: [`domain::subscription`] maps tiers to validity
//!   windows and decides active versus expired.
//! - **PIN Generation**: [`domain::pins::PinGenerator`] issues batches of
//!   unique, unpredictable codes and persists them atomically.
//! - **PIN Directory**: [`domain::pins::PinDirectory`] lists PIN holders and
//!   reports active/expired counts.
//!
//! Storage goes through the ports in [`domain::repositories`]. The
//! [`infrastructure`] module provides Postgres and in-memory adapters.
//!
//! ## Feature Flags
//!
//! - `database`: Postgres adapters and the embedded [`MIGRATOR`] (default).
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use turnstile_core::clock::SystemClock;
//! use turnstile_core::domain::pins::{OsCodeSource, PinGenerator, PinPolicy};
//! use turnstile_core::infrastructure::InMemoryPinUserRepository;
//! use turnstile_model::SubscriptionType;
//!
//! async fn issue() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = PinGenerator::new(
//!         Arc::new(InMemoryPinUserRepository::new()),
//!         Arc::new(OsCodeSource),
//!         Arc::new(SystemClock),
//!         PinPolicy::default(),
//!     );
//!     let codes = generator.generate(10, SubscriptionType::Weekly).await?;
//!     assert_eq!(codes.len(), 10);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod clock;
pub mod domain;
pub mod error;
pub mod infrastructure;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{GenerationError, StoreError};
