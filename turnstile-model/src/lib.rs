//! Core data model definitions shared across Turnstile crates.
#![allow(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod pins;
pub mod responses;
pub mod routes;
pub mod subscription;

pub use error::{ModelError, Result as ModelResult};
pub use pins::{
    AuthenticatePinRequest, AuthenticatedUser, GeneratePinsRequest,
    MAX_PINS_PER_BATCH, PinAuthenticationResult, PinReport, PinUserSummary,
};
pub use responses::ApiResponse;
pub use subscription::{StatusFilter, SubscriptionStatus, SubscriptionType};
