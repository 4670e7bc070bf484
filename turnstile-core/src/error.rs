use thiserror::Error;
use turnstile_model::SubscriptionType;

/// Failures raised by user and token stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// One or more PIN codes in a write collided with existing rows. The
    /// colliding codes are listed when the store can identify them.
    #[error("{} PIN code(s) already assigned", .0.len())]
    DuplicatePin(Vec<String>),

    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.into())
    }
}

/// Failures raised by bulk PIN generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("count must be between 1 and {max}, got {count}")]
    InvalidCount { count: i32, max: usize },

    #[error("subscription type {0} cannot be issued to a PIN")]
    InvalidTier(SubscriptionType),

    #[error(
        "could not draw a unique PIN for slot {slot} after {attempts} attempts"
    )]
    Exhausted { slot: usize, attempts: u32 },

    #[error("random source failure: {0}")]
    Entropy(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GenerationError {
    /// Whether the caller supplied bad input, as opposed to an
    /// infrastructure or exhaustion failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GenerationError::InvalidCount { .. } | GenerationError::InvalidTier(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
