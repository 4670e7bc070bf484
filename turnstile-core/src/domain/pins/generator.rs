use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use turnstile_model::{MAX_PINS_PER_BATCH, SubscriptionType};

use crate::clock::Clock;
use crate::domain::auth::value_objects::PinCode;
use crate::domain::repositories::PinUserRepository;
use crate::domain::subscription;
use crate::domain::users::User;
use crate::error::{GenerationError, StoreError};

use super::code_source::{CodeSource, PinPolicy};

/// Bulk issuer of PIN-bearing accounts.
///
/// A batch is persisted all-or-nothing. Codes that collide with the batch
/// itself, with the store, or with a concurrent batch that committed first
/// are redrawn, each slot within its own redraw budget.
pub struct PinGenerator {
    users: Arc<dyn PinUserRepository>,
    source: Arc<dyn CodeSource>,
    clock: Arc<dyn Clock>,
    policy: PinPolicy,
}

impl fmt::Debug for PinGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinGenerator")
            .field("source", &self.source)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Draw bookkeeping for one batch.
struct Batch {
    codes: Vec<PinCode>,
    draws: Vec<u32>,
    /// Every code drawn so far, including rejected ones.
    seen: HashSet<String>,
}

impl PinGenerator {
    pub fn new(
        users: Arc<dyn PinUserRepository>,
        source: Arc<dyn CodeSource>,
        clock: Arc<dyn Clock>,
        policy: PinPolicy,
    ) -> Self {
        Self {
            users,
            source,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &PinPolicy {
        &self.policy
    }

    /// Reject bad input before any side effect. Returns the accepted batch
    /// size.
    pub fn validate(
        count: i32,
        tier: SubscriptionType,
    ) -> Result<usize, GenerationError> {
        let Some(size) = usize::try_from(count)
            .ok()
            .filter(|size| (1..=MAX_PINS_PER_BATCH).contains(size))
        else {
            return Err(GenerationError::InvalidCount {
                count,
                max: MAX_PINS_PER_BATCH,
            });
        };
        if !tier.is_issuable() {
            return Err(GenerationError::InvalidTier(tier));
        }
        Ok(size)
    }

    /// Issue `count` new PIN accounts of `tier` and return their codes in
    /// generation order.
    pub async fn generate(
        &self,
        count: i32,
        tier: SubscriptionType,
    ) -> Result<Vec<String>, GenerationError> {
        let count = Self::validate(count, tier)?;

        let now = self.clock.now();
        let expiration = subscription::expiration_for(tier, now)?;

        let mut batch = Batch {
            codes: Vec::with_capacity(count),
            draws: vec![0; count],
            seen: HashSet::with_capacity(count),
        };
        for slot in 0..count {
            let code = self.draw_unique(&mut batch, slot)?;
            batch.codes.push(code);
        }

        let mut store_retries = 0u32;
        loop {
            let candidates: Vec<String> = batch
                .codes
                .iter()
                .map(|code| code.as_str().to_string())
                .collect();

            let taken = self.users.existing_pins(&candidates).await?;
            if !taken.is_empty() {
                tracing::debug!(
                    collisions = taken.len(),
                    "redrawing PINs already present in the store"
                );
                self.redraw_taken(&mut batch, &taken)?;
                continue;
            }

            let records: Vec<User> = candidates
                .iter()
                .map(|code| User::pin_holder(code.clone(), tier, expiration, now))
                .collect();

            match self.users.insert_batch(&records).await {
                Ok(()) => {
                    tracing::info!(
                        count,
                        tier = %tier,
                        expires_at = ?expiration,
                        "issued PIN batch"
                    );
                    return Ok(candidates);
                }
                Err(StoreError::DuplicatePin(conflicts)) => {
                    store_retries += 1;
                    tracing::debug!(
                        collisions = conflicts.len(),
                        attempt = store_retries,
                        "PIN batch lost a uniqueness race; retrying"
                    );
                    if conflicts.is_empty() {
                        if store_retries > self.policy.max_redraws {
                            return Err(StoreError::DuplicatePin(conflicts).into());
                        }
                        continue;
                    }
                    let conflicts: HashSet<String> = conflicts.into_iter().collect();
                    self.redraw_taken(&mut batch, &conflicts)?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn redraw_taken(
        &self,
        batch: &mut Batch,
        taken: &HashSet<String>,
    ) -> Result<(), GenerationError> {
        for slot in 0..batch.codes.len() {
            if taken.contains(batch.codes[slot].as_str()) {
                let code = self.draw_unique(batch, slot)?;
                batch.codes[slot] = code;
            }
        }
        Ok(())
    }

    /// Draw a code not yet seen in this batch, charging `slot` for each
    /// draw. One initial draw plus `max_redraws` retries are allowed.
    fn draw_unique(
        &self,
        batch: &mut Batch,
        slot: usize,
    ) -> Result<PinCode, GenerationError> {
        loop {
            if batch.draws[slot] > self.policy.max_redraws {
                tracing::warn!(
                    slot,
                    attempts = batch.draws[slot],
                    "PIN generation exhausted its redraw budget"
                );
                return Err(GenerationError::Exhausted {
                    slot,
                    attempts: batch.draws[slot],
                });
            }

            let code = self.source.draw(&self.policy)?;
            batch.draws[slot] += 1;
            if batch.seen.insert(code.as_str().to_string()) {
                return Ok(code);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_bounds() {
        assert!(PinGenerator::validate(1, SubscriptionType::Weekly).is_ok());
        assert_eq!(
            PinGenerator::validate(1000, SubscriptionType::Lifetime).ok(),
            Some(1000)
        );
        assert!(matches!(
            PinGenerator::validate(0, SubscriptionType::Weekly),
            Err(GenerationError::InvalidCount { count: 0, .. })
        ));
        assert!(matches!(
            PinGenerator::validate(1500, SubscriptionType::Weekly),
            Err(GenerationError::InvalidCount { count: 1500, .. })
        ));
        assert!(matches!(
            PinGenerator::validate(-1, SubscriptionType::Weekly),
            Err(GenerationError::InvalidCount { count: -1, .. })
        ));
        assert!(matches!(
            PinGenerator::validate(i32::MIN, SubscriptionType::Weekly),
            Err(GenerationError::InvalidCount { .. })
        ));
        assert!(matches!(
            PinGenerator::validate(5, SubscriptionType::None),
            Err(GenerationError::InvalidTier(SubscriptionType::None))
        ));
    }
}
