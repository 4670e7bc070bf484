use std::fmt;
use std::sync::Arc;

use turnstile_model::{PinReport, StatusFilter, SubscriptionType};

use crate::clock::Clock;
use crate::domain::repositories::PinUserRepository;
use crate::domain::users::User;
use crate::error::StoreError;

/// Read-only view over PIN-bearing accounts.
///
/// Status is evaluated against a single `now` captured per call; nothing is
/// cached between calls.
pub struct PinDirectory {
    users: Arc<dyn PinUserRepository>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for PinDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinDirectory").finish_non_exhaustive()
    }
}

impl PinDirectory {
    pub fn new(users: Arc<dyn PinUserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    pub async fn list(
        &self,
        status: StatusFilter,
        tier: Option<SubscriptionType>,
    ) -> Result<Vec<User>, StoreError> {
        let now = self.clock.now();
        let users = self.users.list_pin_users(tier).await?;

        Ok(users
            .into_iter()
            .filter(|user| user.is_pin_bearing())
            .filter(|user| status.matches(user.subscription_status(now)))
            .collect())
    }

    pub async fn report(&self) -> Result<PinReport, StoreError> {
        let now = self.clock.now();
        let users = self.users.list_pin_users(None).await?;

        let mut report = PinReport::default();
        for user in users.iter().filter(|user| user.is_pin_bearing()) {
            report.total += 1;
            if user.subscription_status(now).is_active() {
                report.active += 1;
            } else {
                report.expired += 1;
            }
        }
        Ok(report)
    }
}
