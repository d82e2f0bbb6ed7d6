use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{tier::default_table, TierTable, UserProgress, UserProgressPatch},
        dto::response::{ProgressDto, TierDto},
    },
    repositories::UserStore,
};

pub struct ProgressionService {
    users: Arc<dyn UserStore>,
    tiers: &'static TierTable,
}

impl ProgressionService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self::with_tiers(users, default_table())
    }

    pub fn with_tiers(users: Arc<dyn UserStore>, tiers: &'static TierTable) -> Self {
        Self { users, tiers }
    }

    pub fn tiers(&self) -> Vec<TierDto> {
        TierDto::list(self.tiers)
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<UserProgress> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", user_id)))
    }

    /// Creates an empty progression record, or returns the existing one.
    ///
    /// A concurrent enroll for the same id makes `create` fail on the unique
    /// index; the record it wrote is then returned instead.
    pub async fn enroll(&self, user_id: &str) -> AppResult<ProgressDto> {
        let user = match self.users.find_by_id(user_id).await? {
            Some(user) => user,
            None => {
                log::info!("Enrolling user {}", user_id);
                match self.users.create(UserProgress::new(user_id)).await {
                    Ok(user) => user,
                    Err(err) => match self.users.find_by_id(user_id).await? {
                        Some(user) => {
                            log::debug!("User {} was enrolled concurrently", user_id);
                            user
                        }
                        None => return Err(err),
                    },
                }
            }
        };

        let progression = self.tiers.derive_tier(user.balance, user.tier_index as usize);
        Ok(ProgressDto::new(&user.user_id, user.balance, &progression, self.tiers))
    }

    /// Current tier and progress, correcting the cached tier by one step.
    pub async fn get_progress(&self, user_id: &str) -> AppResult<ProgressDto> {
        let user = self.get_user(user_id).await?;
        Ok(self.refresh(&user).await)
    }

    /// Re-derives the tier for a freshly read or updated record and persists the
    /// corrected index when it moved. A failed write only delays the correction
    /// to the next read, so it is logged rather than returned.
    pub async fn refresh(&self, user: &UserProgress) -> ProgressDto {
        let progression = self.tiers.derive_tier(user.balance, user.tier_index as usize);

        if progression.tier_index as u32 != user.tier_index {
            let patch = UserProgressPatch::tier_index(progression.tier_index as u32);
            match self.users.update(&user.user_id, patch).await {
                Ok(_) => log::info!(
                    "User {} moved from tier {} to {}",
                    user.user_id,
                    user.tier_index,
                    progression.tier_index
                ),
                Err(err) => log::warn!(
                    "Could not persist tier {} for user {}: {}",
                    progression.tier_index,
                    user.user_id,
                    err
                ),
            }
        }

        ProgressDto::new(&user.user_id, user.balance, &progression, self.tiers)
    }

    /// Full rescan for repairing records after bulk balance edits.
    pub async fn rescan(&self, user_id: &str) -> AppResult<ProgressDto> {
        let user = self.get_user(user_id).await?;
        let exact = self.tiers.rescan(user.balance);

        if exact as u32 != user.tier_index {
            log::info!(
                "Rescan moved user {} from tier {} to {}",
                user_id,
                user.tier_index,
                exact
            );
            self.users
                .update(user_id, UserProgressPatch::tier_index(exact as u32))
                .await?;
        }

        let progression = self.tiers.derive_tier(user.balance, exact);
        Ok(ProgressDto::new(user_id, user.balance, &progression, self.tiers))
    }
}
