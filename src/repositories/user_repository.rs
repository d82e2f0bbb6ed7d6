use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, to_bson, to_document, Bson},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{UserProgress, UserProgressPatch},
};

/// Record store holding each user's balance, cached tier and attempt times.
///
/// `record_attempt` and `grant_reward` are conditional updates: they return
/// `Ok(None)` when the stored record no longer matches the expected state, so
/// two racing callers can never both succeed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: UserProgress) -> AppResult<UserProgress>;
    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<UserProgress>>;
    async fn update(&self, user_id: &str, patch: UserProgressPatch) -> AppResult<UserProgress>;
    /// Sets `last_quiz_attempt = at` only if it still equals `expected_prior`.
    async fn record_attempt(
        &self,
        user_id: &str,
        expected_prior: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<UserProgress>>;
    /// Adds `amount` to the balance only if `attempt_at` is still the latest
    /// attempt and its reward has not been paid yet.
    async fn grant_reward(
        &self,
        user_id: &str,
        attempt_at: DateTime<Utc>,
        amount: u64,
    ) -> AppResult<Option<UserProgress>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserStore {
    collection: Collection<UserProgress>,
}

impl MongoUserStore {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    fn timestamp(at: &Option<DateTime<Utc>>) -> AppResult<Bson> {
        Ok(to_bson(at)?)
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn create(&self, user: UserProgress) -> AppResult<UserProgress> {
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
        let user = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .await?;
        Ok(user)
    }

    async fn update(&self, user_id: &str, patch: UserProgressPatch) -> AppResult<UserProgress> {
        let mut fields = to_document(&patch)?;
        fields.insert("modified_at", to_bson(&Utc::now())?);

        let updated = self
            .collection
            .find_one_and_update(doc! { "user_id": user_id }, doc! { "$set": fields })
            .with_options(Self::return_updated())
            .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("User '{}' not found", user_id)))
    }

    async fn record_attempt(
        &self,
        user_id: &str,
        expected_prior: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<UserProgress>> {
        let filter = doc! {
            "user_id": user_id,
            "last_quiz_attempt": Self::timestamp(&expected_prior)?,
        };
        let update = doc! {
            "$set": {
                "last_quiz_attempt": Self::timestamp(&Some(at))?,
                "modified_at": to_bson(&Utc::now())?,
            }
        };

        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(Self::return_updated())
            .await?;
        Ok(updated)
    }

    async fn grant_reward(
        &self,
        user_id: &str,
        attempt_at: DateTime<Utc>,
        amount: u64,
    ) -> AppResult<Option<UserProgress>> {
        let amount = i64::try_from(amount).map_err(|_| {
            AppError::ValidationError(format!("Reward amount {} is too large", amount))
        })?;
        let attempt = Self::timestamp(&Some(attempt_at))?;

        let filter = doc! {
            "user_id": user_id,
            "last_quiz_attempt": attempt.clone(),
            "last_reward_claim": { "$ne": attempt.clone() },
        };
        let update = doc! {
            "$inc": { "balance": amount },
            "$set": {
                "last_reward_claim": attempt,
                "modified_at": to_bson(&Utc::now())?,
            }
        };

        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .with_options(Self::return_updated())
            .await?;
        Ok(updated)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder()
            .unique(true)
            .name("user_id_unique".to_string())
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;
        log::info!("Created unique index on user_id field");

        Ok(())
    }
}
