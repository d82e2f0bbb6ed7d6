use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progression fields of a user record. Identity is owned elsewhere; `user_id`
/// is the stable external identifier.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProgress {
    pub user_id: String,
    pub balance: u64,
    pub tier_index: u32,
    #[serde(default)]
    pub last_quiz_attempt: Option<DateTime<Utc>>,
    /// Attempt timestamp whose reward has already been paid out.
    #[serde(default)]
    pub last_reward_claim: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Partial update: only `Some` fields are written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UserProgressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_quiz_attempt: Option<DateTime<Utc>>,
}

impl UserProgress {
    pub fn new(user_id: &str) -> Self {
        UserProgress {
            user_id: user_id.to_string(),
            balance: 0,
            tier_index: 0,
            last_quiz_attempt: None,
            last_reward_claim: None,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn with_balance(mut self, balance: u64, tier_index: u32) -> Self {
        self.balance = balance;
        self.tier_index = tier_index;
        self
    }

    pub fn apply(&mut self, patch: &UserProgressPatch) {
        if let Some(balance) = patch.balance {
            self.balance = balance;
        }
        if let Some(tier_index) = patch.tier_index {
            self.tier_index = tier_index;
        }
        if let Some(at) = patch.last_quiz_attempt {
            self.last_quiz_attempt = Some(at);
        }
        self.modified_at = Some(Utc::now());
    }
}

impl UserProgressPatch {
    pub fn is_empty(&self) -> bool {
        self.balance.is_none() && self.tier_index.is_none() && self.last_quiz_attempt.is_none()
    }

    pub fn tier_index(tier_index: u32) -> Self {
        Self {
            tier_index: Some(tier_index),
            ..Default::default()
        }
    }
}
