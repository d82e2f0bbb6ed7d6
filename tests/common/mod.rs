#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;

use trivia_tiers_server::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{TriviaQuestion, UserProgress, UserProgressPatch},
    repositories::{QuestionSource, UserStore},
};

/// User store with the same conditional-update semantics as the MongoDB one.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserProgress>>,
    fail_next_grant: AtomicBool,
    fail_next_attempt: AtomicBool,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: UserProgress) {
        self.users.write().await.insert(user.user_id.clone(), user);
    }

    pub async fn get(&self, user_id: &str) -> Option<UserProgress> {
        self.users.read().await.get(user_id).cloned()
    }

    pub fn fail_next_grant(&self) {
        self.fail_next_grant.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_attempt(&self) {
        self.fail_next_attempt.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: UserProgress) -> AppResult<UserProgress> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_id) {
            return Err(AppError::ValidationError(format!(
                "User '{}' already exists",
                user.user_id
            )));
        }
        users.insert(user.user_id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn update(&self, user_id: &str, patch: UserProgressPatch) -> AppResult<UserProgress> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", user_id)))?;

        user.apply(&patch);
        user.modified_at = Some(Utc::now());
        Ok(user.clone())
    }

    async fn record_attempt(
        &self,
        user_id: &str,
        expected_prior: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<UserProgress>> {
        if self.fail_next_attempt.swap(false, Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("injected failure".into()));
        }

        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };
        if user.last_quiz_attempt != expected_prior {
            return Ok(None);
        }

        user.last_quiz_attempt = Some(at);
        user.modified_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }

    async fn grant_reward(
        &self,
        user_id: &str,
        attempt_at: DateTime<Utc>,
        amount: u64,
    ) -> AppResult<Option<UserProgress>> {
        if self.fail_next_grant.swap(false, Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("injected failure".into()));
        }

        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };
        if user.last_quiz_attempt != Some(attempt_at) || user.last_reward_claim == Some(attempt_at)
        {
            return Ok(None);
        }

        user.balance = user.balance.saturating_add(amount);
        user.last_reward_claim = Some(attempt_at);
        user.modified_at = Some(Utc::now());
        Ok(Some(user.clone()))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Serves a fixed question list, or fails while `offline` is set.
pub struct FixedQuestionSource {
    questions: RwLock<Vec<TriviaQuestion>>,
    offline: AtomicBool,
    fetches: AtomicUsize,
}

impl FixedQuestionSource {
    pub fn new(questions: Vec<TriviaQuestion>) -> Self {
        Self {
            questions: RwLock::new(questions),
            offline: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionSource for FixedQuestionSource {
    async fn fetch_questions(&self, count: usize) -> AppResult<Vec<TriviaQuestion>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::SourceUnavailable("question bank offline".into()));
        }

        let questions = self.questions.read().await;
        Ok(questions.iter().take(count).cloned().collect())
    }
}

/// Three questions answered correctly by "A", "B" and "C".
pub fn abc_questions() -> Vec<TriviaQuestion> {
    vec![
        TriviaQuestion::new("First?", &["A", "X", "Y"], "A"),
        TriviaQuestion::new("Second?", &["B", "X", "Y"], "B"),
        TriviaQuestion::new("Third?", &["C", "X", "Y"], "C"),
    ]
}

pub fn config() -> Config {
    Config {
        mongo_conn_string: SecretString::from("mongodb://localhost:27017".to_string()),
        mongo_db_name: "trivia-test".to_string(),
        users_collection: "users".to_string(),
        questions_collection: "trivia_questions".to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        quiz_question_count: 3,
        quiz_reward_points: 100,
    }
}

pub struct Harness {
    pub users: Arc<InMemoryUserStore>,
    pub questions: Arc<FixedQuestionSource>,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let questions = Arc::new(FixedQuestionSource::new(abc_questions()));
        let state = AppState::from_parts(config(), users.clone(), questions.clone());

        Self {
            users,
            questions,
            state,
        }
    }

    /// A second process sharing the same store but with its own sessions.
    pub fn sibling(&self) -> AppState {
        AppState::from_parts(config(), self.users.clone(), self.questions.clone())
    }

    pub async fn seed_user(&self, user_id: &str, balance: u64, last_attempt: Option<DateTime<Utc>>) {
        let mut user = UserProgress::new(user_id).with_balance(balance, 0);
        user.last_quiz_attempt = last_attempt;
        self.users.insert(user).await;
    }
}
