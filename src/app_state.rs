use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoQuestionSource, MongoUserStore, QuestionSource, UserStore},
    services::{ProgressionService, QuizService, QuizSettings},
};

#[derive(Clone)]
pub struct AppState {
    pub progression_service: Arc<ProgressionService>,
    pub quiz_service: Arc<QuizService>,
    pub config: Arc<Config>,
    /// Absent when the state is assembled from caller-supplied stores.
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserStore::new(&db, &config.users_collection));
        users.ensure_indexes().await?;
        let questions = Arc::new(MongoQuestionSource::new(&db, &config.questions_collection));

        let mut state = Self::from_parts(config, users, questions);
        state.db = Some(db);
        Ok(state)
    }

    pub fn from_parts(
        config: Config,
        users: Arc<dyn UserStore>,
        questions: Arc<dyn QuestionSource>,
    ) -> Self {
        let progression_service = Arc::new(ProgressionService::new(Arc::clone(&users)));
        let settings = QuizSettings {
            question_count: config.quiz_question_count,
            reward_points: config.quiz_reward_points,
        };
        let quiz_service = Arc::new(QuizService::new(
            users,
            questions,
            Arc::clone(&progression_service),
            settings,
        ));

        Self {
            progression_service,
            quiz_service,
            config: Arc::new(config),
            db: None,
        }
    }
}
