use secrecy::SecretString;
use std::env;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: SecretString,
    pub mongo_db_name: String,
    pub users_collection: String,
    pub questions_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub quiz_question_count: usize,
    pub quiz_reward_points: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: SecretString::from(
                env::var("MONGO_CONN_STRING")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "trivia-local".to_string()),
            users_collection: env::var("USERS_COLLECTION").unwrap_or_else(|_| "users".to_string()),
            questions_collection: env::var("QUESTIONS_COLLECTION")
                .unwrap_or_else(|_| "trivia_questions".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            quiz_question_count: env::var("QUIZ_QUESTION_COUNT")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(5),
            quiz_reward_points: env::var("QUIZ_REWARD_POINTS")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(100),
        }
    }

    /// Rejects settings that would make the quiz unwinnable or pointless.
    pub fn validate(&self) -> AppResult<()> {
        if self.quiz_question_count == 0 {
            return Err(AppError::ValidationError(
                "QUIZ_QUESTION_COUNT must be at least 1".to_string(),
            ));
        }

        if self.quiz_reward_points == 0 {
            return Err(AppError::ValidationError(
                "QUIZ_REWARD_POINTS must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
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
}
