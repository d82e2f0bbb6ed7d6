use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, from_document, Document},
    Collection,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::TriviaQuestion,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Ordered question set for one session.
    async fn fetch_questions(&self, count: usize) -> AppResult<Vec<TriviaQuestion>>;
}

/// Draws a random sample from the question bank collection.
pub struct MongoQuestionSource {
    collection: Collection<Document>,
}

impl MongoQuestionSource {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

fn unavailable(err: impl std::fmt::Display) -> AppError {
    AppError::SourceUnavailable(err.to_string())
}

#[async_trait]
impl QuestionSource for MongoQuestionSource {
    async fn fetch_questions(&self, count: usize) -> AppResult<Vec<TriviaQuestion>> {
        let size = i64::try_from(count).map_err(unavailable)?;
        let pipeline = vec![
            doc! { "$sample": { "size": size } },
            doc! { "$project": { "_id": 0, "prompt": 1, "options": 1, "answer": 1 } },
        ];

        let documents: Vec<Document> = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(unavailable)?
            .try_collect()
            .await
            .map_err(unavailable)?;

        documents
            .into_iter()
            .map(|document| from_document::<TriviaQuestion>(document).map_err(unavailable))
            .collect()
    }
}
