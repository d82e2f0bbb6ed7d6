pub mod question_repository;
pub mod user_repository;

pub use question_repository::{MongoQuestionSource, QuestionSource};
pub use user_repository::{MongoUserStore, UserStore};
