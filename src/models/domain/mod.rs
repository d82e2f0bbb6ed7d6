pub mod cooldown;
pub mod quiz_session;
pub mod reward;
pub mod tier;
pub mod trivia_question;
pub mod user;
pub use cooldown::CooldownStatus;
pub use quiz_session::{QuestionView, QuizSession, SessionSnapshot, SessionState};
pub use tier::{Progression, TierTable};
pub use trivia_question::TriviaQuestion;
pub use user::{UserProgress, UserProgressPatch};
