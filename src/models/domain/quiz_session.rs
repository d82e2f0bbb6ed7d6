use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::trivia_question::TriviaQuestion,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Loading,
    InProgress,
    Submitted,
    Claimed,
    Closed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Claimed | SessionState::Closed)
    }
}

/// The question at the cursor, without its answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
}

/// Read-only copy of a session handed to transports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub user_id: String,
    pub state: SessionState,
    pub question_count: usize,
    pub answered: usize,
    pub current_question: Option<QuestionView>,
    pub score: Option<usize>,
    pub perfect: bool,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One quiz attempt. Lives in memory only; nothing about it is persisted until
/// submission records the attempt time.
#[derive(Clone, Debug)]
pub struct QuizSession {
    id: Uuid,
    user_id: String,
    state: SessionState,
    questions: Vec<TriviaQuestion>,
    current_index: usize,
    answers: Vec<Option<String>>,
    score: Option<usize>,
    prior_attempt: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
}

/// Number of index-aligned exact matches between answers and correct options.
pub fn score_answers(questions: &[TriviaQuestion], answers: &[Option<String>]) -> usize {
    questions
        .iter()
        .zip(answers)
        .fold(0, |score, (question, answer)| match answer {
            Some(answer) if question.is_correct(answer) => score + 1,
            _ => score,
        })
}

fn require_selection(selected: Option<&str>) -> AppResult<&str> {
    match selected {
        Some(option) if !option.is_empty() => Ok(option),
        _ => Err(AppError::InvalidTransition(
            "An option must be selected before continuing".to_string(),
        )),
    }
}

impl QuizSession {
    /// `prior_attempt` is the user's last attempt time as seen when the
    /// session was offered.
    pub fn new(user_id: &str, prior_attempt: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        QuizSession {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            state: SessionState::Loading,
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            score: None,
            prior_attempt,
            started_at: now,
            submitted_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> Option<usize> {
        self.score
    }

    pub(crate) fn prior_attempt(&self) -> Option<DateTime<Utc>> {
        self.prior_attempt
    }

    /// Submission time, or the start time for sessions never submitted.
    pub(crate) fn last_activity(&self) -> DateTime<Utc> {
        self.submitted_at.unwrap_or(self.started_at)
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            user_id: self.user_id.clone(),
            state: self.state,
            question_count: self.questions.len(),
            answered: self.answers.iter().filter(|a| a.is_some()).count(),
            current_question: self.current_question(),
            score: self.score,
            perfect: self.is_perfect(),
            started_at: self.started_at,
            submitted_at: self.submitted_at,
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.score == Some(self.questions.len()) && !self.questions.is_empty()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    fn require_state(&self, expected: SessionState, action: &str) -> AppResult<()> {
        if self.state != expected {
            return Err(AppError::InvalidTransition(format!(
                "Cannot {} a session in state {:?}",
                action, self.state
            )));
        }
        Ok(())
    }

    fn require_known_option(&self, option: &str) -> AppResult<()> {
        let question = &self.questions[self.current_index];
        if !question.has_option(option) {
            return Err(AppError::ValidationError(format!(
                "'{}' is not an option for question {}",
                option,
                self.current_index + 1
            )));
        }
        Ok(())
    }

    /// `Loading -> InProgress` once the question set has arrived.
    pub fn load(&mut self, questions: Vec<TriviaQuestion>) -> AppResult<()> {
        self.require_state(SessionState::Loading, "load questions into")?;

        if questions.is_empty() {
            return Err(AppError::SourceUnavailable(
                "Question source returned no questions".to_string(),
            ));
        }
        for question in &questions {
            question.validate()?;
        }

        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.current_index = 0;
        self.state = SessionState::InProgress;
        Ok(())
    }

    pub fn current_question(&self) -> Option<QuestionView> {
        if self.state != SessionState::InProgress {
            return None;
        }

        self.questions
            .get(self.current_index)
            .map(|question| QuestionView {
                index: self.current_index,
                total: self.questions.len(),
                prompt: question.prompt.clone(),
                options: question.options.clone(),
            })
    }

    /// Records the selection for the current question and moves the cursor
    /// forward unless it is already on the last question.
    pub fn advance(&mut self, selected: Option<&str>) -> AppResult<()> {
        self.require_state(SessionState::InProgress, "advance")?;
        let option = require_selection(selected)?;
        self.require_known_option(option)?;

        self.answers[self.current_index] = Some(option.to_string());
        if !self.is_last_question() {
            self.current_index += 1;
        }
        Ok(())
    }

    /// Records the final answer and scores the whole answer sheet.
    pub fn submit(&mut self, selected: Option<&str>, now: DateTime<Utc>) -> AppResult<usize> {
        self.require_state(SessionState::InProgress, "submit")?;
        if !self.is_last_question() {
            return Err(AppError::InvalidTransition(format!(
                "Submission is only possible on the last question (at {} of {})",
                self.current_index + 1,
                self.questions.len()
            )));
        }
        let option = require_selection(selected)?;
        self.require_known_option(option)?;

        self.answers[self.current_index] = Some(option.to_string());
        if let Some(missing) = self.answers.iter().position(Option::is_none) {
            return Err(AppError::InvalidTransition(format!(
                "Question {} has not been answered",
                missing + 1
            )));
        }

        let score = score_answers(&self.questions, &self.answers);
        self.score = Some(score);
        self.submitted_at = Some(now);
        self.state = SessionState::Submitted;
        Ok(score)
    }

    /// `Submitted -> Claimed`, perfect score only.
    pub fn mark_claimed(&mut self) -> AppResult<()> {
        self.require_state(SessionState::Submitted, "claim")?;
        if !self.is_perfect() {
            return Err(AppError::NotEligible(format!(
                "Reward requires a perfect score ({} of {})",
                self.score.unwrap_or(0),
                self.questions.len()
            )));
        }
        self.state = SessionState::Claimed;
        Ok(())
    }

    /// Ends the session without a reward.
    pub fn close(&mut self) -> AppResult<()> {
        if self.state.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Session is already {:?}",
                self.state
            )));
        }
        self.state = SessionState::Closed;
        Ok(())
    }
}
