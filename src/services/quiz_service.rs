use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            cooldown::check_cooldown, reward::claim_reward, CooldownStatus, QuizSession,
            SessionState, UserProgress,
        },
        dto::response::{ClaimResponse, CooldownDto, QuizSessionDto},
    },
    repositories::{QuestionSource, UserStore},
    services::{progression_service::ProgressionService, session_registry::SessionRegistry},
};

#[derive(Clone, Copy, Debug)]
pub struct QuizSettings {
    pub question_count: usize,
    pub reward_points: u64,
}

/// Drives quiz sessions against the user store and question source.
///
/// The cooldown decides whether a session may start. At claim time the gate is
/// evaluated again against the attempt that preceded the session, and the
/// store's conditional updates make that check atomic with the balance change.
pub struct QuizService {
    users: Arc<dyn UserStore>,
    questions: Arc<dyn QuestionSource>,
    progression: Arc<ProgressionService>,
    sessions: SessionRegistry,
    settings: QuizSettings,
}

impl QuizService {
    pub fn new(
        users: Arc<dyn UserStore>,
        questions: Arc<dyn QuestionSource>,
        progression: Arc<ProgressionService>,
        settings: QuizSettings,
    ) -> Self {
        Self {
            users,
            questions,
            progression,
            sessions: SessionRegistry::new(),
            settings,
        }
    }

    pub fn settings(&self) -> QuizSettings {
        self.settings
    }

    pub async fn cooldown_status(&self, user_id: &str) -> AppResult<CooldownStatus> {
        let user = self.progression.get_user(user_id).await?;
        Ok(check_cooldown(user.last_quiz_attempt, Utc::now()))
    }

    pub async fn cooldown(&self, user_id: &str) -> AppResult<CooldownDto> {
        self.cooldown_status(user_id).await.map(CooldownDto::from)
    }

    /// Offers a new quiz if the user is off cooldown. A question source failure
    /// ends the attempt before any session is registered.
    pub async fn start_session(&self, user_id: &str) -> AppResult<QuizSessionDto> {
        let user = self.progression.get_user(user_id).await?;
        let now = Utc::now();

        let cooldown = check_cooldown(user.last_quiz_attempt, now);
        if !cooldown.eligible {
            return Err(AppError::NotEligible(format!(
                "Next quiz available in {}",
                cooldown.countdown()
            )));
        }

        let mut session = QuizSession::new(user_id, user.last_quiz_attempt, now);
        let questions = self
            .questions
            .fetch_questions(self.settings.question_count)
            .await
            .map_err(|err| {
                log::warn!("Question fetch failed for user {}: {}", user_id, err);
                err
            })?;

        if questions.len() != self.settings.question_count {
            return Err(AppError::SourceUnavailable(format!(
                "Expected {} questions but the source returned {}",
                self.settings.question_count,
                questions.len()
            )));
        }
        session.load(questions)?;

        let snapshot = session.snapshot();
        self.sessions.insert(session).await;
        log::info!("Started quiz session {} for user {}", snapshot.session_id, user_id);

        Ok(snapshot.into())
    }

    pub async fn get_session(&self, user_id: &str, session_id: &Uuid) -> AppResult<QuizSessionDto> {
        let handle = self.sessions.get(user_id, session_id).await?;
        let session = handle.lock().await;
        Ok(session.snapshot().into())
    }

    pub async fn advance(
        &self,
        user_id: &str,
        session_id: &Uuid,
        selected: Option<&str>,
    ) -> AppResult<QuizSessionDto> {
        let handle = self.sessions.get(user_id, session_id).await?;
        let mut session = handle.lock().await;

        session.advance(selected)?;
        Ok(session.snapshot().into())
    }

    /// Scores the session and records the attempt time, whatever the score.
    ///
    /// The attempt is written with a compare-and-set on the timestamp seen when
    /// the session started; if another submission got there first this session
    /// is closed. On a store failure the session is left untouched.
    pub async fn submit(
        &self,
        user_id: &str,
        session_id: &Uuid,
        selected: Option<&str>,
    ) -> AppResult<QuizSessionDto> {
        let handle = self.sessions.get(user_id, session_id).await?;
        let mut session = handle.lock().await;

        let now = Utc::now();
        let mut submitted = session.clone();
        let score = submitted.submit(selected, now)?;

        let recorded = self
            .users
            .record_attempt(user_id, session.prior_attempt(), now)
            .await?;

        if recorded.is_none() {
            self.progression.get_user(user_id).await?;
            session.close()?;
            log::warn!(
                "Session {} for user {} lost the attempt race and was closed",
                session_id,
                user_id
            );
            return Err(AppError::NotEligible(
                "Another quiz attempt was recorded during this session".to_string(),
            ));
        }

        *session = submitted;
        log::info!(
            "User {} submitted session {} with score {}/{}",
            user_id,
            session_id,
            score,
            session.question_count()
        );
        Ok(session.snapshot().into())
    }

    /// Grants the reward for a perfect, eligible session exactly once.
    ///
    /// Ineligible claims close the session. A store failure leaves it
    /// `Submitted` so the claim can be retried.
    pub async fn claim(&self, user_id: &str, session_id: &Uuid) -> AppResult<ClaimResponse> {
        let handle = self.sessions.get(user_id, session_id).await?;
        let mut session = handle.lock().await;

        if session.state() != SessionState::Submitted {
            return Err(AppError::InvalidTransition(format!(
                "Cannot claim a session in state {:?}",
                session.state()
            )));
        }
        let (Some(score), Some(attempt_at)) = (session.score(), session.submitted_at()) else {
            return Err(AppError::InternalError(
                "Submitted session is missing its score".to_string(),
            ));
        };

        let user = self.progression.get_user(user_id).await?;
        let anchored = UserProgress {
            last_quiz_attempt: session.prior_attempt(),
            ..user
        };
        let reward = self.settings.reward_points;

        if let Err(err) = claim_reward(&anchored, score, session.question_count(), reward, Utc::now())
        {
            session.close()?;
            log::info!("Claim rejected for session {}: {}", session_id, err);
            return Err(err);
        }

        let mut claimed = session.clone();
        claimed.mark_claimed()?;

        let Some(updated) = self.users.grant_reward(user_id, attempt_at, reward).await? else {
            session.close()?;
            log::warn!(
                "Reward for session {} of user {} was already granted or superseded",
                session_id,
                user_id
            );
            return Err(AppError::NotEligible(
                "Reward for this attempt is no longer available".to_string(),
            ));
        };

        *session = claimed;
        log::info!(
            "User {} claimed {} points, balance now {}",
            user_id,
            reward,
            updated.balance
        );

        let progress = self.progression.refresh(&updated).await;
        Ok(ClaimResponse {
            session: session.snapshot().into(),
            reward,
            progress,
        })
    }

    /// Dismisses the session without a reward.
    pub async fn close(&self, user_id: &str, session_id: &Uuid) -> AppResult<QuizSessionDto> {
        let handle = self.sessions.get(user_id, session_id).await?;
        let mut session = handle.lock().await;

        session.close()?;
        Ok(session.snapshot().into())
    }

    pub async fn abandon(&self, user_id: &str, session_id: &Uuid) -> AppResult<()> {
        self.sessions.remove(user_id, session_id).await?;
        log::debug!("User {} abandoned session {}", user_id, session_id);
        Ok(())
    }
}
