use chrono::{DateTime, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{cooldown::check_cooldown, user::UserProgress},
};

/// Applies the quiz reward to `user` if the attempt earned it.
///
/// Only a perfect score is rewarded, and only while the cooldown gate anchored
/// on `user.last_quiz_attempt` reports eligible at `now`. The returned record
/// carries the new balance; persisting it is the caller's job.
pub fn claim_reward(
    user: &UserProgress,
    score: usize,
    question_count: usize,
    reward: u64,
    now: DateTime<Utc>,
) -> AppResult<UserProgress> {
    if question_count == 0 || score != question_count {
        return Err(AppError::NotEligible(format!(
            "Reward requires a perfect score ({} of {})",
            score, question_count
        )));
    }

    let cooldown = check_cooldown(user.last_quiz_attempt, now);
    if !cooldown.eligible {
        return Err(AppError::NotEligible(format!(
            "Quiz cooldown active for another {}",
            cooldown.countdown()
        )));
    }

    let mut updated = user.clone();
    updated.balance = updated.balance.saturating_add(reward);
    Ok(updated)
}
