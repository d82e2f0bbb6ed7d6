use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::domain::{
    CooldownStatus, Progression, QuestionView, SessionSnapshot, SessionState, TierTable,
};

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct TierDto {
    pub index: u32,
    pub name: String,
    pub min_points: u64,
}

impl TierDto {
    pub fn list(table: &TierTable) -> Vec<TierDto> {
        table
            .tiers()
            .iter()
            .enumerate()
            .map(|(index, tier)| TierDto {
                index: index as u32,
                name: tier.name.clone(),
                min_points: tier.min_points,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct ProgressDto {
    pub user_id: String,
    pub balance: u64,
    pub tier_index: u32,
    pub tier_name: String,
    pub progress: f64,
    pub progress_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier_min_points: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_to_next: Option<u64>,
}

impl ProgressDto {
    pub fn new(user_id: &str, balance: u64, progression: &Progression, table: &TierTable) -> Self {
        let index = progression.tier_index;
        let next = table.next_tier(index);

        ProgressDto {
            user_id: user_id.to_string(),
            balance,
            tier_index: index as u32,
            tier_name: table
                .get(index)
                .map(|tier| tier.name.clone())
                .unwrap_or_default(),
            progress: progression.progress,
            progress_percent: progression.progress_percent(),
            next_tier_name: next.map(|tier| tier.name.clone()),
            next_tier_min_points: next.map(|tier| tier.min_points),
            points_to_next: table.points_to_next(balance, index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct CooldownDto {
    pub eligible: bool,
    pub remaining_seconds: i64,
    pub countdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_eligible_at: Option<DateTime<Utc>>,
}

impl From<CooldownStatus> for CooldownDto {
    fn from(status: CooldownStatus) -> Self {
        CooldownDto {
            eligible: status.eligible,
            remaining_seconds: status.remaining_seconds(),
            countdown: status.countdown(),
            next_eligible_at: status.next_eligible_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct QuestionDto {
    pub index: u32,
    pub total: u32,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<QuestionView> for QuestionDto {
    fn from(view: QuestionView) -> Self {
        QuestionDto {
            index: view.index as u32,
            total: view.total as u32,
            prompt: view.prompt,
            options: view.options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct QuizSessionDto {
    pub session_id: Uuid,
    pub user_id: String,
    pub state: SessionState,
    pub question_count: u32,
    pub answered: u32,
    pub current_question: Option<QuestionDto>,
    pub score: Option<u32>,
    pub perfect: bool,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<SessionSnapshot> for QuizSessionDto {
    fn from(snapshot: SessionSnapshot) -> Self {
        QuizSessionDto {
            session_id: snapshot.session_id,
            user_id: snapshot.user_id,
            state: snapshot.state,
            question_count: snapshot.question_count as u32,
            answered: snapshot.answered as u32,
            current_question: snapshot.current_question.map(QuestionDto::from),
            score: snapshot.score.map(|score| score as u32),
            perfect: snapshot.perfect,
            started_at: snapshot.started_at,
            submitted_at: snapshot.submitted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct ClaimResponse {
    pub session: QuizSessionDto,
    pub reward: u64,
    pub progress: ProgressDto,
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct MessageResponse {
    pub message: String,
}
