use async_graphql::{Context, EmptySubscription, Object, Result, Schema as GraphQLSchema, ID};

use crate::{
    app_state::AppState,
    graphql::helpers::{gql, parse_session_id},
    models::dto::response::{ClaimResponse, CooldownDto, ProgressDto, QuizSessionDto, TierDto},
};

pub type Schema = GraphQLSchema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn tiers(&self, ctx: &Context<'_>) -> Result<Vec<TierDto>> {
        let state = ctx.data::<AppState>()?;
        Ok(state.progression_service.tiers())
    }

    async fn progress(&self, ctx: &Context<'_>, user_id: String) -> Result<ProgressDto> {
        let state = ctx.data::<AppState>()?;
        gql(state.progression_service.get_progress(&user_id).await)
    }

    async fn cooldown(&self, ctx: &Context<'_>, user_id: String) -> Result<CooldownDto> {
        let state = ctx.data::<AppState>()?;
        gql(state.quiz_service.cooldown(&user_id).await)
    }

    async fn quiz_session(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        session_id: ID,
    ) -> Result<QuizSessionDto> {
        let state = ctx.data::<AppState>()?;
        let session_id = gql(parse_session_id(&session_id))?;
        gql(state.quiz_service.get_session(&user_id, &session_id).await)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn enroll_user(&self, ctx: &Context<'_>, user_id: String) -> Result<ProgressDto> {
        let state = ctx.data::<AppState>()?;
        gql(state.progression_service.enroll(&user_id).await)
    }

    async fn start_quiz(&self, ctx: &Context<'_>, user_id: String) -> Result<QuizSessionDto> {
        let state = ctx.data::<AppState>()?;
        gql(state.quiz_service.start_session(&user_id).await)
    }

    async fn advance_quiz(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        session_id: ID,
        selected_option: Option<String>,
    ) -> Result<QuizSessionDto> {
        let state = ctx.data::<AppState>()?;
        let session_id = gql(parse_session_id(&session_id))?;
        gql(state
            .quiz_service
            .advance(&user_id, &session_id, selected_option.as_deref())
            .await)
    }

    async fn submit_quiz(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        session_id: ID,
        selected_option: Option<String>,
    ) -> Result<QuizSessionDto> {
        let state = ctx.data::<AppState>()?;
        let session_id = gql(parse_session_id(&session_id))?;
        gql(state
            .quiz_service
            .submit(&user_id, &session_id, selected_option.as_deref())
            .await)
    }

    async fn claim_quiz_reward(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        session_id: ID,
    ) -> Result<ClaimResponse> {
        let state = ctx.data::<AppState>()?;
        let session_id = gql(parse_session_id(&session_id))?;
        gql(state.quiz_service.claim(&user_id, &session_id).await)
    }

    async fn close_quiz(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        session_id: ID,
    ) -> Result<QuizSessionDto> {
        let state = ctx.data::<AppState>()?;
        let session_id = gql(parse_session_id(&session_id))?;
        gql(state.quiz_service.close(&user_id, &session_id).await)
    }

    async fn rescan_tier(&self, ctx: &Context<'_>, user_id: String) -> Result<ProgressDto> {
        let state = ctx.data::<AppState>()?;
        gql(state.progression_service.rescan(&user_id).await)
    }
}

pub fn create_schema(app_state: AppState) -> Schema {
    GraphQLSchema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(app_state)
        .finish()
}
