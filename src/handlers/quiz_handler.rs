use actix_web::{delete, get, post, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{request::SelectOptionRequest, response::MessageResponse},
};

#[post("/api/users/{user_id}/quiz")]
pub async fn start_quiz(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session = state.quiz_service.start_session(&user_id).await?;
    Ok(HttpResponse::Created().json(session))
}

#[get("/api/users/{user_id}/quiz/{session_id}")]
pub async fn get_quiz_session(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, session_id) = path.into_inner();
    let session = state.quiz_service.get_session(&user_id, &session_id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/api/users/{user_id}/quiz/{session_id}/advance")]
pub async fn advance_quiz(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
    request: web::Json<SelectOptionRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let (user_id, session_id) = path.into_inner();

    let session = state
        .quiz_service
        .advance(&user_id, &session_id, request.selected_option.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/api/users/{user_id}/quiz/{session_id}/submit")]
pub async fn submit_quiz(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
    request: web::Json<SelectOptionRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let (user_id, session_id) = path.into_inner();

    let session = state
        .quiz_service
        .submit(&user_id, &session_id, request.selected_option.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/api/users/{user_id}/quiz/{session_id}/claim")]
pub async fn claim_quiz_reward(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, session_id) = path.into_inner();
    let receipt = state.quiz_service.claim(&user_id, &session_id).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

#[post("/api/users/{user_id}/quiz/{session_id}/close")]
pub async fn close_quiz(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, session_id) = path.into_inner();
    let session = state.quiz_service.close(&user_id, &session_id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[delete("/api/users/{user_id}/quiz/{session_id}")]
pub async fn abandon_quiz(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, session_id) = path.into_inner();
    state.quiz_service.abandon(&user_id, &session_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Quiz session {} abandoned", session_id),
    }))
}
