use actix_web::{get, post, web, HttpResponse};

use crate::{app_state::AppState, errors::AppError};

#[get("/api/tiers")]
pub async fn list_tiers(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.progression_service.tiers())
}

#[post("/api/users/{user_id}")]
pub async fn enroll_user(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let progress = state.progression_service.enroll(&user_id).await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[get("/api/users/{user_id}/progress")]
pub async fn get_progress(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let progress = state.progression_service.get_progress(&user_id).await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[post("/api/users/{user_id}/progress/rescan")]
pub async fn rescan_progress(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let progress = state.progression_service.rescan(&user_id).await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[get("/api/users/{user_id}/cooldown")]
pub async fn get_cooldown(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let cooldown = state.quiz_service.cooldown(&user_id).await?;
    Ok(HttpResponse::Ok().json(cooldown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        repositories::{question_repository::MockQuestionSource, user_repository::MockUserStore},
        test_utils::{fixtures::user_with_balance, test_helpers::assert_error_status},
    };
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    fn state(users: MockUserStore) -> web::Data<AppState> {
        web::Data::new(AppState::from_parts(
            Config::test_config(),
            Arc::new(users),
            Arc::new(MockQuestionSource::new()),
        ))
    }

    #[actix_web::test]
    async fn test_list_tiers() {
        let app = test::init_service(
            App::new()
                .app_data(state(MockUserStore::new()))
                .service(list_tiers),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/tiers").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.as_array().map(Vec::len), Some(10));
        assert_eq!(body[0]["name"], "Bronze");
    }

    #[actix_web::test]
    async fn test_progress_for_unknown_user_is_404() {
        let mut users = MockUserStore::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let app = test::init_service(App::new().app_data(state(users)).service(get_progress)).await;

        let req = test::TestRequest::get()
            .uri("/api/users/ghost/progress")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_error_status(resp.status());
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_progress_reports_tier_and_percent() {
        let mut users = MockUserStore::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(user_with_balance("user-1", 15_000, 1))));
        let app = test::init_service(App::new().app_data(state(users)).service(get_progress)).await;

        let req = test::TestRequest::get()
            .uri("/api/users/user-1/progress")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["tier_name"], "Silver");
        assert_eq!(body["progress_percent"], 50.0);
        assert_eq!(body["points_to_next"], 10_000);
    }

    #[actix_web::test]
    async fn test_cooldown_store_outage_is_503() {
        let mut users = MockUserStore::new();
        users
            .expect_find_by_id()
            .returning(|_| Err(AppError::StoreUnavailable("down".into())));
        let app = test::init_service(App::new().app_data(state(users)).service(get_cooldown)).await;

        let req = test::TestRequest::get()
            .uri("/api/users/user-1/cooldown")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
