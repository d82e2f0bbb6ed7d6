pub mod graphql_handler;
pub mod health_handler;
pub mod progress_handler;
pub mod quiz_handler;

use actix_web::web;

pub use graphql_handler::{graphiql, graphql};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use progress_handler::{enroll_user, get_cooldown, get_progress, list_tiers, rescan_progress};
pub use quiz_handler::{
    abandon_quiz, advance_quiz, claim_quiz_reward, close_quiz, get_quiz_session, start_quiz,
    submit_quiz,
};

/// Registers every route. Expects `web::Data<AppState>` and `web::Data<Schema>`
/// as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(list_tiers)
        .service(enroll_user)
        .service(get_progress)
        .service(rescan_progress)
        .service(get_cooldown)
        .service(start_quiz)
        .service(get_quiz_session)
        .service(advance_quiz)
        .service(submit_quiz)
        .service(claim_quiz_reward)
        .service(close_quiz)
        .service(abandon_quiz)
        .service(graphql)
        .service(graphiql);
}
