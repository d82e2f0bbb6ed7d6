pub mod progression_service;
pub mod quiz_service;
pub mod session_registry;

pub use progression_service::ProgressionService;
pub use quiz_service::{QuizService, QuizSettings};
pub use session_registry::SessionRegistry;
