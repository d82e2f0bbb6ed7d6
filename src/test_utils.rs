use crate::models::domain::{TriviaQuestion, UserProgress};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A stored user with the given balance and cached tier.
    pub fn user_with_balance(user_id: &str, balance: u64, tier_index: u32) -> UserProgress {
        UserProgress::new(user_id).with_balance(balance, tier_index)
    }

    /// Three questions whose correct answers are "4", "Paris" and "Blue".
    pub fn sample_questions() -> Vec<TriviaQuestion> {
        vec![
            TriviaQuestion::new("What is 2 + 2?", &["3", "4", "5", "22"], "4"),
            TriviaQuestion::new(
                "What is the capital of France?",
                &["London", "Paris", "Rome", "Berlin"],
                "Paris",
            ),
            TriviaQuestion::new(
                "What colour is a clear daytime sky?",
                &["Green", "Blue", "Red", "Yellow"],
                "Blue",
            ),
        ]
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_sample_questions_are_valid() {
        use validator::Validate;

        let questions = sample_questions();
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|question| question.validate().is_ok()));
    }

    #[test]
    fn test_user_with_balance() {
        let user = user_with_balance("user-1", 42, 0);
        assert_eq!(user.user_id, "user-1");
        assert_eq!(user.balance, 42);
        assert!(user.last_quiz_attempt.is_none());
    }
}
