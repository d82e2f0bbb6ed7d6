use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_answer_is_an_option"))]
pub struct TriviaQuestion {
    #[validate(length(min = 1))]
    pub prompt: String,
    #[validate(length(min = 1))]
    pub options: Vec<String>,
    pub answer: String,
}

fn validate_answer_is_an_option(question: &TriviaQuestion) -> Result<(), ValidationError> {
    if question.options.iter().any(|option| option == &question.answer) {
        Ok(())
    } else {
        Err(ValidationError::new("answer_not_in_options"))
    }
}

impl TriviaQuestion {
    pub fn new(prompt: &str, options: &[&str], answer: &str) -> Self {
        TriviaQuestion {
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn is_correct(&self, selected: &str) -> bool {
        self.answer == selected
    }
}
