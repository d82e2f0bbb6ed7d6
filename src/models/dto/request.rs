use serde::Deserialize;
use validator::Validate;

/// Body of the advance/submit endpoints. A missing or empty selection is a
/// state-machine error, not a validation error, so only the size is checked here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SelectOptionRequest {
    #[validate(length(max = 500))]
    #[serde(default)]
    pub selected_option: Option<String>,
}
