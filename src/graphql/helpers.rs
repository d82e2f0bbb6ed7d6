use async_graphql::{ErrorExtensions, ID};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Helper to parse a session UUID from a GraphQL ID
pub fn parse_session_id(id: &ID) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::ValidationError("Invalid UUID format".to_string()))
}

/// Converts a service result into a GraphQL result carrying the error code.
pub fn gql<T>(result: AppResult<T>) -> async_graphql::Result<T> {
    result.map_err(|err| err.extend())
}
