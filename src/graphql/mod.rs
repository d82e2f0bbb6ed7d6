pub mod helpers;
pub mod schema;

pub use schema::{create_schema, MutationRoot, QueryRoot, Schema};
