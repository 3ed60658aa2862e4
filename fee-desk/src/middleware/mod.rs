pub mod auth;
pub mod validated_json;

pub use auth::{Operator, USER_ID_HEADER, USER_ROLE_HEADER};
pub use validated_json::ValidatedJson;
