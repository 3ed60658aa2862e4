use crate::models::Role;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use desk_core::error::AppError;

pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_ID_HEADER: &str = "x-user-id";

/// The operator behind a console request.
///
/// Role and user id are asserted by the auth gateway in front of this
/// service. The bearer token, when present, is forwarded to the fee API.
#[derive(Debug, Clone)]
pub struct Operator {
    pub role: Role,
    pub user_id: Option<String>,
    pub token: Option<String>,
}

impl Operator {
    /// Who a new payment is attributed to. Admin collections carry no
    /// attribution unless the draft names one.
    pub fn collected_by(&self) -> Option<&str> {
        if self.role.is_admin() {
            None
        } else {
            self.user_id.as_deref()
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for Operator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = header(parts, USER_ROLE_HEADER)
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing x-user-role header")))?
            .parse::<Role>()
            .map_err(|e| AppError::Unauthorized(e.into()))?;

        let user_id = header(parts, USER_ID_HEADER).map(str::to_string);
        let token = header(parts, AUTHORIZATION.as_str())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        tracing::Span::current().record("role", role.as_str());

        Ok(Operator {
            role,
            user_id,
            token,
        })
    }
}
