use super::{ApiError, GatewayState};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

/// The single user allowed to submit orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Checks an `Authorization` header value against these credentials.
    pub fn verify(&self, header: Option<&str>) -> bool {
        header
            .and_then(decode_basic)
            .is_some_and(|(user, password)| user == self.user && password == self.password)
    }
}

fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Rejects requests without valid Basic credentials before any handler runs.
pub async fn basic_auth(State(state): State<GatewayState>, request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if !state.credentials.verify(header) {
        return ApiError::Unauthorized.into_response();
    }

    debug!("request for order authenticated");
    next.run(request).await
}
