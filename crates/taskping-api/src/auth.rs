// Session-token authentication
// Decision: Bearer header for programmatic access, cookie for the browser client
//
// The pipeline only needs "is this request a logged-in user, and which
// one" - account management itself lives outside this service.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use taskping_core::{NotifyError, Result};
use taskping_storage::{hash_session_token, Database};

/// Cookie carrying the session token for browser callers
pub const SESSION_COOKIE: &str = "taskping_session";

/// Authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Caller identification seam
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, headers: &HeaderMap, jar: &CookieJar) -> Result<AuthUser>;
}

/// Database-backed session lookup (bearer header or session cookie)
#[derive(Clone)]
pub struct DbSessionAuth {
    db: Arc<Database>,
}

impl DbSessionAuth {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Authenticator for DbSessionAuth {
    async fn authenticate(&self, headers: &HeaderMap, jar: &CookieJar) -> Result<AuthUser> {
        let token = bearer_token(headers)
            .map(str::to_string)
            .or_else(|| jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()))
            .ok_or(NotifyError::Forbidden)?;

        // Expired sessions are filtered out by the lookup itself.
        let session = self
            .db
            .find_auth_session(&hash_session_token(&token))
            .await
            .map_err(|e| NotifyError::store(e.to_string()))?
            .ok_or(NotifyError::Forbidden)?;

        Ok(AuthUser {
            user_id: session.user_id,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tp_abc"),
        );
        assert_eq!(bearer_token(&headers), Some("tp_abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(bearer_token(&headers).is_none());
    }
}
