use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::{
    repo_types::User,
    session::{SessionKeys, SESSION_COOKIE},
};
use crate::{error::ApiError, state::AppState};

/// Resolves the session cookie to the raw session id stored on the user row:
/// verify the signed token, then decrypt the session id it carries.
pub fn session_id_from_jar(jar: &CookieJar, state: &AppState) -> Option<String> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let keys = SessionKeys::from_ref(state);

    let claims = match keys.verify(cookie.value()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "invalid or expired session token");
            return None;
        }
    };

    match state.cipher.decrypt(&claims.sid) {
        Ok(sid) => Some(sid),
        Err(e) => {
            warn!(error = %e, "undecryptable session id");
            None
        }
    }
}

/// The logged-in user behind the request's session cookie.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let session_id = session_id_from_jar(&jar, state).ok_or(ApiError::Unauthorized)?;

        match User::find_by_session_id(&state.db, &session_id).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!("session id not held by any user");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
