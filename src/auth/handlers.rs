use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{CreateUserRequest, LoginRequest},
        extractors::{session_id_from_jar, CurrentUser},
        services::{self, is_valid_email},
        session::SessionKeys,
    },
    error::{ApiError, ApiResult, MessageBody},
    extract::ApiJson,
    state::AppState,
};

pub const USER_CREATED: &str = "User created successfully";
pub const LOGIN_OK: &str = "Login successful";
pub const LOGOUT_OK: &str = "Logout successful";
pub const NOT_LOGGED_IN: &str = "User not logged in";
pub const AUTHENTICATED: &str = "User Authenticated";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/create_user", post(create_user))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user_authenticated", get(user_authenticated))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<MessageBody>)> {
    let account = payload.validate().map_err(|e| {
        warn!("create_user validation failed");
        e
    })?;
    services::create_account(&state.db, account).await?;
    Ok((StatusCode::CREATED, Json(MessageBody::new(USER_CREATED))))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(mut payload): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<MessageBody>)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    let Some(login) =
        services::attempt_login(&state.db, &payload.email, &payload.password).await?
    else {
        return Err(ApiError::InvalidCredentials);
    };

    let sealed = state.cipher.encrypt(&login.session_id)?;
    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(&sealed)?;

    info!(user_id = login.user.id, email = %login.user.email, "user logged in");
    Ok((jar.add(keys.cookie(token)), Json(MessageBody::new(LOGIN_OK))))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<MessageBody>)> {
    let Some(session_id) = session_id_from_jar(&jar, &state) else {
        return Err(ApiError::BadRequest(NOT_LOGGED_IN.into()));
    };

    if !services::attempt_logout(&state.db, &session_id).await? {
        return Err(ApiError::BadRequest(NOT_LOGGED_IN.into()));
    }

    Ok((
        jar.remove(SessionKeys::removal_cookie()),
        Json(MessageBody::new(LOGOUT_OK)),
    ))
}

#[instrument(skip_all)]
pub async fn user_authenticated(CurrentUser(user): CurrentUser) -> Json<MessageBody> {
    info!(user_id = user.id, "session check");
    Json(MessageBody::new(AUTHENTICATED))
}
