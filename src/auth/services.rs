use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{
    dto::NewAccount,
    password::{hash_password, verify_password},
    repo_types::User,
};
use crate::error::ApiError;

pub const EMAIL_TAKEN: &str = "Email already associated with an account";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}

/// Registers a new active account. The email must not be in use.
pub async fn create_account(db: &PgPool, account: NewAccount) -> Result<User, ApiError> {
    if User::find_by_email(db, &account.email).await?.is_some() {
        warn!(email = %account.email, "email already registered");
        return Err(ApiError::AlreadyExists(EMAIL_TAKEN.into()));
    }

    let hash = hash_password(&account.password)?;
    match User::create(db, &account.email, &hash, &account.profile).await {
        Ok(user) => {
            info!(user_id = user.id, email = %user.email, "user registered");
            Ok(user)
        }
        // Lost a race with a concurrent registration of the same email.
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %account.email, "email registered concurrently");
            Err(ApiError::AlreadyExists(EMAIL_TAKEN.into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// A successful login: the user and the session id just stored for them.
#[derive(Debug)]
pub struct LoginSession {
    pub user: User,
    pub session_id: String,
}

/// Verifies credentials and rotates the user's session id.
/// Returns `None` for an unknown email or a wrong password.
pub async fn attempt_login(
    db: &PgPool,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<LoginSession>> {
    let Some(mut user) = User::find_by_email(db, email).await? else {
        warn!(email = %email, "login unknown email");
        return Ok(None);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Ok(None);
    }

    let session_id = new_session_id();
    User::set_session_id(db, user.id, &session_id).await?;
    user.session_id = Some(session_id.clone());
    debug!(user_id = user.id, "session id rotated");

    Ok(Some(LoginSession { user, session_id }))
}

/// Clears the session id; `false` when no user holds it.
pub async fn attempt_logout(db: &PgPool, session_id: &str) -> anyhow::Result<bool> {
    let cleared = User::clear_session_id(db, session_id).await?;
    if cleared {
        info!("user logged out");
    } else {
        warn!("logout for unknown session");
    }
    Ok(cleared)
}
