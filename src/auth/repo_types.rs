use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,      // Argon2 hash, never leaves the service
    pub session_id: Option<String>, // raw session id; NULL when logged out
    pub status: Option<String>,
    pub profile_link: Option<String>,
    pub premium: Option<bool>,
    pub age: Option<i32>,
    pub birthday: Option<Date>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub height_unit_pref: Option<String>,
    pub weight_unit_pref: Option<String>,
    pub date_format_pref: Option<String>,
    pub language: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Optional profile attributes supplied at registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub username: Option<String>,
    pub profile_link: Option<String>,
    pub premium: bool,
    pub age: Option<i32>,
    pub birthday: Option<Date>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<&'static str>,
    pub phone_number: Option<String>,
    pub height_unit_pref: Option<&'static str>,
    pub weight_unit_pref: Option<&'static str>,
    pub date_format_pref: Option<&'static str>,
    pub language: Option<String>,
}
