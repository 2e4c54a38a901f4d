use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One personal record owned by a user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserStats {
    pub id: i64,
    pub user_id: i64,
    pub value: i32,
    pub unit: String,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUserStat {
    pub value: i32,
    pub unit: String,
    pub note: Option<String>,
}

/// Fields left as `None` keep their stored value. `note: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UserStatChanges {
    pub value: Option<i32>,
    pub unit: Option<String>,
    pub note: Option<Option<String>>,
}
