use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::{
    repo,
    repo_types::{NewUserStat, UserStatChanges, UserStats},
};
use crate::error::ApiError;

pub const STAT_CREATED: &str = "User stats created successfully";
pub const STAT_UPDATED: &str = "User stat updated successfully";
pub const STAT_DELETED: &str = "User stat deleted successfully";
pub const STAT_NOT_FOUND: &str = "User stat not found";

fn not_found(user_id: i64, stat_id: i64) -> ApiError {
    warn!(user_id, stat_id, "user stat not found");
    ApiError::NotFound(STAT_NOT_FOUND.into())
}

pub async fn get_one(db: &PgPool, user_id: i64, stat_id: i64) -> anyhow::Result<Option<UserStats>> {
    repo::get_one(db, user_id, stat_id).await
}

pub async fn get_all(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<UserStats>> {
    repo::list_by_user(db, user_id).await
}

pub async fn create(db: &PgPool, user_id: i64, stat: NewUserStat) -> Result<UserStats, ApiError> {
    let row = repo::insert(db, user_id, &stat, OffsetDateTime::now_utc()).await?;
    info!(user_id, stat_id = row.id, "user stat created");
    Ok(row)
}

/// Last write wins; a missing `(user_id, id)` mutates nothing.
pub async fn update(
    db: &PgPool,
    user_id: i64,
    stat_id: i64,
    changes: UserStatChanges,
) -> Result<UserStats, ApiError> {
    let row = repo::update(db, user_id, stat_id, &changes, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| not_found(user_id, stat_id))?;
    info!(user_id, stat_id, "user stat updated");
    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: i64, stat_id: i64) -> Result<(), ApiError> {
    if !repo::delete(db, user_id, stat_id).await? {
        return Err(not_found(user_id, stat_id));
    }
    info!(user_id, stat_id, "user stat deleted");
    Ok(())
}
