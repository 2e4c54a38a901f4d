use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::repo_types::{NewUserStat, UserStatChanges, UserStats};

const STAT_COLUMNS: &str = "id, user_id, value, unit, note, created_at, updated_at";

pub async fn get_one(db: &PgPool, user_id: i64, stat_id: i64) -> anyhow::Result<Option<UserStats>> {
    let sql = format!("SELECT {STAT_COLUMNS} FROM user_stats WHERE user_id = $1 AND id = $2");
    let row = sqlx::query_as::<_, UserStats>(&sql)
        .bind(user_id)
        .bind(stat_id)
        .fetch_optional(db)
        .await
        .context("get user stat")?;
    Ok(row)
}

pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<UserStats>> {
    let sql = format!("SELECT {STAT_COLUMNS} FROM user_stats WHERE user_id = $1 ORDER BY id ASC");
    let rows = sqlx::query_as::<_, UserStats>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list user stats")?;
    Ok(rows)
}

pub async fn insert(
    db: &PgPool,
    user_id: i64,
    stat: &NewUserStat,
    now: OffsetDateTime,
) -> anyhow::Result<UserStats> {
    let sql = format!(
        r#"
        INSERT INTO user_stats (user_id, value, unit, note, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING {STAT_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, UserStats>(&sql)
        .bind(user_id)
        .bind(stat.value)
        .bind(&stat.unit)
        .bind(&stat.note)
        .bind(now)
        .fetch_one(db)
        .await
        .context("insert user stat")?;
    Ok(row)
}

/// Overwrites the supplied fields; `None` when `(user_id, id)` does not exist.
pub async fn update(
    db: &PgPool,
    user_id: i64,
    stat_id: i64,
    changes: &UserStatChanges,
    now: OffsetDateTime,
) -> anyhow::Result<Option<UserStats>> {
    let sql = format!(
        r#"
        UPDATE user_stats
           SET value = COALESCE($3, value),
               unit = COALESCE($4, unit),
               note = CASE WHEN $5 THEN $6 ELSE note END,
               updated_at = $7
         WHERE user_id = $1 AND id = $2
        RETURNING {STAT_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, UserStats>(&sql)
        .bind(user_id)
        .bind(stat_id)
        .bind(changes.value)
        .bind(&changes.unit)
        .bind(changes.note.is_some())
        .bind(changes.note.clone().flatten())
        .bind(now)
        .fetch_optional(db)
        .await
        .context("update user stat")?;
    Ok(row)
}

/// Returns false when `(user_id, id)` does not exist.
pub async fn delete(db: &PgPool, user_id: i64, stat_id: i64) -> anyhow::Result<bool> {
    let done = sqlx::query("DELETE FROM user_stats WHERE user_id = $1 AND id = $2")
        .bind(user_id)
        .bind(stat_id)
        .execute(db)
        .await
        .context("delete user stat")?;
    Ok(done.rows_affected() > 0)
}
