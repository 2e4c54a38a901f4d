use sqlx::PgPool;

use crate::auth::repo_types::{User, UserProfile};

const USER_COLUMNS: &str = "id, username, email, password_hash, session_id, status, \
    profile_link, premium, age, birthday, first_name, last_name, gender, phone_number, \
    height_unit_pref, weight_unit_pref, date_format_pref, language, created_at, updated_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user_account WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Find the user currently holding the given raw session id.
    pub async fn find_by_session_id(db: &PgPool, session_id: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user_account WHERE session_id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(session_id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Create a new active user with a hashed password.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        profile: &UserProfile,
    ) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO user_account (
                email, password_hash, status, username, profile_link, premium, age, birthday,
                first_name, last_name, gender, phone_number, height_unit_pref,
                weight_unit_pref, date_format_pref, language
            )
            VALUES ($1, $2, 'active', $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(&profile.username)
            .bind(&profile.profile_link)
            .bind(profile.premium)
            .bind(profile.age)
            .bind(profile.birthday)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(profile.gender)
            .bind(&profile.phone_number)
            .bind(profile.height_unit_pref)
            .bind(profile.weight_unit_pref)
            .bind(profile.date_format_pref)
            .bind(&profile.language)
            .fetch_one(db)
            .await?;
        Ok(user)
    }

    /// Store a freshly issued session id on the user row.
    pub async fn set_session_id(db: &PgPool, user_id: i64, session_id: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE user_account
               SET session_id = $2, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(session_id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Null out the session id; returns false when nobody held it.
    pub async fn clear_session_id(db: &PgPool, session_id: &str) -> anyhow::Result<bool> {
        let done = sqlx::query(
            r#"
            UPDATE user_account
               SET session_id = NULL, updated_at = now()
             WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .execute(db)
        .await?;
        Ok(done.rows_affected() > 0)
    }
}
