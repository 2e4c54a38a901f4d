use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{CreateStatBody, StatKeyBody, StatsEnvelope, UpdateStatBody},
    repo_types::UserStats,
    services::{self, STAT_CREATED, STAT_DELETED, STAT_NOT_FOUND, STAT_UPDATED},
};
use crate::{
    auth::{extractors::CurrentUser, repo_types::User},
    error::{ApiError, ApiResult, MessageBody},
    extract::ApiJson,
    state::AppState,
};

pub const NOT_OWNER: &str = "user_id does not belong to the current session";

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/create_user_stat", post(create_user_stat))
        .route("/create_user_stats", post(create_user_stat))
        .route("/get_user_stats", get(get_user_stats))
        .route("/get_user_stat", get(get_user_stat))
        .route("/update_user_stat", put(update_user_stat))
        .route("/update_user_stats", put(update_user_stat))
        .route("/delete_user_stat", delete(delete_user_stat))
        .route("/delete_user_stats", delete(delete_user_stat))
}

/// Stats are always scoped to the session's user; a body naming someone
/// else is refused.
fn owner_id(user: &User, claimed: Option<i64>) -> ApiResult<i64> {
    match claimed {
        Some(other) if other != user.id => {
            warn!(user_id = user.id, claimed = other, "stats access for another user");
            Err(ApiError::Forbidden(NOT_OWNER.into()))
        }
        _ => Ok(user.id),
    }
}

#[instrument(skip_all)]
pub async fn create_user_stat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<StatsEnvelope<CreateStatBody>>,
) -> ApiResult<(StatusCode, Json<MessageBody<UserStats>>)> {
    let body = body.user_stats_dict;
    let user_id = owner_id(&user, body.user_id)?;
    let stat = services::create(&state.db, user_id, body.validate()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageBody::with_data(STAT_CREATED, stat)),
    ))
}

#[instrument(skip_all)]
pub async fn get_user_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<UserStats>>> {
    let stats = services::get_all(&state.db, user.id).await?;
    Ok(Json(stats))
}

#[instrument(skip_all)]
pub async fn get_user_stat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<StatsEnvelope<StatKeyBody>>,
) -> ApiResult<Json<UserStats>> {
    let key = body.user_stats_dict;
    let user_id = owner_id(&user, key.user_id)?;
    services::get_one(&state.db, user_id, key.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(STAT_NOT_FOUND.into()))
}

#[instrument(skip_all)]
pub async fn update_user_stat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<StatsEnvelope<UpdateStatBody>>,
) -> ApiResult<Json<MessageBody<UserStats>>> {
    let body = body.user_stats_dict;
    let user_id = owner_id(&user, body.user_id)?;
    let stat_id = body.id;
    let stat = services::update(&state.db, user_id, stat_id, body.validate()?).await?;
    Ok(Json(MessageBody::with_data(STAT_UPDATED, stat)))
}

#[instrument(skip_all)]
pub async fn delete_user_stat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<StatsEnvelope<StatKeyBody>>,
) -> ApiResult<Json<MessageBody>> {
    let key = body.user_stats_dict;
    let user_id = owner_id(&user, key.user_id)?;
    services::delete(&state.db, user_id, key.id).await?;
    Ok(Json(MessageBody::new(STAT_DELETED)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        repo_types::UserProfile,
        password::hash_password,
    };
    use crate::stats::repo_types::{NewUserStat, UserStatChanges};
    use axum::{body::Body, http::Request};
    use sqlx::PgPool;
    use time::OffsetDateTime;
    use tower::ServiceExt;

    fn user_with_id(id: i64) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id,
            username: None,
            email: "dan@gmail.com".into(),
            password_hash: String::new(),
            session_id: Some("sid".into()),
            status: Some("active".into()),
            profile_link: None,
            premium: Some(false),
            age: None,
            birthday: None,
            first_name: None,
            last_name: None,
            gender: None,
            phone_number: None,
            height_unit_pref: None,
            weight_unit_pref: None,
            date_format_pref: None,
            language: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_defaults_to_session_user() {
        let user = user_with_id(5);
        assert_eq!(owner_id(&user, None).unwrap(), 5);
        assert_eq!(owner_id(&user, Some(5)).unwrap(), 5);
        assert!(matches!(
            owner_id(&user, Some(6)),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn every_stats_route_requires_a_session() {
        let routes = [
            ("POST", "/create_user_stat"),
            ("POST", "/create_user_stats"),
            ("GET", "/get_user_stats"),
            ("GET", "/get_user_stat"),
            ("PUT", "/update_user_stat"),
            ("DELETE", "/delete_user_stat"),
        ];
        for (method, uri) in routes {
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"user_stats_dict": {"id": 1, "user_id": 99999999, "value": 1, "unit": "kg"}}"#,
                ))
                .unwrap();
            let res = stats_routes()
                .with_state(AppState::fake())
                .oneshot(req)
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    async fn seed_user(pool: &PgPool, email: &str) -> User {
        let hash = hash_password("test_password").unwrap();
        User::create(pool, email, &hash, &UserProfile::default())
            .await
            .unwrap()
    }

    fn kg(value: i32) -> NewUserStat {
        NewUserStat {
            value,
            unit: "kg".into(),
            note: Some("this note is a nice note".into()),
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn create_then_list_in_insertion_order(pool: PgPool) {
        let user = seed_user(&pool, "dan@gmail.com").await;
        let first = services::create(&pool, user.id, kg(1)).await.unwrap();
        let second = services::create(&pool, user.id, kg(2)).await.unwrap();
        assert_eq!(first.created_at, first.updated_at);

        let all = services::get_all(&pool, user.id).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn update_missing_stat_is_not_found_and_mutates_nothing(pool: PgPool) {
        let owner = seed_user(&pool, "owner@gmail.com").await;
        let other = seed_user(&pool, "other@gmail.com").await;
        let stat = services::create(&pool, owner.id, kg(1)).await.unwrap();

        let changes = UserStatChanges {
            value: Some(2),
            unit: Some("lbs".into()),
            note: None,
        };
        let err = services::update(&pool, other.id, stat.id, changes)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == STAT_NOT_FOUND));

        let unchanged = services::get_one(&pool, owner.id, stat.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.value, 1);
        assert_eq!(unchanged.unit, "kg");
        assert_eq!(unchanged.updated_at, stat.updated_at);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn update_overwrites_only_supplied_fields(pool: PgPool) {
        let user = seed_user(&pool, "dan@gmail.com").await;
        let stat = services::create(&pool, user.id, kg(1)).await.unwrap();

        let changes = UserStatChanges {
            value: Some(2),
            unit: Some("lbs".into()),
            note: None,
        };
        let updated = services::update(&pool, user.id, stat.id, changes)
            .await
            .unwrap();
        assert_eq!(updated.value, 2);
        assert_eq!(updated.unit, "lbs");
        assert_eq!(updated.note, stat.note);
        assert!(updated.updated_at >= stat.updated_at);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn update_with_null_note_clears_it(pool: PgPool) {
        let user = seed_user(&pool, "dan@gmail.com").await;
        let stat = services::create(&pool, user.id, kg(1)).await.unwrap();
        assert!(stat.note.is_some());

        let changes = UserStatChanges {
            note: Some(None),
            ..Default::default()
        };
        let updated = services::update(&pool, user.id, stat.id, changes)
            .await
            .unwrap();
        assert_eq!(updated.note, None);
        assert_eq!(updated.value, 1);
        assert_eq!(updated.unit, "kg");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn deleted_stat_is_gone(pool: PgPool) {
        let user = seed_user(&pool, "dan@gmail.com").await;
        let stat = services::create(&pool, user.id, kg(1)).await.unwrap();

        services::delete(&pool, user.id, stat.id).await.unwrap();
        assert!(services::get_one(&pool, user.id, stat.id)
            .await
            .unwrap()
            .is_none());

        let err = services::delete(&pool, user.id, stat.id).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
