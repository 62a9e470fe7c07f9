mod sign_in;
mod sign_out;
mod sign_up;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign-up", get(sign_up::page).post(sign_up::submit))
        .route("/sign-in", get(sign_in::page).post(sign_in::submit))
        .route("/sign-out", get(sign_out::sign_out))
}

/// Outcome of creating a credential record.
pub(crate) enum NewUser {
    Created(String),
    EmailTaken,
}

pub(crate) async fn create_user(
    db_pool: &SqlitePool,
    email: &str,
    password: &str,
) -> AppResult<NewUser> {
    let id = Uuid::now_v7().to_string();
    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let res = sqlx::query("INSERT INTO users (id, email, password_hash) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(email)
        .bind(&password_hash)
        .execute(db_pool)
        .await;

    match res {
        Ok(_) => {
            tracing::info!(%email, "registered");
            Ok(NewUser::Created(id))
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(NewUser::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

/// Checks credentials. Unknown email and wrong password are
/// indistinguishable to the caller.
pub(crate) async fn verify_user(
    db_pool: &SqlitePool,
    email: &str,
    password: &str,
) -> AppResult<Option<String>> {
    let Some((id, password_hash)) =
        sqlx::query_as::<_, (String, String)>("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(db_pool)
            .await?
    else {
        return Ok(None);
    };

    if bcrypt::verify(password, &password_hash)? {
        Ok(Some(id))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_round_trips() {
        let pool = test_pool().await;

        let NewUser::Created(id) = create_user(&pool, "alice@x.com", "hunter22").await.unwrap()
        else {
            panic!("fresh email rejected");
        };

        let verified = verify_user(&pool, "alice@x.com", "hunter22").await.unwrap();
        assert_eq!(verified, Some(id));
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_as_taken() {
        let pool = test_pool().await;

        assert!(matches!(
            create_user(&pool, "alice@x.com", "hunter22").await.unwrap(),
            NewUser::Created(_)
        ));
        assert!(matches!(
            create_user(&pool, "alice@x.com", "other-password").await.unwrap(),
            NewUser::EmailTaken
        ));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_both_fail() {
        let pool = test_pool().await;
        create_user(&pool, "alice@x.com", "hunter22").await.unwrap();

        assert!(verify_user(&pool, "alice@x.com", "wrong").await.unwrap().is_none());
        assert!(verify_user(&pool, "bob@x.com", "hunter22").await.unwrap().is_none());
    }
}
