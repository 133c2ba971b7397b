use sqlx::any::Any;
use sqlx::{AnyConnection, Executor, FromRow};
use uuid::Uuid;

use super::user::User;
use crate::db;

#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub token_key: String,
    pub user_id: i64,
}

impl AuthToken {
    /// Returns the user's existing token, issuing one on first login.
    pub async fn get_or_create(conn: &mut AnyConnection, user_id: i64) -> Result<AuthToken, sqlx::Error> {
        if let Some(token) = AuthToken::find_for_user(&mut *conn, user_id).await? {
            return Ok(token);
        }

        let token = AuthToken {
            token_key: Uuid::new_v4().simple().to_string(),
            user_id,
        };
        let inserted = sqlx::query("INSERT INTO auth_tokens (token_key, user_id) VALUES (?, ?)")
            .bind(&token.token_key)
            .bind(token.user_id)
            .execute(&mut *conn)
            .await;

        match inserted {
            Ok(_) => Ok(token),
            // A concurrent login issued the user's token first.
            Err(e) if db::is_unique_violation(&e) => {
                AuthToken::find_for_user(&mut *conn, user_id).await?.ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn find_for_user<'e>(
        executor: impl Executor<'e, Database = Any>,
        user_id: i64,
    ) -> Result<Option<AuthToken>, sqlx::Error> {
        sqlx::query_as("SELECT token_key, user_id FROM auth_tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_user<'e>(
        executor: impl Executor<'e, Database = Any>,
        key: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            "SELECT u.id, u.email, u.name, u.password_hash
             FROM users u INNER JOIN auth_tokens t ON t.user_id = u.id
             WHERE t.token_key = ?",
        )
        .bind(key)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn token_is_reused_and_resolves_to_user() {
        let pool = crate::test_support::test_pool().await;
        let user = crate::test_support::create_user(&pool, "tok@example.com", "pass1234").await;

        let mut conn = pool.acquire().await.unwrap();
        let first = AuthToken::get_or_create(&mut conn, user.id).await.unwrap();
        let second = AuthToken::get_or_create(&mut conn, user.id).await.unwrap();
        drop(conn);

        assert_eq!(first.token_key, second.token_key);
        assert_eq!(first.token_key.len(), 32);

        let found = AuthToken::find_user(&pool, &first.token_key).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(AuthToken::find_user(&pool, "missing").await.unwrap().is_none());
    }
}
