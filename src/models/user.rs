use sqlx::any::Any;
use sqlx::{AnyConnection, Executor, FromRow};

use crate::db;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Lowercases the domain part of an address, leaving the local part alone.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

impl User {
    pub async fn find_by_id<'e>(
        executor: impl Executor<'e, Database = Any>,
        id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, email, name, password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_email<'e>(
        executor: impl Executor<'e, Database = Any>,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, email, name, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    pub async fn create(
        conn: &mut AnyConnection,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let result = sqlx::query("INSERT INTO users (email, name, password_hash) VALUES (?, ?, ?)")
            .bind(email)
            .bind(name)
            .bind(password_hash)
            .execute(&mut *conn)
            .await?;

        let id = db::inserted_id(conn, result.last_insert_id()).await?;
        Ok(User {
            id,
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    pub async fn save<'e>(&self, executor: impl Executor<'e, Database = Any>) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET email = ?, name = ?, password_hash = ? WHERE id = ?")
            .bind(&self.email)
            .bind(&self.name)
            .bind(&self.password_hash)
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_domain_is_lowercased() {
        assert_eq!(normalize_email("Test@EXAMPLE.com"), "Test@example.com");
        assert_eq!(normalize_email("  a@B.org "), "a@b.org");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[actix_web::test]
    async fn create_and_look_up() {
        let pool = crate::test_support::test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let user = User::create(&mut conn, "cook@example.com", "Cook", "hash")
            .await
            .unwrap();
        drop(conn);

        let by_email = User::find_by_email(&pool, "cook@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let mut renamed = by_email.clone();
        renamed.name = "Chef".into();
        renamed.save(&pool).await.unwrap();

        let by_id = User::find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Chef");
        assert!(User::find_by_id(&pool, user.id + 100).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn second_account_with_same_email_is_a_unique_violation() {
        let pool = crate::test_support::test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let first = User::create(&mut conn, "dup@example.com", "One", "hash").await.unwrap();
        let second = User::create(&mut conn, "other@example.com", "Two", "hash").await.unwrap();
        assert_ne!(first.id, second.id);

        let err = User::create(&mut conn, "dup@example.com", "Three", "hash")
            .await
            .unwrap_err();
        assert!(db::is_unique_violation(&err));
    }
}
