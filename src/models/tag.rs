use serde::Serialize;
use sqlx::any::Any;
use sqlx::{Acquire, AnyConnection, Executor, FromRow};

use crate::db;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Tag {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub name: String,
}

impl Tag {
    /// Lists the user's tags, newest name first. With `assigned_only` only
    /// tags linked to at least one recipe are returned.
    pub async fn list_for_user<'e>(
        executor: impl Executor<'e, Database = Any>,
        user_id: i64,
        assigned_only: bool,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let sql = if assigned_only {
            "SELECT DISTINCT t.id, t.user_id, t.name
             FROM tags t INNER JOIN recipe_tags rt ON rt.tag_id = t.id
             WHERE t.user_id = ?
             ORDER BY t.name DESC"
        } else {
            "SELECT id, user_id, name FROM tags WHERE user_id = ? ORDER BY name DESC"
        };

        sqlx::query_as(sql).bind(user_id).fetch_all(executor).await
    }

    pub async fn find_for_user<'e>(
        executor: impl Executor<'e, Database = Any>,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as("SELECT id, user_id, name FROM tags WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_name<'e>(
        executor: impl Executor<'e, Database = Any>,
        user_id: i64,
        name: &str,
    ) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as("SELECT id, user_id, name FROM tags WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    /// Inserts a tag. Fails with a unique violation if the user already has
    /// one with this name.
    pub async fn create<'a>(
        conn: impl Acquire<'a, Database = Any>,
        user_id: i64,
        name: &str,
    ) -> Result<Tag, sqlx::Error> {
        let mut conn = conn.acquire().await?;
        let result = sqlx::query("INSERT INTO tags (user_id, name) VALUES (?, ?)")
            .bind(user_id)
            .bind(name)
            .execute(&mut *conn)
            .await?;

        Ok(Tag {
            id: db::inserted_id(&mut *conn, result.last_insert_id()).await?,
            user_id,
            name: name.to_string(),
        })
    }

    pub async fn get_or_create(conn: &mut AnyConnection, user_id: i64, name: &str) -> Result<Tag, sqlx::Error> {
        if let Some(tag) = Tag::find_by_name(&mut *conn, user_id, name).await? {
            return Ok(tag);
        }

        match Tag::create(&mut *conn, user_id, name).await {
            Err(e) if db::is_unique_violation(&e) => {
                // Someone else created it in between.
                Tag::find_by_name(&mut *conn, user_id, name).await?.ok_or(e)
            }
            other => other,
        }
    }

    pub async fn rename<'e>(
        &mut self,
        executor: impl Executor<'e, Database = Any>,
        name: String,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
            .bind(&name)
            .bind(self.id)
            .execute(executor)
            .await?;
        self.name = name;
        Ok(())
    }

    /// Deletes the tag and its recipe links; the recipes stay.
    pub async fn delete(self, conn: &mut AnyConnection) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM recipe_tags WHERE tag_id = ?")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn for_recipe<'e>(
        executor: impl Executor<'e, Database = Any>,
        recipe_id: i64,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as(
            "SELECT t.id, t.user_id, t.name
             FROM tags t INNER JOIN recipe_tags rt ON rt.tag_id = t.id
             WHERE rt.recipe_id = ?
             ORDER BY t.name",
        )
        .bind(recipe_id)
        .fetch_all(executor)
        .await
    }
}
