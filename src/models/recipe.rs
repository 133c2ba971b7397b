use sqlx::any::Any;
use sqlx::{Acquire, AnyConnection, Executor, FromRow, QueryBuilder};

use super::price::Price;
use crate::db;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub time_minutes: i64,
    pub price_cents: i64,
    pub link: String,
}

const COLUMNS: &str = "r.id, r.user_id, r.title, r.description, r.time_minutes, r.price_cents, r.link";

impl Recipe {
    /// An unsaved recipe owned by `user_id`.
    pub fn new(user_id: i64) -> Self {
        Recipe {
            id: 0,
            user_id,
            title: String::new(),
            description: String::new(),
            time_minutes: 0,
            price_cents: 0,
            link: String::new(),
        }
    }

    pub fn price(&self) -> Price {
        Price::from_cents(self.price_cents)
    }

    /// Lists the user's recipes, newest first. A non-empty `tag_ids` keeps
    /// recipes linked to any of those tags.
    pub async fn list_for_user<'e>(
        executor: impl Executor<'e, Database = Any>,
        user_id: i64,
        tag_ids: &[i64],
    ) -> Result<Vec<Recipe>, sqlx::Error> {
        let mut query = QueryBuilder::<Any>::new(format!("SELECT DISTINCT {} FROM recipes r", COLUMNS));
        if !tag_ids.is_empty() {
            query.push(" INNER JOIN recipe_tags rt ON rt.recipe_id = r.id");
        }
        query.push(" WHERE r.user_id = ").push_bind(user_id);
        if !tag_ids.is_empty() {
            query.push(" AND rt.tag_id IN (");
            let mut ids = query.separated(", ");
            for id in tag_ids {
                ids.push_bind(*id);
            }
            ids.push_unseparated(")");
        }
        query.push(" ORDER BY r.id DESC");

        query.build_query_as().fetch_all(executor).await
    }

    pub async fn find_for_user<'e>(
        executor: impl Executor<'e, Database = Any>,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Recipe>, sqlx::Error> {
        let sql = format!("SELECT {} FROM recipes r WHERE r.id = ? AND r.user_id = ?", COLUMNS);
        sqlx::query_as(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Inserts the recipe and fills in its new id.
    pub async fn insert<'a>(&mut self, conn: impl Acquire<'a, Database = Any>) -> Result<(), sqlx::Error> {
        let mut conn = conn.acquire().await?;
        let result = sqlx::query(
            "INSERT INTO recipes (user_id, title, description, time_minutes, price_cents, link)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(self.user_id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.time_minutes)
        .bind(self.price_cents)
        .bind(&self.link)
        .execute(&mut *conn)
        .await?;

        self.id = db::inserted_id(&mut *conn, result.last_insert_id()).await?;
        Ok(())
    }

    pub async fn save<'e>(&self, executor: impl Executor<'e, Database = Any>) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE recipes
             SET title = ?, description = ?, time_minutes = ?, price_cents = ?, link = ?
             WHERE id = ?",
        )
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.time_minutes)
        .bind(self.price_cents)
        .bind(&self.link)
        .bind(self.id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Replaces the recipe's tag links with `tag_ids`.
    pub async fn set_tags(&self, conn: &mut AnyConnection, tag_ids: &[i64]) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;

        let mut seen = Vec::with_capacity(tag_ids.len());
        for &tag_id in tag_ids {
            if seen.contains(&tag_id) {
                continue;
            }
            seen.push(tag_id);
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
                .bind(self.id)
                .bind(tag_id)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    pub async fn delete(self, conn: &mut AnyConnection) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tag::Tag;

    fn sample(user_id: i64, title: &str) -> Recipe {
        Recipe {
            title: title.to_string(),
            time_minutes: 10,
            price_cents: 550,
            ..Recipe::new(user_id)
        }
    }

    #[actix_web::test]
    async fn insert_then_find_scoped_to_owner() {
        let pool = crate::test_support::test_pool().await;
        let mut recipe = Recipe {
            description: "Chop the vegetables, then simmer for an hour.".into(),
            link: "https://example.com/soup".into(),
            ..sample(1, "Soup")
        };
        recipe.insert(&pool).await.unwrap();
        assert!(recipe.id > 0);

        let found = Recipe::find_for_user(&pool, recipe.id, 1).await.unwrap();
        assert_eq!(found, Some(recipe.clone()));
        assert_eq!(recipe.price().to_string(), "5.50");
        assert!(Recipe::find_for_user(&pool, recipe.id, 2).await.unwrap().is_none());

        let listed = Recipe::list_for_user(&pool, 1, &[]).await.unwrap();
        assert_eq!(listed[0].description, "Chop the vegetables, then simmer for an hour.");
    }

    #[actix_web::test]
    async fn consecutive_inserts_get_distinct_ids() {
        let pool = crate::test_support::test_pool().await;
        let mut first = sample(1, "One");
        let mut second = sample(1, "Two");
        first.insert(&pool).await.unwrap();
        second.insert(&pool).await.unwrap();

        assert!(first.id > 0);
        assert_ne!(first.id, second.id);
        let found = Recipe::find_for_user(&pool, second.id, 1).await.unwrap().unwrap();
        assert_eq!(found.title, "Two");
    }

    #[actix_web::test]
    async fn filter_by_tags_returns_distinct_recipes() {
        let pool = crate::test_support::test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let vegan = Tag::create(&mut *conn, 1, "Vegan").await.unwrap();
        let quick = Tag::create(&mut *conn, 1, "Quick").await.unwrap();

        let mut both = sample(1, "Salad");
        both.insert(&mut *conn).await.unwrap();
        both.set_tags(&mut conn, &[vegan.id, quick.id, vegan.id]).await.unwrap();

        let mut untagged = sample(1, "Steak");
        untagged.insert(&mut *conn).await.unwrap();
        drop(conn);

        let filtered = Recipe::list_for_user(&pool, 1, &[vegan.id, quick.id]).await.unwrap();
        assert_eq!(filtered, vec![both.clone()]);

        let all = Recipe::list_for_user(&pool, 1, &[]).await.unwrap();
        assert_eq!(all, vec![untagged, both.clone()]);

        assert_eq!(Tag::for_recipe(&pool, both.id).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn delete_drops_tag_links_but_keeps_tags() {
        let pool = crate::test_support::test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let tag = Tag::create(&mut *conn, 1, "Dinner").await.unwrap();
        let mut recipe = sample(1, "Curry");
        recipe.insert(&mut *conn).await.unwrap();
        recipe.set_tags(&mut conn, &[tag.id]).await.unwrap();
        let id = recipe.id;
        recipe.delete(&mut conn).await.unwrap();
        drop(conn);

        assert!(Recipe::find_for_user(&pool, id, 1).await.unwrap().is_none());
        assert!(Tag::for_recipe(&pool, id).await.unwrap().is_empty());
        assert!(Tag::list_for_user(&pool, 1, true).await.unwrap().is_empty());
        assert_eq!(Tag::list_for_user(&pool, 1, false).await.unwrap(), vec![tag]);
    }
}
