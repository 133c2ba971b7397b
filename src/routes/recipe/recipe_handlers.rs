use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;
use sqlx::{AnyConnection, AnyPool};

use super::recipe_models::{RecipeDetail, RecipePayload, RecipeQuery, RecipeSummary};
use crate::errors::ApiError;
use crate::models::recipe::Recipe;
use crate::models::tag::Tag;
use crate::routes::auth::AuthenticatedUser;

/// Links to each collection the router serves.
pub async fn api_root(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let url = |name: &str| {
        req.url_for_static(name)
            .map(|url| url.to_string())
            .map_err(|e| ApiError::Internal(format!("cannot build url for {}: {}", name, e)))
    };

    Ok(HttpResponse::Ok().json(json!({
        "recipes": url("recipe-list")?,
        "tags": url("tag-list")?,
    })))
}

pub async fn list_recipes(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    query: web::Query<RecipeQuery>,
) -> Result<HttpResponse, ApiError> {
    let tag_ids = query.tag_ids()?;
    let mut conn = pool.acquire().await?;

    let recipes = Recipe::list_for_user(&mut *conn, user.id, &tag_ids).await?;
    let mut body = Vec::with_capacity(recipes.len());
    for recipe in &recipes {
        let tags = Tag::for_recipe(&mut *conn, recipe.id).await?;
        body.push(RecipeSummary::new(recipe, tags));
    }

    Ok(HttpResponse::Ok().json(body))
}

pub async fn create_recipe(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    req: web::Json<RecipePayload>,
) -> Result<HttpResponse, ApiError> {
    let changes = req.into_inner().validate(false)?;

    let mut recipe = Recipe::new(user.id);
    let tag_names = changes.apply(&mut recipe);

    let mut tx = pool.begin().await?;
    recipe.insert(&mut *tx).await?;
    if let Some(names) = tag_names {
        assign_tags(&mut tx, &recipe, &names).await?;
    }
    let detail = load_detail(&mut tx, recipe).await?;
    tx.commit().await?;

    info!("User {} created recipe {}", user.id, detail.summary.id);
    Ok(HttpResponse::Created().json(detail))
}

pub async fn retrieve_recipe(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let mut conn = pool.acquire().await?;
    let recipe = Recipe::find_for_user(&mut *conn, path.into_inner(), user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(load_detail(&mut conn, recipe).await?))
}

pub async fn update_recipe(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<RecipePayload>,
) -> Result<HttpResponse, ApiError> {
    save_recipe(&pool, &user, path.into_inner(), req.into_inner(), false).await
}

pub async fn partial_update_recipe(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<RecipePayload>,
) -> Result<HttpResponse, ApiError> {
    save_recipe(&pool, &user, path.into_inner(), req.into_inner(), true).await
}

async fn save_recipe(
    pool: &AnyPool,
    user: &AuthenticatedUser,
    id: i64,
    payload: RecipePayload,
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    let mut tx = pool.begin().await?;
    let mut recipe = Recipe::find_for_user(&mut *tx, id, user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let tag_names = payload.validate(partial)?.apply(&mut recipe);
    recipe.save(&mut *tx).await?;
    if let Some(names) = tag_names {
        assign_tags(&mut tx, &recipe, &names).await?;
    }
    let detail = load_detail(&mut tx, recipe).await?;
    tx.commit().await?;

    info!("User {} updated recipe {}", user.id, id);
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn delete_recipe(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let mut tx = pool.begin().await?;
    let recipe = Recipe::find_for_user(&mut *tx, id, user.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    recipe.delete(&mut tx).await?;
    tx.commit().await?;

    info!("User {} deleted recipe {}", user.id, id);
    Ok(HttpResponse::NoContent().finish())
}

/// Resolves names to the owner's tags, creating missing ones, and makes
/// them the recipe's full tag set.
async fn assign_tags(conn: &mut AnyConnection, recipe: &Recipe, names: &[String]) -> Result<(), ApiError> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(Tag::get_or_create(conn, recipe.user_id, name).await?.id);
    }
    recipe.set_tags(conn, &ids).await?;
    Ok(())
}

async fn load_detail(conn: &mut AnyConnection, recipe: Recipe) -> Result<RecipeDetail, ApiError> {
    let tags = Tag::for_recipe(&mut *conn, recipe.id).await?;
    Ok(RecipeDetail::new(recipe, tags))
}
