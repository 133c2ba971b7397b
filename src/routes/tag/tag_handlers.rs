use actix_web::{web, HttpResponse};
use log::info;
use sqlx::AnyPool;

use super::tag_models::{TagPayload, TagQuery};
use crate::errors::ApiError;
use crate::models::tag::Tag;
use crate::routes::auth::AuthenticatedUser;

const DUPLICATE_NAME: &str = "tag with this name already exists.";

pub async fn list_tags(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    query: web::Query<TagQuery>,
) -> Result<HttpResponse, ApiError> {
    let tags = Tag::list_for_user(pool.get_ref(), user.id, query.assigned_only()).await?;
    Ok(HttpResponse::Ok().json(tags))
}

pub async fn create_tag(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    req: web::Json<TagPayload>,
) -> Result<HttpResponse, ApiError> {
    let name = req
        .into_inner()
        .validate(false)?
        .ok_or_else(|| ApiError::Internal("validated tag has no name".into()))?;

    let tag = Tag::create(pool.get_ref(), user.id, &name)
        .await
        .map_err(|e| ApiError::conflict(e, "name", DUPLICATE_NAME))?;
    info!("User {} created tag {}", user.id, tag.id);
    Ok(HttpResponse::Created().json(tag))
}

pub async fn retrieve_tag(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let tag = Tag::find_for_user(pool.get_ref(), path.into_inner(), user.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(tag))
}

pub async fn update_tag(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<TagPayload>,
) -> Result<HttpResponse, ApiError> {
    save_tag(&pool, &user, path.into_inner(), req.into_inner(), false).await
}

pub async fn partial_update_tag(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<TagPayload>,
) -> Result<HttpResponse, ApiError> {
    save_tag(&pool, &user, path.into_inner(), req.into_inner(), true).await
}

async fn save_tag(
    pool: &AnyPool,
    user: &AuthenticatedUser,
    id: i64,
    payload: TagPayload,
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    let mut tag = Tag::find_for_user(pool, id, user.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let name = payload.validate(partial)?;

    if let Some(name) = name {
        if name != tag.name {
            tag.rename(pool, name)
                .await
                .map_err(|e| ApiError::conflict(e, "name", DUPLICATE_NAME))?;
            info!("User {} renamed tag {}", user.id, tag.id);
        }
    }

    Ok(HttpResponse::Ok().json(tag))
}

pub async fn delete_tag(
    pool: web::Data<AnyPool>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let tag = Tag::find_for_user(pool.get_ref(), path.into_inner(), user.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let id = tag.id;

    let mut tx = pool.begin().await?;
    tag.delete(&mut tx).await?;
    tx.commit().await?;

    info!("User {} deleted tag {}", user.id, id);
    Ok(HttpResponse::NoContent().finish())
}
