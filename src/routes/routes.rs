use actix_web::web;

use crate::errors::ApiError;

use super::health::health_handlers;
use super::recipe::recipe_handlers;
use super::tag::tag_handlers;
use super::user::user_handlers;

/// Malformed JSON bodies answer with `{"detail": ...}` instead of plain text.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(format!("JSON parse error - {}", err)).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(format!("Invalid query string - {}", err)).into())
}

pub fn health_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/health-check/").route(web::get().to(health_handlers::health_check)),
    );
}

pub fn user_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/user")
            .service(web::resource("/create/").route(web::post().to(user_handlers::create_user)))
            .service(web::resource("/token/").route(web::post().to(user_handlers::create_token)))
            .service(
                web::resource("/me/")
                    .route(web::get().to(user_handlers::me))
                    .route(web::put().to(user_handlers::update_me))
                    .route(web::patch().to(user_handlers::partial_update_me)),
            ),
    );
}

/// The recipe app's router: the API root plus one list and one detail
/// resource per viewset.
pub fn recipe_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/recipe")
            .service(
                web::resource("/")
                    .name("api-root")
                    .route(web::get().to(recipe_handlers::api_root)),
            )
            .service(
                web::resource("/recipes/")
                    .name("recipe-list")
                    .route(web::get().to(recipe_handlers::list_recipes))
                    .route(web::post().to(recipe_handlers::create_recipe)),
            )
            .service(
                web::resource("/recipes/{id}/")
                    .name("recipe-detail")
                    .route(web::get().to(recipe_handlers::retrieve_recipe))
                    .route(web::put().to(recipe_handlers::update_recipe))
                    .route(web::patch().to(recipe_handlers::partial_update_recipe))
                    .route(web::delete().to(recipe_handlers::delete_recipe)),
            )
            .service(
                web::resource("/tags/")
                    .name("tag-list")
                    .route(web::get().to(tag_handlers::list_tags))
                    .route(web::post().to(tag_handlers::create_tag)),
            )
            .service(
                web::resource("/tags/{id}/")
                    .name("tag-detail")
                    .route(web::get().to(tag_handlers::retrieve_tag))
                    .route(web::put().to(tag_handlers::update_tag))
                    .route(web::patch().to(tag_handlers::partial_update_tag))
                    .route(web::delete().to(tag_handlers::delete_tag)),
            ),
    );
}

pub fn api_configure(cfg: &mut web::ServiceConfig) {
    health_configure(cfg);
    user_configure(cfg);
    recipe_configure(cfg);
}
