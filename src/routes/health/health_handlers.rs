use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde_json::json;
use sqlx::AnyPool;

pub async fn health_check(pool: web::Data<AnyPool>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Err(e) => {
            error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
