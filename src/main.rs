use std::io;

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use log::info;

use recipe_api::config::Config;
use recipe_api::{db, routes};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;
    let pool = db::connect(&config).await.map_err(io::Error::other)?;
    db::migrate(&pool, config.dialect).await.map_err(io::Error::other)?;

    let server_address = config.server_address.clone();
    info!("Server running at http://{}", server_address);

    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .app_data(routes::routes::json_config())
            .app_data(routes::routes::query_config())
            .route("/", web::get().to(|| async { HttpResponse::Ok().body("Hello, this is the recipe API.") }))
            .configure(routes::routes::api_configure)
    })
    .bind(&server_address)?
    .run()
    .await
}
