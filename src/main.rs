use actix_cors::Cors;
use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::{
    configs::connect_database,
    constants::Env,
    modules::{
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        user::{repository_pg::UserRepositoryPg, service::UserService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

#[actix_web::get("/")]
async fn health_check(db_pool: web::Data<sqlx::PgPool>) -> actix_web::HttpResponse {
    match sqlx::query("SELECT 1").execute(db_pool.get_ref()).await {
        Ok(_) => actix_web::HttpResponse::Ok().body("Server is running"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            actix_web::HttpResponse::ServiceUnavailable().body("Database unavailable")
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let env = Env::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;

    let db_pool = connect_database(&env).await.map_err(|e| {
        tracing::error!("Database connection error: {:?}", e);
        std::io::Error::other("Database connection error")
    })?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));

    let user_service = UserService::with_dependencies(user_repo.clone());
    let friend_service = FriendService::with_dependencies(friend_repo, user_repo);

    let bind = (env.ip.clone(), env.port);
    let env = web::Data::new(env);

    tracing::info!("Starting server at http://{}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&env.frontend_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(env.clone())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .configure(modules::configure)
    })
    .bind(bind)?
    .workers(2)
    .run()
    .await
}
