use actix_web::{
    middleware::from_fn,
    web::{scope, ServiceConfig},
};

use crate::middlewares::authentication;

pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    #[cfg(test)]
    pub mod repository_memory;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod friend {
    pub mod schema;
    pub mod model;
    pub mod error;
    pub mod repository;
    pub mod repository_pg;
    #[cfg(test)]
    pub mod repository_memory;
    pub mod handle;
    pub mod service;
    pub mod route;
}

/// Every `/api` route requires an authenticated caller.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/api")
            .wrap(from_fn(authentication))
            .configure(user::route::configure)
            .configure(friend::route::configure),
    );
}
