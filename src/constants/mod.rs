use std::str::FromStr;

use crate::api::error::SystemError;

#[derive(Debug, Clone)]
pub struct Env {
    pub jwt_secret: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
}

impl Env {
    pub fn from_env() -> Result<Self, SystemError> {
        let jwt_secret = required("SECRET_KEY")?;
        let database_url = required("DATABASE_URL")?;
        let database_max_connections = parsed("DATABASE_MAX_CONNECTIONS", "5")?;

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed("PORT", "8080")?;

        Ok(Env { jwt_secret, database_url, database_max_connections, frontend_url, ip, port })
    }
}

fn required(key: &str) -> Result<String, SystemError> {
    std::env::var(key).map_err(|_| {
        SystemError::config(format!("{key} must be set in .env file or environment variable"))
    })
}

fn parsed<T: FromStr>(key: &str, default: &str) -> Result<T, SystemError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>().map_err(|_| SystemError::config(format!("{key} has an invalid value: {raw}")))
}
