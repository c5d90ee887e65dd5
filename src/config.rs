use std::collections::HashMap;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: String,
    pub static_dir: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let host = env_map
            .get("HOST")
            .map(|s| s.as_str())
            .unwrap_or("127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "HOST".to_string(),
                    "must be a valid IP address".to_string(),
                )
            })?;

        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = non_empty_or(&env_map, "DATABASE_PATH", "posts.db")?;
        let static_dir = non_empty_or(&env_map, "STATIC_DIR", "static")?;

        Ok(Config {
            host,
            port,
            database_path,
            static_dir,
        })
    }
}

/// Read an optional variable; when set it must not be blank.
fn non_empty_or(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match env_map.get(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::MissingEnv(key.to_string())),
        Some(value) => Ok(value.clone()),
        None => Ok(default.to_string()),
    }
}
