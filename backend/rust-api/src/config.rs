use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// When unset the service keeps games in memory.
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub leaderboard_size: usize,
    /// `user:password` expected on `/metrics`.
    pub metrics_auth: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let bind_addr = settings
            .get_string("server.bind_addr")
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let jwt_secret = match settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
        {
            Ok(secret) => secret,
            Err(_) if env == "prod" => {
                return Err(config::ConfigError::Message(
                    "JWT_SECRET must be set in production".to_string(),
                ))
            }
            Err(_) => {
                tracing::warn!("Using default JWT secret (dev mode only)");
                "dev-secret-only-for-local-testing".to_string()
            }
        };

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .ok()
            .filter(|uri| !uri.is_empty());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "quizroom".to_string());

        let leaderboard_size = match settings.get_int("quiz.leaderboard_size") {
            Ok(size) if size > 0 => size as usize,
            Ok(size) => {
                return Err(config::ConfigError::Message(format!(
                    "quiz.leaderboard_size must be positive, got {}",
                    size
                )))
            }
            Err(_) => 5,
        };

        let metrics_auth = settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
            .unwrap_or_else(|_| "admin:changeme".to_string());

        Ok(Config {
            bind_addr,
            jwt_secret,
            mongo_uri,
            mongo_database,
            leaderboard_size,
            metrics_auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        for key in [
            "APP_ENV",
            "APP__QUIZ__LEADERBOARD_SIZE",
            "APP__SERVER__BIND_ADDR",
            "APP__AUTH__JWT_SECRET",
            "JWT_SECRET",
            "MONGO_URI",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_without_environment() {
        clear();
        let config = Config::load().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8081");
        assert_eq!(config.leaderboard_size, 5);
        assert!(config.mongo_uri.is_none());
    }

    #[test]
    #[serial]
    fn environment_overrides() {
        clear();
        env::set_var("APP__QUIZ__LEADERBOARD_SIZE", "3");
        env::set_var("APP__SERVER__BIND_ADDR", "127.0.0.1:9000");
        let config = Config::load().unwrap();
        assert_eq!(config.leaderboard_size, 3);
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        clear();
    }

    #[test]
    #[serial]
    fn production_requires_jwt_secret() {
        clear();
        env::set_var("APP_ENV", "prod");
        assert!(Config::load().is_err());
        clear();
    }
}
