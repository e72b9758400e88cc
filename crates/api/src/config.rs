//! Process configuration, read once at startup.
//!
//! | Env Var                 | Default                 |
//! |-------------------------|-------------------------|
//! | `HOST`                  | `0.0.0.0`               |
//! | `PORT`                  | `3000`                  |
//! | `CORS_ORIGINS`          | `http://localhost:5173` |
//! | `REQUEST_TIMEOUT_SECS`  | `30`                    |
//! | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
//! | `MIN_PASSWORD_LENGTH`   | `8`                     |
//! | `ADMIN_USERNAME`        | unset                   |
//!
//! JWT settings are documented on [`JwtConfig::from_env`].

use std::fmt::Display;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests at shutdown.
    pub shutdown_timeout_secs: u64,
    /// Minimum accepted password length at signup.
    pub min_password_length: usize,
    /// Existing account promoted to admin at startup.
    pub admin_username: Option<String>,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// # Panics
    ///
    /// Panics when a variable is set but does not parse, or when the JWT
    /// settings are incomplete.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(&env_or(
                "CORS_ORIGINS",
                "http://localhost:5173".to_string(),
            )),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            min_password_length: env_or("MIN_PASSWORD_LENGTH", 8),
            admin_username: std::env::var("ADMIN_USERNAME")
                .ok()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Read `key` and parse it, or fall back to `default` when unset.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_setting(key, &raw),
        Err(_) => default,
    }
}

fn parse_setting<T>(key: &str, raw: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{key} has invalid value '{raw}': {e}"))
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blanks_dropped() {
        let origins = parse_origins(" http://a.test ,, http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn empty_origin_list() {
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn settings_parse_with_surrounding_whitespace() {
        let port: u16 = parse_setting("PORT", " 8080 ");
        assert_eq!(port, 8080);
    }

    #[test]
    #[should_panic(expected = "PORT has invalid value 'eighty'")]
    fn bad_setting_names_the_variable() {
        let _: u16 = parse_setting("PORT", "eighty");
    }

    #[test]
    fn unset_variable_uses_default() {
        let value: u64 = env_or("DOCBUILDER_TEST_SURELY_UNSET_VAR", 42);
        assert_eq!(value, 42);
    }
}
