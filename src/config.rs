use std::env;

/// Work factor used when `BCRYPT_COST` is absent or invalid.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Realm advertised in the `WWW-Authenticate` challenge.
pub const DEFAULT_REALM: &str = "Realm";

/// AppConfig
///
/// Holds the application's configuration state. Immutable once loaded and pulled
/// into handlers and middleware via FromRef, like every other piece of the
/// unified application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and the user store backend.
    pub env: Env,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Postgres connection string. None selects the in-memory user store.
    pub db_url: Option<String>,
    // bcrypt work factor for the password encoder.
    pub bcrypt_cost: u32,
    // Realm name sent back with 401 challenges.
    pub realm: String,
}

/// Env
///
/// Defines the runtime context: human-readable logs and an optional in-memory
/// user store locally, JSON logs and a mandatory database in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Provides a safe, non-panicking AppConfig primarily used for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:0".to_string(),
            db_url: None,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            realm: DEFAULT_REALM.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables at startup.
    ///
    /// # Panics
    /// Panics when running in production without `DATABASE_URL`. A production
    /// instance must never fall back to the volatile in-memory user store.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").unwrap_or_default().as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let db_url = match env {
            Env::Production => Some(
                env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
            ),
            Env::Local => env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
        };

        Self {
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            db_url,
            bcrypt_cost: parse_bcrypt_cost(env::var("BCRYPT_COST").ok().as_deref()),
            realm: env::var("AUTH_REALM").unwrap_or_else(|_| DEFAULT_REALM.to_string()),
        }
    }
}

/// Accepts the work factors bcrypt supports (4..=31); anything else falls back
/// to the default.
fn parse_bcrypt_cost(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return DEFAULT_BCRYPT_COST;
    };

    match raw.trim().parse::<u32>() {
        Ok(cost) if (4..=31).contains(&cost) => cost,
        _ => {
            tracing::warn!(value = raw, "invalid BCRYPT_COST, using {}", DEFAULT_BCRYPT_COST);
            DEFAULT_BCRYPT_COST
        }
    }
}
