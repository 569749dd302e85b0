use std::{fmt::Display, str::FromStr, time::Duration};

use anyhow::Context;

/// Upper bound for `JWT_TTL_MINUTES` (one year).
pub const MAX_TTL_MINUTES: u64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: u64,
}

impl JwtConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }
}

/// Argon2 cost parameters plus the registration strength rule.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub min_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
            min_length: 8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub production: bool,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub store_timeout_secs: Option<u64>,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parsed(&lookup, "ARGON2_MEMORY_KIB")?.unwrap_or(defaults.memory_kib),
            iterations: parsed(&lookup, "ARGON2_ITERATIONS")?.unwrap_or(defaults.iterations),
            parallelism: parsed(&lookup, "ARGON2_PARALLELISM")?.unwrap_or(defaults.parallelism),
            min_length: parsed(&lookup, "PASSWORD_MIN_LENGTH")?.unwrap_or(defaults.min_length),
        };

        let ttl_minutes = parsed(&lookup, "JWT_TTL_MINUTES")?.unwrap_or(60 * 24);
        if !(1..=MAX_TTL_MINUTES).contains(&ttl_minutes) {
            anyhow::bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}");
        }
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "authgate".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "authgate-users".into()),
            ttl_minutes,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS")?.unwrap_or(10),
            production: lookup("APP_ENV").is_some_and(|v| v == "production"),
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed(&lookup, "APP_PORT")?.unwrap_or(8080),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".into()),
            store_timeout_secs: parsed(&lookup, "STORE_TIMEOUT_SECS")?,
            jwt,
            password,
        })
    }

    pub fn store_timeout(&self) -> Option<Duration> {
        self.store_timeout_secs.map(Duration::from_secs)
    }
}

/// Parses `key` straight into its target type so out-of-range values fail.
fn parsed<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{key} is invalid ({v:?}): {e}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/authgate"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .expect("config should load");

        assert_eq!(cfg.jwt.ttl_minutes, 1440);
        assert_eq!(cfg.jwt.ttl(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(cfg.jwt.issuer, "authgate");
        assert_eq!(cfg.password.min_length, 8);
        assert_eq!(cfg.password.iterations, argon2::Params::DEFAULT_T_COST);
        assert_eq!(cfg.port, 8080);
        assert!(!cfg.production);
        assert!(cfg.store_timeout().is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "k"),
            ("JWT_TTL_MINUTES", "30"),
            ("STORE_TIMEOUT_SECS", "5"),
            ("APP_ENV", "production"),
            ("ARGON2_ITERATIONS", "4"),
        ]))
        .expect("config should load");

        assert_eq!(cfg.jwt.ttl(), Duration::from_secs(30 * 60));
        assert_eq!(cfg.store_timeout(), Some(Duration::from_secs(5)));
        assert!(cfg.production);
        assert_eq!(cfg.password.iterations, 4);
    }

    fn load_with(key: &str, value: &str) -> anyhow::Result<AppConfig> {
        AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "k"),
            (key, value),
        ]))
    }

    #[test]
    fn out_of_range_values_are_rejected_with_their_key() {
        let cases = [
            ("APP_PORT", "70000"),
            ("ARGON2_MEMORY_KIB", "4294967297"),
            ("ARGON2_ITERATIONS", "4294967296"),
            ("ARGON2_PARALLELISM", "-1"),
            ("DB_MAX_CONNECTIONS", "4294967296"),
            ("PASSWORD_MIN_LENGTH", "-8"),
            ("STORE_TIMEOUT_SECS", "18446744073709551616"),
            ("JWT_TTL_MINUTES", "18446744073709551616"),
        ];
        for (key, value) in cases {
            let err = load_with(key, value).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={value}: {err}");
        }
    }

    #[test]
    fn ttl_must_be_within_bounds() {
        for value in ["0", "1000000000000000", &(MAX_TTL_MINUTES + 1).to_string()] {
            let err = load_with("JWT_TTL_MINUTES", value).unwrap_err();
            assert!(err.to_string().contains("JWT_TTL_MINUTES"), "{value}: {err}");
        }
        let cfg = load_with("JWT_TTL_MINUTES", &MAX_TTL_MINUTES.to_string()).expect("max ttl");
        assert_eq!(cfg.jwt.ttl(), Duration::from_secs(MAX_TTL_MINUTES * 60));
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "k"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
