use std::str::FromStr;

use anyhow::Context;

/// Longest accepted token lifetime (one year).
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 work factor. Defaults match `argon2::Params::default()`.
#[derive(Debug, Clone)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET is not set")?;

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "skillsphere".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "skillsphere-users".into()),
            ttl_minutes: parsed(&lookup, "JWT_TTL_MINUTES")
                .filter(|m| (1..=MAX_TTL_MINUTES).contains(m))
                .unwrap_or(60),
        };

        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: parsed(&lookup, "ARGON2_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: parsed(&lookup, "ARGON2_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: parsed(&lookup, "ARGON2_PARALLELISM").unwrap_or(defaults.parallelism),
        };

        let port = parsed(&lookup, "APP_PORT").or_else(|| parsed(&lookup, "PORT")).unwrap_or(5000);
        let cors_origin = lookup("CORS_ORIGIN")
            .unwrap_or_else(|| "https://skillsphere25.netlify.app".into())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url,
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            hash,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            cors_origin,
        })
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
