use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Absolute base used when handing out file URLs, e.g. in upload
    /// responses and presentation listings.
    pub public_base_url: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// OAuth client id registered with the identity provider; signed ID
    /// tokens must carry it as their audience.
    pub google_client_id: String,
    /// The single email address allowed through /admin/login.
    pub admin_email: String,
    pub userinfo_url: String,
    pub certs_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// When true, uploads must name a non-empty category; when false an
    /// absent or empty category means "uncategorized".
    pub require_category: bool,
    pub max_upload_mb: usize,
}

impl UploadConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";
const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value lookup. `from_env` feeds it the
    /// process environment; tests feed it a map.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let require =
            |key: &'static str| lookup(key).with_context(|| format!("{} must be set", key));

        let port: u16 = get("PORT", "5656")
            .parse()
            .context("PORT must be a valid port number")?;

        Ok(Self {
            server: ServerConfig {
                port,
                host: get("HOST", "0.0.0.0"),
                public_base_url: lookup("PUBLIC_BASE_URL")
                    .unwrap_or_else(|| format!("http://localhost:{}", port)),
                cors_allowed_origins: get("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL", "sqlite:podium.db"),
                max_connections: get("DB_MAX_CONNECTIONS", "10")
                    .parse()
                    .context("DB_MAX_CONNECTIONS must be an integer")?,
                min_connections: get("DB_MIN_CONNECTIONS", "1")
                    .parse()
                    .context("DB_MIN_CONNECTIONS must be an integer")?,
            },
            auth: AuthConfig {
                google_client_id: require("GOOGLE_CLIENT_ID")?,
                admin_email: require("ADMIN_EMAIL")?,
                userinfo_url: get("GOOGLE_USERINFO_URL", GOOGLE_USERINFO_URL),
                certs_url: get("GOOGLE_CERTS_URL", GOOGLE_CERTS_URL),
            },
            uploads: UploadConfig {
                dir: PathBuf::from(get("UPLOAD_DIR", "uploads")),
                require_category: get("REQUIRE_CATEGORY", "false")
                    .parse()
                    .context("REQUIRE_CATEGORY must be true or false")?,
                max_upload_mb: get("MAX_UPLOAD_MB", "50")
                    .parse()
                    .context("MAX_UPLOAD_MB must be an integer")?,
            },
        })
    }
}
