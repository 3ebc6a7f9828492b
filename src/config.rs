use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

// Room for the JSON envelope around the base64 payload.
const UPLOAD_ENVELOPE_BYTES: usize = 64 * 1024;

const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:8000",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub editor: EditorConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `memory` selects the in-process store; anything else is an sqlx SQLite URL.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// How long an update-mode save waits for the store before reporting it as queued.
    pub save_timeout_ms: u64,
    pub activity_feed_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub blob_root: String,
    pub public_base_url: String,
    /// Largest decoded media upload accepted, in bytes.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub admin_email: String,
    #[serde(skip_serializing)]
    pub admin_password: String,
    pub session_timeout_secs: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_timeout_ms: 2000,
            activity_feed_limit: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = parse_or("SERVER_PORT", 8000);
        let config = Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:data/content_hub.db".to_string()),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                cors_origins: parse_origins(env::var("CORS_ORIGINS").ok().as_deref()),
            },
            editor: EditorConfig {
                save_timeout_ms: parse_or("SAVE_TIMEOUT_MS", 2000),
                activity_feed_limit: parse_or("ACTIVITY_FEED_LIMIT", 5),
            },
            storage: StorageConfig {
                blob_root: env::var("BLOB_ROOT").unwrap_or_else(|_| "data/blobs".to_string()),
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("http://localhost:{}", port)),
                max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            },
            auth: AuthConfig {
                admin_email: env::var("ADMIN_EMAIL")
                    .unwrap_or_else(|_| "admin@example.com".to_string()),
                admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
                session_timeout_secs: parse_or("SESSION_TIMEOUT_SECS", 8 * 3600),
            },
        };
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.editor.save_timeout_ms)
    }

    /// Request body limit for media uploads, which arrive base64-encoded in JSON.
    pub fn upload_body_limit(&self) -> usize {
        self.storage
            .max_upload_bytes
            .div_ceil(3)
            .saturating_mul(4)
            .saturating_add(UPLOAD_ENVELOPE_BYTES)
    }

    /// Base URL the REST probe targets.
    pub fn probe_base_url() -> String {
        env::var("CONTENT_HUB_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// `*` (or nothing) means the local development origins.
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or("*")
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.is_empty() || origins == ["*"] {
        DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
    } else {
        origins
    }
}
