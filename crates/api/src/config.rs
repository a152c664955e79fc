use std::collections::HashMap;
use std::path::PathBuf;

use opsdesk_core::crypto;
use opsdesk_core::oauth::PLATFORMS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have sensible defaults suitable for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public base URL used when building shareable onboarding and
    /// signing links and OAuth redirect URIs.
    pub public_base_url: String,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// AES-256 key sealing provider access tokens at rest.
    pub token_encryption_key: [u8; crypto::KEY_LEN],
    /// Directory holding the preset PDF assets.
    pub assets_dir: PathBuf,
    /// Path of the file-backed field placement store.
    pub placements_path: PathBuf,
    /// Per-platform OAuth provider settings. Platforms without
    /// credentials configured are absent from the map.
    pub oauth_providers: HashMap<String, OAuthProvider>,
}

/// OAuth settings for one platform.
#[derive(Debug, Clone)]
pub struct OAuthProvider {
    pub client_id: String,
    pub client_secret: String,
    /// Provider authorization endpoint the user is sent to.
    pub authorize_url: String,
    /// Provider token endpoint for the code exchange.
    pub token_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                       |
    /// |--------------------------|-------------------------------|
    /// | `HOST`                   | `0.0.0.0`                     |
    /// | `PORT`                   | `3000`                        |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                          |
    /// | `PUBLIC_BASE_URL`        | `http://localhost:3000`       |
    /// | `TOKEN_ENCRYPTION_KEY`   | **required** (base64, 32B)    |
    /// | `ASSETS_DIR`             | `assets`                      |
    /// | `PLACEMENTS_PATH`        | `assets/placements.json`      |
    /// | `<PLATFORM>_CLIENT_ID` / `_CLIENT_SECRET` / `_AUTHORIZE_URL` / `_TOKEN_URL` | per platform, optional |
    ///
    /// # Panics
    ///
    /// Panics when a required secret is missing or malformed; we want
    /// misconfiguration to fail fast at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());

        let encoded_key = std::env::var("TOKEN_ENCRYPTION_KEY")
            .expect("TOKEN_ENCRYPTION_KEY must be set in the environment");
        let token_encryption_key = crypto::decode_key(&encoded_key)
            .expect("TOKEN_ENCRYPTION_KEY must be base64 for 32 bytes");

        let assets_dir = PathBuf::from(std::env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".into()));
        let placements_path = PathBuf::from(
            std::env::var("PLACEMENTS_PATH")
                .unwrap_or_else(|_| "assets/placements.json".into()),
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            jwt: JwtConfig::from_env(),
            token_encryption_key,
            assets_dir,
            placements_path,
            oauth_providers: load_oauth_providers(),
        }
    }

    /// The registered redirect URI for a platform's callback.
    pub fn oauth_redirect_uri(&self, platform: &str) -> String {
        format!("{}/api/oauth/{platform}/callback", self.public_base_url)
    }
}

/// Load provider settings for every platform whose `<PLATFORM>_CLIENT_ID`
/// is set. Platforms without credentials stay unconfigured and their
/// connect route reports 503.
fn load_oauth_providers() -> HashMap<String, OAuthProvider> {
    let mut providers = HashMap::new();

    for platform in PLATFORMS {
        let prefix = platform.to_uppercase();
        let Ok(client_id) = std::env::var(format!("{prefix}_CLIENT_ID")) else {
            continue;
        };
        let client_secret = std::env::var(format!("{prefix}_CLIENT_SECRET"))
            .unwrap_or_else(|_| panic!("{prefix}_CLIENT_SECRET must be set when {prefix}_CLIENT_ID is"));
        let authorize_url = std::env::var(format!("{prefix}_AUTHORIZE_URL"))
            .unwrap_or_else(|_| panic!("{prefix}_AUTHORIZE_URL must be set when {prefix}_CLIENT_ID is"));
        let token_url = std::env::var(format!("{prefix}_TOKEN_URL"))
            .unwrap_or_else(|_| panic!("{prefix}_TOKEN_URL must be set when {prefix}_CLIENT_ID is"));

        providers.insert(
            platform.to_string(),
            OAuthProvider {
                client_id,
                client_secret,
                authorize_url,
                token_url,
            },
        );
    }

    providers
}
