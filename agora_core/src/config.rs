use std::{env, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

use crate::error::CoreError;

static DATA_DIR_NAME: &str = "agora";
static AGORA_DB_NAME: &str = "agora.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

// Directory layout
// data_dir_path
// |- agora
//    |- agora.sqlite
//    |- config.json

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AgoraConfig {
    /// Any sea-orm connection string; sqlite file in the data dir by default.
    pub database_url: String,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Base URL the OAuth provider redirects back to.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Only send the session cookie over HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
}

impl AgoraConfig {
    /// Creates a config with the database inside the given data directory
    fn new(data_dir: PathBuf) -> Self {
        let database_path = data_dir.join(AGORA_DB_NAME);

        AgoraConfig {
            database_url: format!("sqlite://{}?mode=rwc", database_path.display()),
            bind_address: default_bind_address(),
            public_url: default_public_url(),
            secure_cookies: false,
        }
    }

    /// Environment variables win over the persisted file.
    fn apply_env(&mut self) -> Result<(), CoreError> {
        if let Some(url) = non_empty_var("AGORA_DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(address) = non_empty_var("AGORA_BIND_ADDRESS") {
            self.bind_address = address;
        }
        if let Some(url) = non_empty_var("AGORA_PUBLIC_URL") {
            self.public_url = url.trim_end_matches('/').to_string();
        }
        if let Some(flag) = non_empty_var("AGORA_SECURE_COOKIES") {
            self.secure_cookies = parse_flag("AGORA_SECURE_COOKIES", &flag)?;
        }
        Ok(())
    }
}

/// Client credentials for the GitHub OAuth app.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthCredentials {
    /// Reads `GITHUB_CLIENT_ID` and `GITHUB_CLIENT_SECRET`; both are required.
    pub fn from_env() -> Result<Self, CoreError> {
        let client_id =
            non_empty_var("GITHUB_CLIENT_ID").ok_or(CoreError::MissingCredentials("GITHUB_CLIENT_ID"))?;
        let client_secret = non_empty_var("GITHUB_CLIENT_SECRET")
            .ok_or(CoreError::MissingCredentials("GITHUB_CLIENT_SECRET"))?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, CoreError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(CoreError::InvalidSetting {
            key,
            value: value.to_string(),
        }),
    }
}

fn data_dir() -> Result<PathBuf, CoreError> {
    if let Some(dir) = non_empty_var("AGORA_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir().ok_or(CoreError::NoDataDir)?;
    Ok(base.join(DATA_DIR_NAME))
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<AgoraConfig, CoreError> {
    let agora_dir = data_dir()?;
    let config_path = agora_dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(&agora_dir).await?;

    let mut config = if fs::try_exists(&config_path).await? {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        serde_json::from_str(&contents)?
    } else {
        let config = AgoraConfig::new(agora_dir.clone());

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;
        info!("Wrote default config to {}", config_path.display());

        config
    };

    config.apply_env()?;
    Ok(config)
}
