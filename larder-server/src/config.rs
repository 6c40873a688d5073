use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Load the configuration from a YAML file.
    ///
    /// `LARDER_AUTH_API_KEY`, if set, replaces `auth.api_key` so the key can stay out of the file.
    pub fn load(yml_path: &str) -> anyhow::Result<Self> {
        let yml = std::fs::read_to_string(yml_path)?;
        let mut config: Self = serde_yaml::from_str(&yml)?;
        if let Ok(key) = dotenvy::var("LARDER_AUTH_API_KEY") {
            config.auth.api_key = key;
        }
        Ok(config)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub tls: Option<TLSConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TLSConfig {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure. HTTP error statuses are never retried.
    pub retries: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.themealdb.com/api/json/v1/1".into(),
            timeout_secs: 10,
            retries: 2,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the hosted identity service, without the `/auth/v1` suffix.
    pub provider_url: String,
    #[serde(default)]
    pub api_key: String,
    pub session_storage_path: String,
}
