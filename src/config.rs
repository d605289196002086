use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// The address to listen on. Defaults to 127.0.0.1:8000.
    pub listen_address: Option<SocketAddr>,
    /// The database connection string.
    #[serde(default = "default_db")]
    pub db: String,
    /// Photo upload storage.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Optional metrics exporter configuration.
    pub metrics: Option<MetricConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UploadConfig {
    /// Directory where uploaded files are stored.
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Public base URL that stored files are served under. Must end with a
    /// slash for joins to resolve relative to it.
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Maximum accepted upload body size in bytes.
    #[serde(default = "default_upload_limit")]
    pub limit: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            base_url: default_base_url(),
            limit: default_upload_limit(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricConfig {
    PrometheusPush(PrometheusPushConfig),
}

#[derive(Deserialize, Debug, Clone)]
pub struct PrometheusPushConfig {
    /// The push gateway endpoint.
    pub url: String,
}

fn default_db() -> String {
    "sqlite://data/muniport.db".to_owned()
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("data/uploads")
}

fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:8000/").expect("default base url is valid")
}

fn default_upload_limit() -> usize {
    10 * 1024 * 1024
}
