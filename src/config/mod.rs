mod file_config;

pub use file_config::FileConfig;

use crate::images::ImageRef;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_STORAGE_PATH: &str = "showroom_local_storage.db";
pub const DEFAULT_IMAGE: &str = "/default.jpeg";
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;

/// Command line values taking part in config resolution.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_url: String,
    pub storage_path: PathBuf,
    pub default_image: String,
    pub request_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            default_image: DEFAULT_IMAGE.to_string(),
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub storage_path: PathBuf,
    pub default_image: ImageRef,
    pub request_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let api_url = file.api_url.unwrap_or_else(|| cli.api_url.clone());
        let api_url = api_url.trim().to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            bail!("api_url must be an http(s) URL, got {:?}", api_url);
        }

        let storage_path = file
            .storage_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.storage_path.clone());
        if storage_path.as_os_str().is_empty() {
            bail!("storage_path must not be empty");
        }

        let raw_default_image = file
            .default_image
            .unwrap_or_else(|| cli.default_image.clone());
        let default_image = ImageRef::parse(&raw_default_image)
            .ok_or_else(|| anyhow!("default_image must not be blank"))?;

        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than zero");
        }

        Ok(Self {
            api_url,
            storage_path,
            default_image,
            request_timeout_sec,
        })
    }
}
