use serde::Deserialize;
use thiserror::Error;

use std::env;
use std::fs;
use std::path::PathBuf;

const PROD_BACKEND:&str = "https://app-backend-alpha.vercel.app/p/manga";
const LOCAL_BACKEND:&str = "http://localhost:5000/p/manga";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading config file: {0}")]
    IO(#[from] std::io::Error),
    #[error("error parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_api_base_url() -> String {
    let url = match cfg!(debug_assertions) {
        true => LOCAL_BACKEND,
        false => PROD_BACKEND,
    };

    url.to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".manga-admin/session.json")
}

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    #[serde(default="default_api_base_url")]
    pub api_base_url: String,
    #[serde(default="default_session_file")]
    pub session_file: PathBuf,
}
impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_file: default_session_file(),
        }
    }
}
impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("MANGA_ADMIN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or(PathBuf::from(".manga-admin/config.toml"));

        let mut config = match path.exists() {
            true => toml::from_str(&fs::read_to_string(&path)?)?,
            false => Self::default(),
        };

        if let Ok(url) = env::var("MANGA_ADMIN_API") {
            config.api_base_url = url;
        }

        Ok(config)
    }
}
