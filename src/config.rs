use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DATA_TIMEOUT_SECS, DEFAULT_DOWNLOAD_BUFFER_SIZE,
    DEFAULT_PORT, DEFAULT_REPLY_TIMEOUT_SECS, DEFAULT_UPLOAD_BUFFER_SIZE, DEFAULT_USERNAME,
};
use crate::core_error::{FtpError, FtpResult};
use crate::core_transfer::TransferMode;
use crate::session::SessionOptions;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ClientConfig {
    #[validate(length(min = 1, max = 128))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub passive: bool,
    pub transfer_mode: TransferMode,
    pub connect_timeout_secs: u64,
    pub reply_timeout_secs: u64,
    pub data_timeout_secs: u64,
    #[validate(range(min = 1))]
    pub upload_buffer_size: usize,
    #[validate(range(min = 1))]
    pub download_buffer_size: usize,
    pub active_bind_address: Option<IpAddr>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            username: String::from(DEFAULT_USERNAME),
            password: String::new(),
            passive: false,
            transfer_mode: TransferMode::Binary,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            reply_timeout_secs: DEFAULT_REPLY_TIMEOUT_SECS,
            data_timeout_secs: DEFAULT_DATA_TIMEOUT_SECS,
            upload_buffer_size: DEFAULT_UPLOAD_BUFFER_SIZE,
            download_buffer_size: DEFAULT_DOWNLOAD_BUFFER_SIZE,
            active_bind_address: None,
        }
    }
}

impl Config {
    /// Reads a TOML file. Missing keys fall back to their defaults; the host
    /// is only checked once the command line had a chance to set it.
    pub fn load_from_file(path: &Path) -> FtpResult<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| FtpError::Config(format!("failed to read {:?}: {}", path, e)))?;
        Config::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> FtpResult<Self> {
        toml::from_str(config_str).map_err(|e| FtpError::Config(e.to_string()))
    }
}

impl ClientConfig {
    pub fn validate_config(&self) -> FtpResult<()> {
        self.validate()
            .map_err(|e| FtpError::Config(e.to_string().replace('\n', "; ")))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            passive: self.passive,
            transfer_mode: self.transfer_mode,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            reply_timeout: Duration::from_secs(self.reply_timeout_secs),
            data_timeout: Duration::from_secs(self.data_timeout_secs),
            upload_buffer_size: self.upload_buffer_size,
            download_buffer_size: self.download_buffer_size,
            active_bind_address: self.active_bind_address,
        }
    }
}
