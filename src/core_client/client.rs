use crate::config::ClientConfig;
use crate::core_error::FtpResult;
use crate::core_transfer::TransferMode;
use crate::session::{Session, SessionOptions};
use log::{debug, warn};
use std::path::Path;

/// Connection parameters for one FTP account.
///
/// Every method except [`FtpClient::open`] connects, logs in, performs one
/// action and closes the connection again, whether the action worked or not.
/// Use `open` to run several operations over one session.
#[derive(Debug, Clone)]
pub struct FtpClient {
    host: String,
    port: u16,
    username: String,
    password: String,
    options: SessionOptions,
}

/// Runs one action over a fresh session and always closes it.
macro_rules! one_shot {
    ($self:ident, |$session:ident| $action:expr) => {{
        let mut $session = $self.open().await?;
        let result = $action.await;
        $session.close().await;
        result.map(|outcome| outcome.into_payload())
    }};
}

impl FtpClient {
    pub fn new(host: &str, port: u16, username: &str, password: &str, passive: bool) -> Self {
        let options = SessionOptions {
            passive,
            ..SessionOptions::default()
        };
        FtpClient {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            options,
        }
    }

    pub fn from_config(config: &ClientConfig) -> FtpResult<Self> {
        config.validate_config()?;
        Ok(FtpClient {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
            options: config.session_options(),
        })
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Connects and logs in. The caller owns the session and closes it.
    pub async fn open(&self) -> FtpResult<Session> {
        let mut session = Session::connect(&self.host, self.port, self.options.clone()).await?;
        if let Err(e) = session.authenticate(&self.username, &self.password).await {
            warn!("Giving up on {}:{}: {}", self.host, self.port, e);
            session.close().await;
            return Err(e);
        }
        debug!("Session ready on {}:{}", self.host, self.port);
        Ok(session)
    }

    pub async fn upload(
        &self,
        local_path: impl AsRef<Path>,
        remote_path: &str,
        mode: TransferMode,
    ) -> FtpResult<u64> {
        one_shot!(self, |session| session.upload(local_path, remote_path, mode))
    }

    pub async fn download(
        &self,
        remote_path: &str,
        local_path: impl AsRef<Path>,
        mode: TransferMode,
    ) -> FtpResult<u64> {
        one_shot!(self, |session| session.download(remote_path, local_path, mode))
    }

    pub async fn delete(&self, path: &str) -> FtpResult<()> {
        one_shot!(self, |session| session.delete(path))
    }

    pub async fn rename(&self, from: &str, to: &str) -> FtpResult<()> {
        one_shot!(self, |session| session.rename(from, to))
    }

    pub async fn make_directory(&self, path: &str) -> FtpResult<Option<String>> {
        one_shot!(self, |session| session.make_directory(path))
    }

    pub async fn remove_directory(&self, path: &str) -> FtpResult<()> {
        one_shot!(self, |session| session.remove_directory(path))
    }

    pub async fn set_permissions(&self, path: &str, mode: u32) -> FtpResult<()> {
        one_shot!(self, |session| session.set_permissions(path, mode))
    }

    pub async fn file_size(&self, path: &str) -> FtpResult<Option<u64>> {
        one_shot!(self, |session| session.file_size(path))
    }

    pub async fn directory_exists(&self, path: &str) -> FtpResult<bool> {
        one_shot!(self, |session| session.directory_exists(path))
    }

    pub async fn list_directory(&self, path: &str) -> FtpResult<Vec<String>> {
        one_shot!(self, |session| session.list_directory(path))
    }

    pub async fn list_details(&self, path: &str) -> FtpResult<Vec<String>> {
        one_shot!(self, |session| session.list_details(path))
    }
}
