use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DATA_TIMEOUT_SECS, DEFAULT_DOWNLOAD_BUFFER_SIZE,
    DEFAULT_REPLY_TIMEOUT_SECS, DEFAULT_UPLOAD_BUFFER_SIZE,
};
use crate::core_control::control::ControlConnection;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::Reply;
use crate::core_transfer::TransferMode;
use log::{debug, info, warn};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Where a session stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connected,
    Authenticated,
}

/// Which verb changes permissions on this server. Probed once, then cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChmodSupport {
    Unknown,
    Dedicated,
    Site,
}

/// Tunables applied to every operation of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub passive: bool,
    pub transfer_mode: TransferMode,
    pub connect_timeout: Duration,
    pub reply_timeout: Duration,
    pub data_timeout: Duration,
    pub upload_buffer_size: usize,
    pub download_buffer_size: usize,
    /// Local address announced by PORT. Defaults to the control connection's.
    pub active_bind_address: Option<IpAddr>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            passive: false,
            transfer_mode: TransferMode::Binary,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            reply_timeout: Duration::from_secs(DEFAULT_REPLY_TIMEOUT_SECS),
            data_timeout: Duration::from_secs(DEFAULT_DATA_TIMEOUT_SECS),
            upload_buffer_size: DEFAULT_UPLOAD_BUFFER_SIZE,
            download_buffer_size: DEFAULT_DOWNLOAD_BUFFER_SIZE,
            active_bind_address: None,
        }
    }
}

/// One control connection to an FTP server.
///
/// The session is used through `&mut self`, which keeps commands and replies
/// in order. Share it between tasks through [`SharedSession`].
#[derive(Debug)]
pub struct Session {
    host: String,
    port: u16,
    username: Option<String>,
    options: SessionOptions,
    control: Option<ControlConnection>,
    state: ConnectionState,
    pub(crate) chmod_support: ChmodSupport,
    greeting: Option<Reply>,
}

pub type SharedSession = Arc<Mutex<Session>>;

impl Session {
    /// Opens the control connection and reads the greeting.
    pub async fn connect(host: &str, port: u16, options: SessionOptions) -> FtpResult<Session> {
        info!("Connecting to {}:{}", host, port);
        let (control, greeting) =
            ControlConnection::open(host, port, options.connect_timeout, options.reply_timeout)
                .await?;
        debug!("Greeting: {}", greeting);

        Ok(Session {
            host: host.to_string(),
            port,
            username: None,
            options,
            control: Some(control),
            state: ConnectionState::Connected,
            chmod_support: ChmodSupport::Unknown,
            greeting: Some(greeting),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn greeting(&self) -> Option<&Reply> {
        self.greeting.as_ref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn is_passive(&self) -> bool {
        self.options.passive
    }

    pub fn set_passive(&mut self, passive: bool) {
        self.options.passive = passive;
    }

    pub fn transfer_mode(&self) -> TransferMode {
        self.options.transfer_mode
    }

    pub fn set_transfer_mode(&mut self, mode: TransferMode) {
        self.options.transfer_mode = mode;
    }

    pub fn chmod_support(&self) -> ChmodSupport {
        self.chmod_support
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Sends one raw command and returns its first reply.
    ///
    /// STOR, RETR, NLST and LIST are refused with a protocol error before
    /// anything is written; they run through `send_transfer_command`.
    pub async fn execute(&mut self, command: FtpCommand, arg: Option<&str>) -> FtpResult<Reply> {
        let result = self.control()?.execute(command, arg).await;
        if result.is_err() {
            self.release_if_unusable();
        }
        result
    }

    pub(crate) async fn execute_transfer_verb(
        &mut self,
        command: FtpCommand,
        arg: Option<&str>,
    ) -> FtpResult<Reply> {
        let result = self.control()?.execute_transfer_verb(command, arg).await;
        if result.is_err() {
            self.release_if_unusable();
        }
        result
    }

    /// Reads the reply that follows a 1xx preliminary reply.
    pub async fn read_reply(&mut self) -> FtpResult<Reply> {
        let result = self.control()?.read_reply().await;
        if result.is_err() {
            self.release_if_unusable();
        }
        result
    }

    /// Sends QUIT when the connection is still in step, then releases the
    /// socket. A bad QUIT reply does not fail the close. Closing twice is a no-op.
    pub async fn close(&mut self) {
        let Some(mut control) = self.control.take() else {
            return;
        };
        self.state = ConnectionState::Closed;

        if control.is_usable() {
            match control.execute(FtpCommand::QUIT, None).await {
                Ok(reply) if reply.is_completion() => debug!("QUIT acknowledged: {}", reply),
                Ok(reply) => warn!("QUIT answered with {}", reply),
                Err(e) => warn!("QUIT failed on {}:{}: {}", self.host, self.port, e),
            }
        }
        control.shutdown().await;
        info!("Closed session to {}:{}", self.host, self.port);
    }

    pub(crate) fn control(&mut self) -> FtpResult<&mut ControlConnection> {
        self.control
            .as_mut()
            .ok_or_else(|| FtpError::Protocol("session is closed".to_string()))
    }

    pub(crate) fn require_authenticated(&self) -> FtpResult<()> {
        if self.state != ConnectionState::Authenticated {
            return Err(FtpError::Protocol(format!(
                "operation requires an authenticated session (state is {:?})",
                self.state
            )));
        }
        Ok(())
    }

    pub(crate) fn mark_authenticated(&mut self, username: &str) {
        self.username = Some(username.to_string());
        self.state = ConnectionState::Authenticated;
    }

    /// Drops the control connection when it fell out of step with the server.
    pub(crate) fn release_if_unusable(&mut self) {
        let unusable = self
            .control
            .as_ref()
            .map(|control| !control.is_usable())
            .unwrap_or(false);
        if unusable {
            warn!(
                "Control connection to {}:{} is out of step, closing it",
                self.host, self.port
            );
            self.control = None;
            self.state = ConnectionState::Closed;
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.control.is_some() {
            debug!(
                "Session to {}:{} dropped without close, releasing socket",
                self.host, self.port
            );
        }
    }
}
