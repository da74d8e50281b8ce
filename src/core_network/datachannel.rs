use crate::core_control::ControlConnection;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::{pasv, port};
use crate::core_reply::Reply;
use log::{debug, trace};
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Which side opens the data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    /// PASV: the server listens, we connect.
    Passive,
    /// PORT: we listen, the server connects.
    Active,
}

/// Lifecycle of one data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChannelState {
    Idle,
    Negotiating,
    Open,
    Transferring,
    Closed,
}

#[derive(Debug)]
enum Endpoint {
    None,
    Connected(TcpStream),
    Listening(TcpListener),
}

/// The secondary connection used by exactly one transfer or listing.
///
/// `Idle -> Negotiating -> Open -> Transferring -> Closed`. A failed
/// negotiation goes straight to `Closed`. A channel is never reused.
#[derive(Debug)]
pub struct DataChannel {
    mode: DataMode,
    state: DataChannelState,
    endpoint: Endpoint,
    data_timeout: Duration,
}

impl DataChannel {
    pub fn new(mode: DataMode, data_timeout: Duration) -> Self {
        DataChannel {
            mode,
            state: DataChannelState::Idle,
            endpoint: Endpoint::None,
            data_timeout,
        }
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn state(&self) -> DataChannelState {
        self.state
    }

    /// Runs PASV or PORT on the control connection.
    pub async fn negotiate(
        &mut self,
        control: &mut ControlConnection,
        replies: &mut Vec<Reply>,
        active_bind_address: Option<IpAddr>,
    ) -> FtpResult<()> {
        if self.state != DataChannelState::Idle {
            return Err(FtpError::Protocol(format!(
                "data channel cannot be negotiated in state {:?}",
                self.state
            )));
        }
        self.state = DataChannelState::Negotiating;

        let endpoint = match self.mode {
            DataMode::Passive => pasv::open_passive(control, replies, self.data_timeout)
                .await
                .map(Endpoint::Connected),
            DataMode::Active => port::open_active(control, replies, active_bind_address)
                .await
                .map(Endpoint::Listening),
        };

        match endpoint {
            Ok(endpoint) => {
                self.endpoint = endpoint;
                self.state = DataChannelState::Open;
                debug!("Data channel open ({:?})", self.mode);
                Ok(())
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// Refuses a transfer verb unless the channel is ready for it.
    pub fn ensure_open(&self, command: FtpCommand) -> FtpResult<()> {
        if self.state != DataChannelState::Open {
            return Err(FtpError::Protocol(format!(
                "{} requires an open data channel (state is {:?})",
                command, self.state
            )));
        }
        Ok(())
    }

    /// Hands out the data socket once the server accepted the transfer verb.
    /// In active mode this waits for the server to connect.
    pub async fn begin_transfer(&mut self) -> FtpResult<TcpStream> {
        if self.state != DataChannelState::Open {
            return Err(FtpError::Protocol(format!(
                "transfer cannot start in data channel state {:?}",
                self.state
            )));
        }

        let endpoint = std::mem::replace(&mut self.endpoint, Endpoint::None);
        let stream = match endpoint {
            Endpoint::Connected(stream) => Ok(stream),
            Endpoint::Listening(listener) => port::accept_active(listener, self.data_timeout).await,
            Endpoint::None => Err(FtpError::Protocol(
                "data channel has no endpoint".to_string(),
            )),
        };

        match stream {
            Ok(stream) => {
                self.state = DataChannelState::Transferring;
                Ok(stream)
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// Tears the channel down. Any socket still held is released.
    pub fn close(&mut self) {
        if self.state != DataChannelState::Closed {
            trace!("Data channel {:?} -> Closed", self.state);
        }
        self.endpoint = Endpoint::None;
        self.state = DataChannelState::Closed;
    }
}
