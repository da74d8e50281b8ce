use crate::constants::ACTIVE_FAILED;
use crate::core_control::ControlConnection;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::Reply;
use log::{debug, info};
use std::net::{IpAddr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Encodes an address as the `h1,h2,h3,h4,p1,p2` argument of PORT.
pub fn encode_port_argument(addr: SocketAddrV4) -> String {
    let ip = addr.ip().octets();
    format!(
        "{},{},{},{},{},{}",
        ip[0],
        ip[1],
        ip[2],
        ip[3],
        addr.port() >> 8,
        addr.port() & 0xff
    )
}

/// Binds a local listener and announces it with PORT.
pub(crate) async fn open_active(
    control: &mut ControlConnection,
    replies: &mut Vec<Reply>,
    bind_address: Option<IpAddr>,
) -> FtpResult<TcpListener> {
    let ip = match bind_address.unwrap_or_else(|| control.local_addr().ip()) {
        IpAddr::V4(ip) => ip,
        IpAddr::V6(ip) => {
            return Err(FtpError::DataChannel(format!(
                "{}: PORT requires an IPv4 address, got {}",
                ACTIVE_FAILED, ip
            )))
        }
    };

    let listener = TcpListener::bind(SocketAddr::from((ip, 0)))
        .await
        .map_err(|e| FtpError::DataChannel(format!("{}: bind {}: {}", ACTIVE_FAILED, ip, e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| FtpError::DataChannel(format!("{}: {}", ACTIVE_FAILED, e)))?
        .port();
    let local = SocketAddrV4::new(ip, port);
    debug!("Active data listener bound on {}", local);

    let reply = control
        .execute(FtpCommand::PORT, Some(&encode_port_argument(local)))
        .await?;
    replies.push(reply.clone());
    if !reply.is_completion() {
        return Err(FtpError::DataChannel(format!("{}: {}", ACTIVE_FAILED, reply)));
    }
    Ok(listener)
}

/// Waits for the server to connect back to the PORT listener.
pub(crate) async fn accept_active(
    listener: TcpListener,
    data_timeout: Duration,
) -> FtpResult<TcpStream> {
    let (stream, peer) = timeout(data_timeout, listener.accept())
        .await
        .map_err(|_| {
            FtpError::DataChannel(format!(
                "{}: server did not connect to the data port",
                ACTIVE_FAILED
            ))
        })?
        .map_err(|e| FtpError::DataChannel(format!("{}: accept: {}", ACTIVE_FAILED, e)))?;
    info!("Active data connection accepted from {}", peer);
    Ok(stream)
}
