use crate::constants::PASSIVE_FAILED;
use crate::core_control::ControlConnection;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::codes::ENTERING_PASSIVE;
use crate::core_reply::Reply;
use log::debug;
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

static PASV_ADDRESS: OnceLock<Regex> = OnceLock::new();

fn pasv_address_pattern() -> &'static Regex {
    PASV_ADDRESS.get_or_init(|| {
        Regex::new(r"(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3})")
            .expect("PASV address pattern is valid")
    })
}

/// Parses `h1,h2,h3,h4,p1,p2` out of a 227 reply. The port is `p1 * 256 + p2`.
pub fn parse_pasv_reply(reply: &Reply) -> FtpResult<SocketAddrV4> {
    let text = reply.message();
    let caps = pasv_address_pattern()
        .captures(&text)
        .ok_or_else(|| FtpError::DataChannel(format!("Malformed PASV reply: {}", reply)))?;

    let mut nums = [0u8; 6];
    for (i, num) in nums.iter_mut().enumerate() {
        *num = caps[i + 1].parse::<u8>().map_err(|_| {
            FtpError::DataChannel(format!("PASV reply number out of range: {}", reply))
        })?;
    }

    let ip = Ipv4Addr::new(nums[0], nums[1], nums[2], nums[3]);
    let port = (nums[4] as u16) << 8 | nums[5] as u16;
    Ok(SocketAddrV4::new(ip, port))
}

/// Address to dial for an announced passive port. Some servers announce
/// 0.0.0.0, the data port then lives on the control peer.
pub fn data_address(announced: SocketAddrV4, control_peer: SocketAddr) -> SocketAddrV4 {
    match control_peer.ip() {
        IpAddr::V4(peer) if announced.ip().is_unspecified() => {
            SocketAddrV4::new(peer, announced.port())
        }
        _ => announced,
    }
}

/// Sends PASV and connects to the address the server announces.
pub(crate) async fn open_passive(
    control: &mut ControlConnection,
    replies: &mut Vec<Reply>,
    data_timeout: Duration,
) -> FtpResult<TcpStream> {
    let reply = control.execute(FtpCommand::PASV, None).await?;
    replies.push(reply.clone());
    if reply.code() != ENTERING_PASSIVE {
        return Err(FtpError::DataChannel(format!("{}: {}", PASSIVE_FAILED, reply)));
    }

    let addr = data_address(parse_pasv_reply(&reply)?, control.peer_addr());
    debug!("Opening passive data connection to {}", addr);

    let stream = timeout(data_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| {
            FtpError::DataChannel(format!("{}: connect to {} timed out", PASSIVE_FAILED, addr))
        })?
        .map_err(|e| FtpError::DataChannel(format!("{}: connect to {}: {}", PASSIVE_FAILED, addr, e)))?;
    Ok(stream)
}
