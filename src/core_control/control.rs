use crate::constants::MAX_REPLY_LINE_LENGTH;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::{Reply, ReplyParser};
use crate::helpers::{loggable_command, validate_argument};
use log::{debug, trace};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// The TCP control channel of one session.
///
/// Commands and replies strictly alternate: once a command is written no other
/// command may be written until its final reply has been read. A 1xx reply is
/// not final, the connection keeps waiting for the completion reply.
#[derive(Debug)]
pub struct ControlConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    parser: ReplyParser,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
    reply_timeout: Duration,
    awaiting_reply: bool,
    broken: bool,
}

impl ControlConnection {
    /// Opens the TCP connection and reads the server greeting.
    pub async fn open(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        reply_timeout: Duration,
    ) -> FtpResult<(ControlConnection, Reply)> {
        let addr = format!("{}:{}", host, port);
        let stream = timeout(connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| FtpError::Connection(format!("connect to {} timed out", addr)))?
            .map_err(|e| FtpError::Connection(format!("connect to {}: {}", addr, e)))?;
        stream.set_nodelay(true).ok();

        let mut control = ControlConnection::from_stream(stream, reply_timeout)?;
        debug!("Control connection open to {}", control.peer_addr);

        // The greeting is the reply to an implicit command.
        control.awaiting_reply = true;
        let mut greeting = control
            .read_reply()
            .await
            .map_err(|e| FtpError::Connection(format!("no greeting from {}: {}", addr, e)))?;
        while greeting.is_preliminary() {
            debug!("Server not ready yet: {}", greeting);
            greeting = control
                .read_reply()
                .await
                .map_err(|e| FtpError::Connection(format!("no greeting from {}: {}", addr, e)))?;
        }

        if !greeting.is_completion() {
            return Err(FtpError::Connection(format!(
                "server at {} refused the session: {}",
                addr, greeting
            )));
        }

        Ok((control, greeting))
    }

    pub fn from_stream(stream: TcpStream, reply_timeout: Duration) -> FtpResult<ControlConnection> {
        let local_addr = stream.local_addr()?;
        let peer_addr = stream.peer_addr()?;
        let (rd, wr) = stream.into_split();
        Ok(ControlConnection {
            reader: BufReader::new(rd),
            writer: wr,
            parser: ReplyParser::new(),
            local_addr,
            peer_addr,
            reply_timeout,
            awaiting_reply: false,
            broken: false,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// A connection that hit an I/O or framing error cannot be resynchronised.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// True when the connection can take another command right now.
    pub fn is_usable(&self) -> bool {
        !self.broken && !self.awaiting_reply
    }

    /// Writes one command line. Transfer verbs are refused here: they only
    /// go out once a data channel is open, through the transfer path.
    pub async fn send_command(&mut self, command: FtpCommand, arg: Option<&str>) -> FtpResult<()> {
        if command.opens_transfer() {
            return Err(FtpError::Protocol(format!(
                "{} needs an open data channel",
                command
            )));
        }
        self.write_command(command, arg).await
    }

    /// Writes a STOR/RETR/NLST/LIST line. The caller owns an open data channel.
    pub(crate) async fn send_transfer_verb(
        &mut self,
        command: FtpCommand,
        arg: Option<&str>,
    ) -> FtpResult<()> {
        self.write_command(command, arg).await
    }

    async fn write_command(&mut self, command: FtpCommand, arg: Option<&str>) -> FtpResult<()> {
        if self.broken {
            return Err(FtpError::Protocol(
                "control connection is no longer usable".to_string(),
            ));
        }
        if self.awaiting_reply {
            return Err(FtpError::Protocol(format!(
                "{} issued while a reply is still pending",
                command
            )));
        }
        if let Some(arg) = arg {
            validate_argument(arg)?;
        }

        let line = command.line(arg);
        trace!(">>> {}", loggable_command(command, arg));
        if let Err(e) = self.writer.write_all(line.as_bytes()).await {
            self.broken = true;
            return Err(e.into());
        }
        self.awaiting_reply = true;
        Ok(())
    }

    /// Reads the next reply. Only legal while a reply is expected.
    pub async fn read_reply(&mut self) -> FtpResult<Reply> {
        if self.broken {
            return Err(FtpError::Protocol(
                "control connection is no longer usable".to_string(),
            ));
        }
        if !self.awaiting_reply {
            return Err(FtpError::Protocol(
                "no reply is expected at this point".to_string(),
            ));
        }

        let result = match timeout(self.reply_timeout, self.read_reply_inner()).await {
            Ok(result) => result,
            Err(_) => Err(FtpError::Transport(io::Error::new(
                io::ErrorKind::TimedOut,
                "timed out waiting for a reply",
            ))),
        };

        match result {
            Ok(reply) => {
                trace!("<<< {}", reply);
                self.awaiting_reply = reply.is_preliminary();
                Ok(reply)
            }
            Err(e) => {
                self.broken = true;
                self.parser.reset();
                Err(e)
            }
        }
    }

    /// Sends a command and reads its first reply.
    pub async fn execute(&mut self, command: FtpCommand, arg: Option<&str>) -> FtpResult<Reply> {
        self.send_command(command, arg).await?;
        self.read_reply().await
    }

    pub(crate) async fn execute_transfer_verb(
        &mut self,
        command: FtpCommand,
        arg: Option<&str>,
    ) -> FtpResult<Reply> {
        self.send_transfer_verb(command, arg).await?;
        self.read_reply().await
    }

    async fn read_reply_inner(&mut self) -> FtpResult<Reply> {
        let mut buf = Vec::with_capacity(128);
        loop {
            buf.clear();
            let n = (&mut self.reader)
                .take(MAX_REPLY_LINE_LENGTH as u64)
                .read_until(b'\n', &mut buf)
                .await?;
            if n == 0 {
                return Err(FtpError::Transport(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "server closed the control connection",
                )));
            }
            if buf.last() != Some(&b'\n') {
                if n >= MAX_REPLY_LINE_LENGTH {
                    return Err(FtpError::Protocol(format!(
                        "reply line longer than {} bytes",
                        MAX_REPLY_LINE_LENGTH
                    )));
                }
                return Err(FtpError::Transport(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "server closed the control connection mid-line",
                )));
            }

            let line = std::str::from_utf8(&buf)
                .map_err(|_| FtpError::Protocol("reply line is not valid UTF-8".to_string()))?;
            if let Some(reply) = self.parser.feed_line(line)? {
                return Ok(reply);
            }
        }
    }

    /// Releases the socket without saying goodbye.
    pub async fn shutdown(&mut self) {
        self.writer.shutdown().await.ok();
        self.broken = true;
        self.awaiting_reply = false;
    }
}
