use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::executor::{evaluate, Expect, Outcome};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::{DataChannel, DataMode};
use crate::core_reply::Reply;
use crate::core_transfer::{copy, TransferMode};
use crate::session::Session;
use log::{debug, error};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

impl Session {
    /// Negotiates a fresh data channel in the session's mode.
    pub async fn open_data_channel(&mut self, replies: &mut Vec<Reply>) -> FtpResult<DataChannel> {
        let mode = if self.is_passive() {
            DataMode::Passive
        } else {
            DataMode::Active
        };
        let mut channel = DataChannel::new(mode, self.options().data_timeout);
        let bind_address = self.options().active_bind_address;

        let result = channel
            .negotiate(self.control()?, replies, bind_address)
            .await;
        if let Err(e) = result {
            self.release_if_unusable();
            return Err(e);
        }
        Ok(channel)
    }

    /// Sends a transfer verb over an open data channel.
    ///
    /// Nothing is written when the channel is not `Open`. Returns the data
    /// socket once the server answered 1xx, or `None` when it completed the
    /// verb straight away with 2xx.
    pub async fn send_transfer_command(
        &mut self,
        channel: &mut DataChannel,
        command: FtpCommand,
        arg: Option<&str>,
        replies: &mut Vec<Reply>,
        context: &'static str,
    ) -> FtpResult<Option<TcpStream>> {
        if !command.opens_transfer() {
            return Err(FtpError::Protocol(format!(
                "{} does not use a data channel",
                command
            )));
        }
        channel.ensure_open(command)?;

        let reply = match self.execute_transfer_verb(command, arg).await {
            Ok(reply) => reply,
            Err(e) => {
                channel.close();
                return Err(e);
            }
        };
        replies.push(reply.clone());

        let reply = match evaluate(command, reply, Expect::TransferStart, context) {
            Ok(reply) => reply,
            Err(e) => {
                channel.close();
                self.release_if_unusable();
                return Err(e);
            }
        };

        if !reply.is_preliminary() {
            debug!("{} completed without data: {}", command, reply);
            channel.close();
            return Ok(None);
        }

        match channel.begin_transfer().await {
            Ok(stream) => Ok(Some(stream)),
            Err(e) => {
                self.drain_transfer_reply(replies).await;
                Err(e)
            }
        }
    }

    /// Reads the reply that closes a transfer and checks it.
    pub(crate) async fn complete_transfer(
        &mut self,
        channel: &mut DataChannel,
        command: FtpCommand,
        replies: &mut Vec<Reply>,
        context: &'static str,
    ) -> FtpResult<Reply> {
        channel.close();
        let reply = self.read_reply().await?;
        replies.push(reply.clone());
        let result = evaluate(command, reply, Expect::Completion, context);
        if result.is_err() {
            self.release_if_unusable();
        }
        result
    }

    /// Best effort read of the final reply after a transfer went wrong
    /// locally, so the control connection stays in step.
    pub(crate) async fn drain_transfer_reply(&mut self, replies: &mut Vec<Reply>) {
        match self.read_reply().await {
            Ok(reply) => {
                debug!("Transfer ended with {}", reply);
                replies.push(reply);
            }
            Err(e) => debug!("No final transfer reply: {}", e),
        }
        self.release_if_unusable();
    }

    /// TYPE, data channel, transfer verb, stream copy to the server, final reply.
    pub(crate) async fn send_transfer<R>(
        &mut self,
        command: FtpCommand,
        remote_path: &str,
        source: &mut R,
        mode: TransferMode,
        context: &'static str,
    ) -> FtpResult<Outcome<u64>>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        self.step(
            &mut replies,
            FtpCommand::TYPE,
            Some(mode.type_argument()),
            Expect::Completion,
            context,
        )
        .await?;

        let mut channel = self.open_data_channel(&mut replies).await?;
        let stream = self
            .send_transfer_command(&mut channel, command, Some(remote_path), &mut replies, context)
            .await?;
        let Some(mut stream) = stream else {
            return Ok(Outcome::new(0, replies));
        };

        let buffer_size = self.options().upload_buffer_size;
        let data_timeout = self.options().data_timeout;
        let copied = copy::send_stream(source, &mut stream, mode, buffer_size, data_timeout).await;
        drop(stream);

        let sent = match copied {
            Ok(sent) => sent,
            Err(e) => {
                error!("{} {} aborted: {}", command, remote_path, e);
                channel.close();
                self.drain_transfer_reply(&mut replies).await;
                return Err(e.into());
            }
        };

        self.complete_transfer(&mut channel, command, &mut replies, context)
            .await?;
        Ok(Outcome::new(sent, replies))
    }

    /// TYPE, data channel, transfer verb, stream copy from the server, final reply.
    pub(crate) async fn receive_transfer<W>(
        &mut self,
        command: FtpCommand,
        arg: Option<&str>,
        sink: &mut W,
        mode: TransferMode,
        context: &'static str,
    ) -> FtpResult<Outcome<u64>>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        self.step(
            &mut replies,
            FtpCommand::TYPE,
            Some(mode.type_argument()),
            Expect::Completion,
            context,
        )
        .await?;

        let mut channel = self.open_data_channel(&mut replies).await?;
        let stream = self
            .send_transfer_command(&mut channel, command, arg, &mut replies, context)
            .await?;
        let Some(mut stream) = stream else {
            return Ok(Outcome::new(0, replies));
        };

        let buffer_size = self.options().download_buffer_size;
        let data_timeout = self.options().data_timeout;
        let copied =
            copy::receive_stream(&mut stream, sink, mode, buffer_size, data_timeout).await;
        drop(stream);

        let received = match copied {
            Ok(received) => received,
            Err(e) => {
                error!("{} {} aborted: {}", command, arg.unwrap_or(""), e);
                channel.close();
                self.drain_transfer_reply(&mut replies).await;
                return Err(e.into());
            }
        };

        self.complete_transfer(&mut channel, command, &mut replies, context)
            .await?;
        Ok(Outcome::new(received, replies))
    }
}
