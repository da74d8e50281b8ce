use crate::constants::{SIZE_FAILED, TYPE_FAILED};
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::executor::{evaluate, Expect, Outcome};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::codes::FILE_UNAVAILABLE;
use crate::core_transfer::TransferMode;
use crate::session::Session;
use log::debug;

impl Session {
    /// Size of a remote file in bytes, or `None` when the server says the
    /// file does not exist (550). SIZE is asked in binary mode so the count
    /// is the stored byte count.
    pub async fn file_size(&mut self, path: &str) -> FtpResult<Outcome<Option<u64>>> {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        self.step(
            &mut replies,
            FtpCommand::TYPE,
            Some(TransferMode::Binary.type_argument()),
            Expect::Completion,
            TYPE_FAILED,
        )
        .await?;

        let reply = self.execute(FtpCommand::SIZE, Some(path)).await?;
        replies.push(reply.clone());
        if reply.code() == FILE_UNAVAILABLE {
            debug!("{} not found: {}", path, reply);
            return Ok(Outcome::new(None, replies));
        }

        let reply = match evaluate(FtpCommand::SIZE, reply, Expect::Completion, SIZE_FAILED) {
            Ok(reply) => reply,
            Err(e) => {
                self.release_if_unusable();
                return Err(e);
            }
        };
        let size = parse_size_reply(reply.lines().last().map(String::as_str).unwrap_or(""))
            .ok_or_else(|| FtpError::Protocol(format!("malformed SIZE reply: {}", reply)))?;
        Ok(Outcome::new(Some(size), replies))
    }
}

fn parse_size_reply(text: &str) -> Option<u64> {
    text.split_whitespace().next()?.parse().ok()
}
