use crate::constants::CWD_FAILED;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::executor::{evaluate, Expect, Outcome};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::ReplyCategory;
use crate::helpers::parse_pwd_reply;
use crate::session::Session;
use log::{debug, warn};

impl Session {
    /// Working directory as reported by PWD.
    pub async fn current_directory(&mut self) -> FtpResult<Outcome<String>> {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        let reply = self
            .step(&mut replies, FtpCommand::PWD, None, Expect::Completion, CWD_FAILED)
            .await?;
        let path = parse_pwd_reply(&reply)
            .ok_or_else(|| FtpError::Protocol(format!("malformed PWD reply: {}", reply)))?;
        Ok(Outcome::new(path, replies))
    }

    pub async fn change_directory(&mut self, path: &str) -> FtpResult<Outcome<()>> {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        self.step(
            &mut replies,
            FtpCommand::CWD,
            Some(path),
            Expect::Completion,
            CWD_FAILED,
        )
        .await?;
        debug!("Changed directory to {}", path);
        Ok(Outcome::new((), replies))
    }

    /// Whether `path` is a directory the user may enter. A 5xx answer to the
    /// probe means no; a 4xx answer is an error.
    ///
    /// Probes with CWD and goes back to the previous working directory
    /// afterwards, so the session's location is unchanged.
    pub async fn directory_exists(&mut self, path: &str) -> FtpResult<Outcome<bool>> {
        let previous = self.current_directory().await?;
        let mut replies = previous.replies;

        let reply = self.execute(FtpCommand::CWD, Some(path)).await?;
        replies.push(reply.clone());
        if reply.category() == ReplyCategory::PermanentNegative {
            debug!("{} is not a directory: {}", path, reply);
            return Ok(Outcome::new(false, replies));
        }
        // 4xx says nothing about the directory, only that the server could not answer.
        if let Err(e) = evaluate(FtpCommand::CWD, reply, Expect::Completion, CWD_FAILED) {
            self.release_if_unusable();
            return Err(e);
        }

        if let Err(e) = self
            .step(
                &mut replies,
                FtpCommand::CWD,
                Some(&previous.payload),
                Expect::Completion,
                CWD_FAILED,
            )
            .await
        {
            warn!("Could not return to {}: {}", previous.payload, e);
            return Err(e);
        }
        Ok(Outcome::new(true, replies))
    }
}
