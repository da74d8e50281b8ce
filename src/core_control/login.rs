use crate::core_control::control::ControlConnection;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::executor::Outcome;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::codes::NEED_ACCOUNT;
use crate::core_reply::{Reply, ReplyCategory};
use crate::session::{ConnectionState, Session};
use log::{info, warn};

impl Session {
    /// Logs in with USER, then PASS when the server asks for a password.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> FtpResult<Outcome<()>> {
        if self.state() != ConnectionState::Connected {
            return Err(FtpError::Protocol(format!(
                "authenticate requires a connected session (state is {:?})",
                self.state()
            )));
        }

        let mut replies = Vec::new();
        let result = login(self.control()?, username, password, &mut replies).await;
        match result {
            Ok(()) => {
                info!("Logged in as {} on {}:{}", username, self.host(), self.port());
                self.mark_authenticated(username);
                Ok(Outcome::new((), replies))
            }
            Err(e) => {
                warn!("Login as {} failed: {}", username, e);
                self.release_if_unusable();
                Err(e)
            }
        }
    }
}

async fn login(
    control: &mut ControlConnection,
    username: &str,
    password: &str,
    replies: &mut Vec<Reply>,
) -> FtpResult<()> {
    let reply = control.execute(FtpCommand::USER, Some(username)).await?;
    replies.push(reply.clone());
    match reply.category() {
        ReplyCategory::PositiveCompletion => return Ok(()),
        ReplyCategory::PositiveIntermediate if reply.code() == NEED_ACCOUNT => {
            return Err(FtpError::Auth(format!(
                "server requires an account, which is not supported: {}",
                reply
            )));
        }
        ReplyCategory::PositiveIntermediate => {}
        _ => return Err(FtpError::Auth(format!("USER rejected: {}", reply))),
    }

    // A password is required: nothing else may be sent before PASS.
    let reply = control.execute(FtpCommand::PASS, Some(password)).await?;
    replies.push(reply.clone());
    if reply.is_completion() {
        return Ok(());
    }
    if reply.code() == NEED_ACCOUNT {
        return Err(FtpError::Auth(format!(
            "server requires an account, which is not supported: {}",
            reply
        )));
    }
    Err(FtpError::Auth(format!("PASS rejected: {}", reply)))
}
