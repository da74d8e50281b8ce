use crate::constants::CHMOD_FAILED;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::executor::{evaluate, Expect, Outcome};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::codes::{COMMAND_NOT_IMPLEMENTED, COMMAND_UNRECOGNIZED};
use crate::session::{ChmodSupport, Session};
use log::{debug, info};

/// Highest mode a chmod request may carry (setuid, setgid, sticky, rwx x3).
pub const MAX_MODE: u32 = 0o7777;

impl Session {
    /// Changes permissions of a remote path. `mode` is sent in octal.
    ///
    /// The dedicated CHMOD verb is tried first. When the server does not know
    /// it, SITE CHMOD is used instead and that choice sticks for the session.
    pub async fn set_permissions(&mut self, path: &str, mode: u32) -> FtpResult<Outcome<()>> {
        if mode > MAX_MODE {
            return Err(FtpError::Config(format!(
                "permission mode {:o} is out of range",
                mode
            )));
        }
        self.require_authenticated()?;
        let mut replies = Vec::new();
        let arg = format!("{:o} {}", mode, path);

        if self.chmod_support != ChmodSupport::Site {
            let reply = self.execute(FtpCommand::CHMOD, Some(&arg)).await?;
            replies.push(reply.clone());

            let unsupported =
                matches!(reply.code(), COMMAND_UNRECOGNIZED | COMMAND_NOT_IMPLEMENTED);
            if unsupported && self.chmod_support == ChmodSupport::Unknown {
                debug!("CHMOD not supported ({}), using SITE CHMOD", reply);
                self.chmod_support = ChmodSupport::Site;
            } else {
                if let Err(e) = evaluate(FtpCommand::CHMOD, reply, Expect::Completion, CHMOD_FAILED) {
                    self.release_if_unusable();
                    return Err(e);
                }
                self.chmod_support = ChmodSupport::Dedicated;
                info!("Set permissions {:o} on {}", mode, path);
                return Ok(Outcome::new((), replies));
            }
        }

        let site_arg = format!("CHMOD {}", arg);
        self.step(
            &mut replies,
            FtpCommand::SITE,
            Some(&site_arg),
            Expect::Completion,
            CHMOD_FAILED,
        )
        .await?;
        info!("Set permissions {:o} on {} (SITE)", mode, path);
        Ok(Outcome::new((), replies))
    }
}
