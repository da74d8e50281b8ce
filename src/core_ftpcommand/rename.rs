use crate::constants::RENAME_FAILED;
use crate::core_error::FtpResult;
use crate::core_ftpcommand::executor::{Expect, Outcome};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::session::Session;
use log::info;

impl Session {
    /// Renames or moves a remote path: RNFR must be answered 3xx before
    /// RNTO is sent.
    pub async fn rename(&mut self, from: &str, to: &str) -> FtpResult<Outcome<()>> {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        self.step(
            &mut replies,
            FtpCommand::RNFR,
            Some(from),
            Expect::Intermediate,
            RENAME_FAILED,
        )
        .await?;
        self.step(
            &mut replies,
            FtpCommand::RNTO,
            Some(to),
            Expect::Completion,
            RENAME_FAILED,
        )
        .await?;
        info!("Renamed {} to {}", from, to);
        Ok(Outcome::new((), replies))
    }
}
