use crate::constants::DELETE_FAILED;
use crate::core_error::FtpResult;
use crate::core_ftpcommand::executor::{Expect, Outcome};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::session::Session;
use log::info;

impl Session {
    /// Deletes a remote file with DELE.
    pub async fn delete(&mut self, path: &str) -> FtpResult<Outcome<()>> {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        self.step(
            &mut replies,
            FtpCommand::DELE,
            Some(path),
            Expect::Completion,
            DELETE_FAILED,
        )
        .await?;
        info!("Deleted {}", path);
        Ok(Outcome::new((), replies))
    }
}
