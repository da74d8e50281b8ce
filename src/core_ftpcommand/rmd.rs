use crate::constants::RMDIR_FAILED;
use crate::core_error::FtpResult;
use crate::core_ftpcommand::executor::{Expect, Outcome};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::session::Session;
use log::info;

impl Session {
    /// Removes a remote directory with RMD. Most servers refuse non-empty ones.
    pub async fn remove_directory(&mut self, path: &str) -> FtpResult<Outcome<()>> {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        self.step(
            &mut replies,
            FtpCommand::RMD,
            Some(path),
            Expect::Completion,
            RMDIR_FAILED,
        )
        .await?;
        info!("Removed directory {}", path);
        Ok(Outcome::new((), replies))
    }
}
