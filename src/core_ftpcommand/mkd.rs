use crate::constants::MKDIR_FAILED;
use crate::core_error::FtpResult;
use crate::core_ftpcommand::executor::{Expect, Outcome};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::helpers::parse_pwd_reply;
use crate::session::Session;
use log::info;

impl Session {
    /// Creates a remote directory. The payload is the path the server
    /// reported in its 257 reply, when it quoted one.
    pub async fn make_directory(&mut self, path: &str) -> FtpResult<Outcome<Option<String>>> {
        self.require_authenticated()?;
        let mut replies = Vec::new();
        let reply = self
            .step(
                &mut replies,
                FtpCommand::MKD,
                Some(path),
                Expect::Completion,
                MKDIR_FAILED,
            )
            .await?;
        info!("Created directory {}", path);
        Ok(Outcome::new(parse_pwd_reply(&reply), replies))
    }
}
