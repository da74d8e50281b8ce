use crate::constants::LIST_FAILED;
use crate::core_error::FtpResult;
use crate::core_ftpcommand::executor::Outcome;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_transfer::TransferMode;
use crate::helpers::split_listing;
use crate::session::Session;
use log::info;

impl Session {
    /// Entry names of a remote directory (NLST). An empty `path` lists the
    /// current directory. An empty directory yields an empty list.
    pub async fn list_directory(&mut self, path: &str) -> FtpResult<Outcome<Vec<String>>> {
        self.listing(FtpCommand::NLST, path).await
    }

    /// Raw LIST lines, in whatever format the server uses.
    pub async fn list_details(&mut self, path: &str) -> FtpResult<Outcome<Vec<String>>> {
        self.listing(FtpCommand::LIST, path).await
    }

    async fn listing(
        &mut self,
        command: FtpCommand,
        path: &str,
    ) -> FtpResult<Outcome<Vec<String>>> {
        let arg = if path.is_empty() { None } else { Some(path) };
        let mut data = Vec::new();
        let outcome = self
            .receive_transfer(command, arg, &mut data, TransferMode::Text, LIST_FAILED)
            .await?;

        let entries = split_listing(&String::from_utf8_lossy(&data));
        info!("{} {}: {} entries", command, path, entries.len());
        Ok(outcome.map(|_| entries))
    }
}
