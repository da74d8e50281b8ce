use crate::constants::DOWNLOAD_FAILED;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::executor::Outcome;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_transfer::TransferMode;
use crate::session::Session;
use log::{debug, info};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWrite;

impl Session {
    /// Downloads `remote_path` with RETR into a local file.
    ///
    /// The local file is created (or truncated) first. It is removed again
    /// when the transfer fails. Returns the number of bytes written locally.
    pub async fn download(
        &mut self,
        remote_path: &str,
        local_path: impl AsRef<Path>,
        mode: TransferMode,
    ) -> FtpResult<Outcome<u64>> {
        let local_path = local_path.as_ref();
        self.require_authenticated()?;

        let mut file = File::create(local_path)
            .await
            .map_err(|e| FtpError::local_file(local_path, DOWNLOAD_FAILED, e))?;

        info!("Downloading {} to {:?} ({})", remote_path, local_path, mode);
        let result = self.download_into(remote_path, &mut file, mode).await;
        drop(file);

        match result {
            Ok(outcome) => {
                info!("Downloaded {} bytes from {}", outcome.payload, remote_path);
                Ok(outcome)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(local_path).await {
                    debug!("Could not remove partial {:?}: {}", local_path, remove_err);
                }
                Err(e)
            }
        }
    }

    /// Downloads `remote_path` into memory.
    pub async fn download_bytes(
        &mut self,
        remote_path: &str,
        mode: TransferMode,
    ) -> FtpResult<Outcome<Vec<u8>>> {
        let mut data = Vec::new();
        let outcome = self.download_into(remote_path, &mut data, mode).await?;
        Ok(outcome.map(|_| data))
    }

    /// Downloads `remote_path` into any writer.
    pub async fn download_into<W>(
        &mut self,
        remote_path: &str,
        sink: &mut W,
        mode: TransferMode,
    ) -> FtpResult<Outcome<u64>>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.receive_transfer(FtpCommand::RETR, Some(remote_path), sink, mode, DOWNLOAD_FAILED)
            .await
    }
}
