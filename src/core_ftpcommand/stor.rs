use crate::constants::{LOCAL_FILE_MISSING, UPLOAD_FAILED};
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::executor::Outcome;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_transfer::TransferMode;
use crate::session::Session;
use log::{info, warn};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncRead;

impl Session {
    /// Uploads a local file to `remote_path` with STOR.
    ///
    /// The local file is checked before anything is sent to the server.
    /// Returns the number of local bytes sent.
    pub async fn upload(
        &mut self,
        local_path: impl AsRef<Path>,
        remote_path: &str,
        mode: TransferMode,
    ) -> FtpResult<Outcome<u64>> {
        let local_path = local_path.as_ref();
        self.require_authenticated()?;

        match tokio::fs::metadata(local_path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                warn!("{:?} is not a regular file", local_path);
                return Err(FtpError::local_file(
                    local_path,
                    LOCAL_FILE_MISSING,
                    io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
                ));
            }
            Err(e) => return Err(FtpError::local_file(local_path, LOCAL_FILE_MISSING, e)),
        }

        let mut file = File::open(local_path)
            .await
            .map_err(|e| FtpError::local_file(local_path, LOCAL_FILE_MISSING, e))?;

        info!("Uploading {:?} to {} ({})", local_path, remote_path, mode);
        let outcome = self.upload_from(&mut file, remote_path, mode).await?;
        info!("Uploaded {} bytes to {}", outcome.payload, remote_path);
        Ok(outcome)
    }

    /// Uploads an in-memory buffer.
    pub async fn upload_bytes(
        &mut self,
        data: &[u8],
        remote_path: &str,
        mode: TransferMode,
    ) -> FtpResult<Outcome<u64>> {
        let mut reader = data;
        self.upload_from(&mut reader, remote_path, mode).await
    }

    /// Uploads whatever `source` yields until EOF.
    pub async fn upload_from<R>(
        &mut self,
        source: &mut R,
        remote_path: &str,
        mode: TransferMode,
    ) -> FtpResult<Outcome<u64>>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.send_transfer(FtpCommand::STOR, remote_path, source, mode, UPLOAD_FAILED)
            .await
    }
}
