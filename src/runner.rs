use crate::constants::{DEFAULT_CHMOD_MODE, SIZE_FAILED};
use crate::core_cli::Command;
use crate::core_client::FtpClient;
use crate::core_transfer::TransferMode;
use anyhow::{Context, Result};
use log::info;

/// Runs one CLI command over a one-shot connection and returns what to print.
pub async fn run(client: &FtpClient, command: &Command, mode: TransferMode) -> Result<String> {
    info!(
        "Running {:?} against {}:{}",
        command,
        client.host(),
        client.port()
    );

    let output = match command {
        Command::Upload { local, remote } => {
            let sent = client
                .upload(local, remote, mode)
                .await
                .with_context(|| format!("upload of {:?} failed", local))?;
            format!("{} bytes sent to {}", sent, remote)
        }
        Command::Download { remote, local } => {
            let received = client
                .download(remote, local, mode)
                .await
                .with_context(|| format!("download of {} failed", remote))?;
            format!("{} bytes written to {}", received, local.display())
        }
        Command::Delete { path } => {
            client.delete(path).await?;
            format!("{} deleted", path)
        }
        Command::Rename { from, to } => {
            client.rename(from, to).await?;
            format!("{} renamed to {}", from, to)
        }
        Command::Mkdir { path } => {
            let created = client.make_directory(path).await?;
            format!("{} created", created.as_deref().unwrap_or(path))
        }
        Command::Rmdir { path } => {
            client.remove_directory(path).await?;
            format!("{} removed", path)
        }
        Command::Chmod { path, mode } => {
            let mode = mode.unwrap_or(DEFAULT_CHMOD_MODE);
            client.set_permissions(path, mode).await?;
            format!("{} set to {:o}", path, mode)
        }
        Command::Size { path } => match client.file_size(path).await? {
            Some(size) => format!("{} {}", size, path),
            None => anyhow::bail!("{}: {}", SIZE_FAILED, path),
        },
        Command::Exists { path } => {
            if client.directory_exists(path).await? {
                format!("{} exists", path)
            } else {
                anyhow::bail!("{} does not exist", path)
            }
        }
        Command::Ls { path, long } => {
            let entries = if *long {
                client.list_details(path).await?
            } else {
                client.list_directory(path).await?
            };
            entries.join("\n")
        }
    };
    Ok(output)
}
