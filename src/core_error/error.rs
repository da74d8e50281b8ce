// Error taxonomy for the FTP client core
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::Reply;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    /// The host could not be reached or refused to serve us.
    #[error("Unable to connect to remote server: {0}")]
    Connection(String),

    /// Credentials rejected or the USER/PASS sequence was broken.
    #[error("Connected to server but unable to authenticate user: {0}")]
    Auth(String),

    /// Malformed reply framing or a command issued out of sequence.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Socket I/O failure in the middle of an operation.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// PASV or PORT negotiation failed.
    #[error("{0}")]
    DataChannel(String),

    /// The server answered a step of an operation with a negative reply.
    #[error("{context} ({step} failed: {reply})")]
    RemoteOperation {
        step: FtpCommand,
        reply: Reply,
        context: &'static str,
    },

    #[error("{context}: {path:?}: {source}")]
    LocalFile {
        path: PathBuf,
        context: &'static str,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type FtpResult<T> = Result<T, FtpError>;

impl FtpError {
    pub(crate) fn remote(step: FtpCommand, reply: Reply, context: &'static str) -> Self {
        FtpError::RemoteOperation {
            step,
            reply,
            context,
        }
    }

    pub(crate) fn local_file(
        path: impl Into<PathBuf>,
        context: &'static str,
        source: std::io::Error,
    ) -> Self {
        FtpError::LocalFile {
            path: path.into(),
            context,
            source,
        }
    }

    /// The server reply that caused the failure, when there is one.
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            FtpError::RemoteOperation { reply, .. } => Some(reply),
            _ => None,
        }
    }

    /// The verb whose reply failed the operation.
    pub fn failed_step(&self) -> Option<FtpCommand> {
        match self {
            FtpError::RemoteOperation { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Whether the control connection can no longer be trusted after this error.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            FtpError::Connection(_) | FtpError::Protocol(_) | FtpError::Transport(_)
        )
    }

    /// Short category name, used by the CLI when reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            FtpError::Connection(_) => "connection",
            FtpError::Auth(_) => "auth",
            FtpError::Protocol(_) => "protocol",
            FtpError::Transport(_) => "transport",
            FtpError::DataChannel(_) => "data-channel",
            FtpError::RemoteOperation { .. } => "remote",
            FtpError::LocalFile { .. } => "local-file",
            FtpError::Config(_) => "config",
        }
    }
}
