pub mod config;
pub mod constants;
pub mod core_cli;
pub mod core_client;
pub mod core_control;
pub mod core_error;
pub mod core_ftpcommand;
pub mod core_log;
pub mod core_network;
pub mod core_reply;
pub mod core_transfer;
pub mod helpers;
pub mod runner;
pub mod session;

#[cfg(test)]
mod core_testing;

pub use core_client::FtpClient;
pub use core_error::{FtpError, FtpResult};
pub use core_ftpcommand::Outcome;
pub use core_reply::{Reply, ReplyCategory};
pub use core_transfer::TransferMode;
pub use session::{Session, SessionOptions, SharedSession};
