pub mod chmod;
pub mod cwd;
pub mod dele;
pub mod executor;
pub mod ftpcommand;
pub mod list;
pub mod mkd;
pub mod rename;
pub mod retr;
pub mod rmd;
pub mod size;
pub mod stor;
pub mod transfer;

pub use executor::Outcome;
pub use ftpcommand::FtpCommand;

mod test_operations;
