pub mod client;

#[cfg(test)]
mod test_client;

pub use client::FtpClient;
