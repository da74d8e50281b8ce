pub mod datachannel;
pub mod pasv;
pub mod port;

pub use datachannel::{DataChannel, DataChannelState, DataMode};
