pub mod ascii;
pub mod copy;
pub mod mode;

pub use mode::TransferMode;
