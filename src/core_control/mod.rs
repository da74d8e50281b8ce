pub mod control;
pub mod login;

pub use control::ControlConnection;
