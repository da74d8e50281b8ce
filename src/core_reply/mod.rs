pub mod codes;
pub mod parser;
pub mod reply;

pub use parser::ReplyParser;
pub use reply::{Reply, ReplyCategory};
