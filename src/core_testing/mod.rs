pub mod fake_server;

pub use fake_server::{FakeServer, FakeServerConfig};
