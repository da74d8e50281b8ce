use serde::{Deserialize, Serialize};
use std::fmt;

/// Representation type used for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// TYPE I, bytes go over the wire untouched.
    #[default]
    Binary,
    /// TYPE A, line endings are CRLF on the wire and LF locally.
    Text,
}

impl TransferMode {
    /// Argument for the TYPE command.
    pub fn type_argument(&self) -> &'static str {
        match self {
            TransferMode::Binary => "I",
            TransferMode::Text => "A",
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Binary => f.write_str("binary"),
            TransferMode::Text => f.write_str("text"),
        }
    }
}
