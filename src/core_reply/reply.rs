use crate::core_error::{FtpError, FtpResult};
use std::fmt;

/// Outcome class of a reply, taken from the first digit of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyCategory {
    PositivePreliminary,
    PositiveCompletion,
    PositiveIntermediate,
    TransientNegative,
    PermanentNegative,
}

impl ReplyCategory {
    pub fn from_code(code: u16) -> Option<ReplyCategory> {
        match code / 100 {
            1 => Some(ReplyCategory::PositivePreliminary),
            2 => Some(ReplyCategory::PositiveCompletion),
            3 => Some(ReplyCategory::PositiveIntermediate),
            4 => Some(ReplyCategory::TransientNegative),
            5 => Some(ReplyCategory::PermanentNegative),
            _ => None,
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            ReplyCategory::TransientNegative | ReplyCategory::PermanentNegative
        )
    }
}

/// A parsed server reply. The code is always within 100..=599.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: u16,
    category: ReplyCategory,
    lines: Vec<String>,
}

impl Reply {
    pub fn new(code: u16, lines: Vec<String>) -> FtpResult<Reply> {
        let category = ReplyCategory::from_code(code)
            .ok_or_else(|| FtpError::Protocol(format!("invalid reply code {}", code)))?;
        Ok(Reply {
            code,
            category,
            lines,
        })
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn category(&self) -> ReplyCategory {
        self.category
    }

    /// Message lines with the code prefix stripped from the first and last line.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_preliminary(&self) -> bool {
        self.category == ReplyCategory::PositivePreliminary
    }

    pub fn is_completion(&self) -> bool {
        self.category == ReplyCategory::PositiveCompletion
    }

    pub fn is_intermediate(&self) -> bool {
        self.category == ReplyCategory::PositiveIntermediate
    }

    pub fn is_negative(&self) -> bool {
        self.category.is_negative()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lines.last() {
            Some(last) if !last.is_empty() => write!(f, "{} {}", self.code, last),
            _ => write!(f, "{}", self.code),
        }
    }
}
