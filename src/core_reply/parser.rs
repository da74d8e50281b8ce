use crate::constants::MAX_REPLY_LINES;
use crate::core_error::{FtpError, FtpResult};
use crate::core_reply::Reply;

/// Line oriented reply parser.
///
/// A reply either fits on one line (`226 Transfer complete.`) or spans several,
/// opening with `ddd-` and closing with the first line that starts with the
/// same `ddd ` prefix. Lines in between are kept as they are, they do not need
/// to carry the code.
#[derive(Debug)]
pub struct ReplyParser {
    pending: Option<PendingReply>,
    max_lines: usize,
}

#[derive(Debug)]
struct PendingReply {
    code: u16,
    end_prefix: [u8; 4],
    lines: Vec<String>,
}

impl Default for ReplyParser {
    fn default() -> Self {
        ReplyParser::new()
    }
}

impl ReplyParser {
    pub fn new() -> Self {
        ReplyParser::with_max_lines(MAX_REPLY_LINES)
    }

    pub fn with_max_lines(max_lines: usize) -> Self {
        ReplyParser {
            pending: None,
            max_lines,
        }
    }

    /// True when no multi-line reply is half way through.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// Feeds one line (with or without its CRLF). Returns the reply once the
    /// terminating line has been seen.
    pub fn feed_line(&mut self, line: &str) -> FtpResult<Option<Reply>> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(pending) = self.pending.as_mut() {
            let bytes = line.as_bytes();
            let terminates = bytes.starts_with(&pending.end_prefix)
                || bytes == &pending.end_prefix[..3];
            if terminates {
                let text = line.get(4..).unwrap_or("");
                pending.lines.push(text.trim_end().to_string());
                let code = pending.code;
                let lines = std::mem::take(&mut pending.lines);
                self.pending = None;
                return Reply::new(code, lines).map(Some);
            }

            if pending.lines.len() >= self.max_lines {
                self.pending = None;
                return Err(FtpError::Protocol(format!(
                    "multi-line reply exceeds {} lines",
                    self.max_lines
                )));
            }
            // do not trim whitespace at beginning
            pending.lines.push(line.trim_end().to_string());
            return Ok(None);
        }

        let code = parse_code(line)?;
        match line.as_bytes().get(3) {
            None => Reply::new(code, vec![String::new()]).map(Some),
            Some(b' ') => Reply::new(code, vec![line[4..].trim_end().to_string()]).map(Some),
            Some(b'-') => {
                let bytes = line.as_bytes();
                self.pending = Some(PendingReply {
                    code,
                    end_prefix: [bytes[0], bytes[1], bytes[2], b' '],
                    lines: vec![line[4..].trim_end().to_string()],
                });
                Ok(None)
            }
            Some(_) => Err(FtpError::Protocol(format!("malformed reply line: '{}'", line))),
        }
    }

    /// Parses a complete block of reply text. Fails if the text ends in the
    /// middle of a multi-line reply.
    pub fn parse_all(text: &str) -> FtpResult<Vec<Reply>> {
        let mut parser = ReplyParser::new();
        let mut replies = Vec::new();
        for line in text.split_inclusive('\n') {
            if let Some(reply) = parser.feed_line(line)? {
                replies.push(reply);
            }
        }
        if !parser.is_idle() {
            return Err(FtpError::Protocol(
                "reply text ended inside a multi-line reply".to_string(),
            ));
        }
        Ok(replies)
    }
}

/// Parses the 3-digit reply code at the start of a line.
fn parse_code(line: &str) -> FtpResult<u16> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(FtpError::Protocol(format!(
            "reply line does not start with a code: '{}'",
            line
        )));
    }
    let code = bytes[..3]
        .iter()
        .fold(0u16, |acc, b| acc * 10 + (b - b'0') as u16);
    if !(100..600).contains(&code) {
        return Err(FtpError::Protocol(format!("invalid reply code {}", code)));
    }
    Ok(code)
}
