use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::{Reply, ReplyCategory};
use crate::session::Session;
use log::debug;

/// Result of one high level operation: its payload plus every reply read
/// while it ran, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub payload: T,
    pub replies: Vec<Reply>,
}

impl<T> Outcome<T> {
    pub fn new(payload: T, replies: Vec<Reply>) -> Self {
        Outcome { payload, replies }
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            payload: f(self.payload),
            replies: self.replies,
        }
    }
}

/// What a step accepts besides a 2xx completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Only 2xx.
    Completion,
    /// 3xx, the sequence continues with another verb (RNFR).
    Intermediate,
    /// 1xx or 2xx, the verb opens a data transfer.
    TransferStart,
}

/// Maps a reply to the outcome of one step.
pub fn evaluate(
    step: FtpCommand,
    reply: Reply,
    expect: Expect,
    context: &'static str,
) -> FtpResult<Reply> {
    let accepted = match (reply.category(), expect) {
        (ReplyCategory::PositiveCompletion, Expect::Intermediate) => false,
        (ReplyCategory::PositiveCompletion, _) => true,
        (ReplyCategory::PositivePreliminary, Expect::TransferStart) => true,
        (ReplyCategory::PositiveIntermediate, Expect::Intermediate) => true,
        _ => false,
    };
    if accepted {
        Ok(reply)
    } else {
        Err(FtpError::remote(step, reply, context))
    }
}

impl Session {
    /// Runs one step of an operation: sends the verb, records the reply and
    /// applies the reply policy. A failing step leaves the session usable
    /// unless the control connection fell out of step.
    pub(crate) async fn step(
        &mut self,
        replies: &mut Vec<Reply>,
        command: FtpCommand,
        arg: Option<&str>,
        expect: Expect,
        context: &'static str,
    ) -> FtpResult<Reply> {
        let reply = self.execute(command, arg).await?;
        replies.push(reply.clone());
        let result = evaluate(command, reply, expect, context);
        if let Err(e) = &result {
            debug!("Step {} failed: {}", command, e);
            self.release_if_unusable();
        }
        result
    }
}
