use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::Reply;

/// Rejects arguments that would smuggle a second command onto the control line.
pub fn validate_argument(arg: &str) -> FtpResult<()> {
    if arg.contains(['\r', '\n']) {
        return Err(FtpError::Protocol(format!(
            "argument contains a line break: {:?}",
            arg
        )));
    }
    Ok(())
}

/// Renders a command for the logs. Passwords are never written out.
pub fn loggable_command(command: FtpCommand, arg: Option<&str>) -> String {
    match (command, arg) {
        (FtpCommand::PASS, _) => "PASS ****".to_string(),
        (_, Some(arg)) if !arg.is_empty() => format!("{} {}", command, arg),
        _ => command.to_string(),
    }
}

/// Extracts the directory from a `257 "/some/path" is current directory` reply.
/// A doubled quote inside the name stands for one quote character.
pub fn parse_pwd_reply(reply: &Reply) -> Option<String> {
    let text = reply.message();
    let start = text.find('"')?;
    let mut chars = text[start + 1..].chars().peekable();
    let mut path = String::new();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                path.push('"');
            } else {
                return Some(path);
            }
        } else {
            path.push(c);
        }
    }
    None
}

/// Splits a NLST/LIST payload into its non-empty lines.
pub fn split_listing(data: &str) -> Vec<String> {
    data.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
