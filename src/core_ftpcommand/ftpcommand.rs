use std::fmt;
use std::str::FromStr;

/// The FTP verbs spoken by the client.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    PWD,
    CWD,
    NOOP,
    TYPE,
    PASV,
    PORT,
    STOR,
    RETR,
    NLST,
    LIST,
    SIZE,
    DELE,
    RNFR,
    RNTO,
    MKD,
    RMD,
    SITE,
    CHMOD,
}

impl FtpCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::QUIT => "QUIT",
            FtpCommand::PWD => "PWD",
            FtpCommand::CWD => "CWD",
            FtpCommand::NOOP => "NOOP",
            FtpCommand::TYPE => "TYPE",
            FtpCommand::PASV => "PASV",
            FtpCommand::PORT => "PORT",
            FtpCommand::STOR => "STOR",
            FtpCommand::RETR => "RETR",
            FtpCommand::NLST => "NLST",
            FtpCommand::LIST => "LIST",
            FtpCommand::SIZE => "SIZE",
            FtpCommand::DELE => "DELE",
            FtpCommand::RNFR => "RNFR",
            FtpCommand::RNTO => "RNTO",
            FtpCommand::MKD => "MKD",
            FtpCommand::RMD => "RMD",
            FtpCommand::SITE => "SITE",
            FtpCommand::CHMOD => "CHMOD",
        }
    }

    /// Verbs that move bytes over a data channel and answer with 1xx first.
    pub fn opens_transfer(&self) -> bool {
        matches!(
            self,
            FtpCommand::STOR | FtpCommand::RETR | FtpCommand::NLST | FtpCommand::LIST
        )
    }

    /// Builds the wire line, CRLF included.
    pub fn line(&self, arg: Option<&str>) -> String {
        match arg {
            Some(arg) if !arg.is_empty() => format!("{} {}\r\n", self.verb(), arg),
            _ => format!("{}\r\n", self.verb()),
        }
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

impl FromStr for FtpCommand {
    type Err = ();

    fn from_str(cmd: &str) -> Result<Self, Self::Err> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Ok(FtpCommand::USER),
            "PASS" => Ok(FtpCommand::PASS),
            "QUIT" => Ok(FtpCommand::QUIT),
            "PWD" => Ok(FtpCommand::PWD),
            "CWD" => Ok(FtpCommand::CWD),
            "NOOP" => Ok(FtpCommand::NOOP),
            "TYPE" => Ok(FtpCommand::TYPE),
            "PASV" => Ok(FtpCommand::PASV),
            "PORT" => Ok(FtpCommand::PORT),
            "STOR" => Ok(FtpCommand::STOR),
            "RETR" => Ok(FtpCommand::RETR),
            "NLST" => Ok(FtpCommand::NLST),
            "LIST" => Ok(FtpCommand::LIST),
            "SIZE" => Ok(FtpCommand::SIZE),
            "DELE" => Ok(FtpCommand::DELE),
            "RNFR" => Ok(FtpCommand::RNFR),
            "RNTO" => Ok(FtpCommand::RNTO),
            "MKD" => Ok(FtpCommand::MKD),
            "RMD" => Ok(FtpCommand::RMD),
            "SITE" => Ok(FtpCommand::SITE),
            "CHMOD" => Ok(FtpCommand::CHMOD),
            _ => Err(()),
        }
    }
}
