// Reply codes the client reacts to explicitly (RFC 959 §4.2).

pub const SERVICE_READY_IN: u16 = 120;
pub const FILE_STATUS_OK: u16 = 150;
pub const COMMAND_OK: u16 = 200;
pub const FILE_STATUS: u16 = 213;
pub const SERVICE_READY: u16 = 220;
pub const CLOSING_CONTROL: u16 = 221;
pub const CLOSING_DATA: u16 = 226;
pub const ENTERING_PASSIVE: u16 = 227;
pub const LOGGED_IN: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATHNAME_CREATED: u16 = 257;
pub const NEED_PASSWORD: u16 = 331;
pub const NEED_ACCOUNT: u16 = 332;
pub const PENDING_FURTHER_INFO: u16 = 350;
pub const SERVICE_NOT_AVAILABLE: u16 = 421;
pub const CANT_OPEN_DATA: u16 = 425;
pub const COMMAND_UNRECOGNIZED: u16 = 500;
pub const SYNTAX_ERROR_ARGS: u16 = 501;
pub const COMMAND_NOT_IMPLEMENTED: u16 = 502;
pub const NOT_LOGGED_IN: u16 = 530;
pub const FILE_UNAVAILABLE: u16 = 550;
