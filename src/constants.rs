// src/constants.rs

pub const DEFAULT_PORT: u16 = 21;
pub const DEFAULT_USERNAME: &str = "anonymous";

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DATA_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_UPLOAD_BUFFER_SIZE: usize = 256 * 1024; // 256 KB
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 128 * 1024; // 128 KB

/// Upper bounds for a single control reply.
pub const MAX_REPLY_LINES: usize = 1024;
pub const MAX_REPLY_LINE_LENGTH: usize = 8 * 1024;

pub const DEFAULT_CHMOD_MODE: u32 = 0o644;

// Human readable failure descriptions surfaced with every error.
pub const PASSIVE_FAILED: &str = "Unable to set passive mode";
pub const ACTIVE_FAILED: &str = "Unable to set active mode";
pub const LOCAL_FILE_MISSING: &str = "Unable to find local file to send";
pub const UPLOAD_FAILED: &str =
    "Unable to send file to remote server, does destination folder exist?";
pub const DOWNLOAD_FAILED: &str = "Unable to download file, does local folder exist";
pub const DELETE_FAILED: &str = "Unable to delete remote file, have you checked permissions.";
pub const RENAME_FAILED: &str = "Unable to rename/move file";
pub const MKDIR_FAILED: &str = "Unable to create remote directory";
pub const RMDIR_FAILED: &str = "Unable to delete remote directory";
pub const CHMOD_FAILED: &str = "Unable to modify permissions";
pub const SIZE_FAILED: &str = "Unable to find remote file";
pub const LIST_FAILED: &str = "Unable to read remote directory";
pub const CWD_FAILED: &str = "Unable to change remote directory";
pub const TYPE_FAILED: &str = "Unable to set transfer mode";
