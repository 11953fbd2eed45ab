//! Default configuration values

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default per-command timeout in seconds
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;

/// Default TCP connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default pause between commands in seconds
pub const DEFAULT_INTER_COMMAND_DELAY_SECS: u64 = 0;
