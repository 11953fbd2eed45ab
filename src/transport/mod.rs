//! Device session plumbing
//!
//! The run loop talks to [`DeviceSession`] and [`Dialer`] only, so the
//! real SSH machinery stays behind one seam and tests can stand in a
//! scripted session without opening a socket.

use std::io;

use thiserror::Error;

mod ssh;

pub use ssh::SshDialer;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not resolve {host}:{port}")]
    Resolve { host: String, port: u16 },

    #[error("tcp connect to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("ssh handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: ssh2::Error,
    },

    #[error("authentication failed for {username}@{host}")]
    Auth { username: String, host: String },

    #[error("shell channel setup on {host} failed: {source}")]
    Channel {
        host: String,
        #[source]
        source: ssh2::Error,
    },

    #[error("enable mode refused on {host}")]
    EnableFailed { host: String },

    #[error("no recognizable prompt from {host} within {seconds}s")]
    NoPrompt { host: String, seconds: u64 },

    #[error("command timed out after {seconds}s ({captured} bytes captured)")]
    CommandTimeout { seconds: u64, captured: usize },

    #[error("channel to {host} closed unexpectedly")]
    ChannelClosed { host: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One logged-in device, ready to take commands.
pub trait DeviceSession {
    /// Hostname parsed from the device prompt at login.
    fn hostname(&self) -> &str;

    /// Send one command and wait for the prompt to come back. Returns
    /// the captured output with the echo and prompt lines stripped.
    fn run(&mut self, command: &str) -> Result<String, SessionError>;
}

/// Opens sessions. One dialer serves a whole batch run.
pub trait Dialer {
    fn dial(&self, host: &str) -> Result<Box<dyn DeviceSession>, SessionError>;
}
