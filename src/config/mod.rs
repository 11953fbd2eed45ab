//! Configuration module - handles loading and merging configs

mod credentials;
mod defaults;
mod loader;

pub use credentials::{resolve_credentials, Credentials};
pub use defaults::*;

use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Args;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub connection: Option<ConnectionConfig>,

    #[serde(default)]
    pub auth: Option<AuthConfig>,

    #[serde(default)]
    pub output: Option<OutputConfig>,
}

/// SSH connection tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,

    /// Seconds to wait between commands on the same device
    #[serde(default)]
    pub delay: u64,
}

/// Login defaults. Passwords never live here; use an authfile or the prompt.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub username: Option<String>,

    /// Path to a credentials file, tilde expansion applies
    #[serde(default)]
    pub authfile: Option<String>,
}

/// What happens to captured output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Echo device output to the screen as it arrives
    #[serde(default)]
    pub print: bool,

    /// Write one transcript file per device
    #[serde(default = "default_true")]
    pub write: bool,
}

// Default value functions
fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_command_timeout() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout: default_connect_timeout(),
            command_timeout: default_command_timeout(),
            delay: DEFAULT_INTER_COMMAND_DELAY_SECS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            print: false,
            write: true,
        }
    }
}

/// Everything the run loop needs, resolved from flags over config
/// over defaults and validated once.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub delay: Duration,
    pub print_output: bool,
    pub write_files: bool,
    pub enable: bool,
}

impl Config {
    /// Fold CLI flags over the layered config and validate the result.
    pub fn resolve(&self, args: &Args) -> Result<Settings> {
        let connection = self.connection.clone().unwrap_or_default();
        let output = self.output.clone().unwrap_or_default();

        let port = args.port.unwrap_or(connection.port);
        if port == 0 {
            bail!("port 0 is not a usable SSH port");
        }

        let command_timeout = args.timeout.unwrap_or(connection.command_timeout);
        if command_timeout == 0 {
            bail!("command timeout must be at least 1 second");
        }

        let connect_timeout = args.connect_timeout.unwrap_or(connection.connect_timeout);
        if connect_timeout == 0 {
            bail!("connect timeout must be at least 1 second");
        }

        let delay = args.delay.unwrap_or(connection.delay);

        Ok(Settings {
            port,
            connect_timeout: Duration::from_secs(connect_timeout),
            command_timeout: Duration::from_secs(command_timeout),
            delay: Duration::from_secs(delay),
            print_output: args.print_output || output.print,
            write_files: !args.no_write && output.write,
            enable: args.enable,
        })
    }
}
