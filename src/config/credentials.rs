//! Credential resolution - flags, environment, authfile, then prompts
//!
//! Passwords deliberately have no place in relay.toml. They come from
//! a flag, a RELAY_* variable, a chmod-600 authfile, or a masked prompt,
//! in that order.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use super::Config;
use crate::cli::{prompts, Args};
use crate::input;

/// A complete login, ready to hand to the dialer.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Enable secret, present only when enable mode was requested.
    pub enable: Option<String>,
}

/// Whatever an authfile actually contained. Every field is optional;
/// missing ones fall through to the next source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFile {
    pub username: Option<String>,
    pub password: Option<String>,
    pub enable: Option<String>,
}

/// Parse `key: value` lines. Unknown keys and lines without a colon
/// are ignored, whitespace around keys and values is trimmed, and a
/// repeated key keeps the last value.
pub fn parse_auth_file(content: &str) -> AuthFile {
    let mut parsed = AuthFile::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_lowercase().as_str() {
            "username" => parsed.username = Some(value.to_string()),
            "password" => parsed.password = Some(value.to_string()),
            "enable" => parsed.enable = Some(value.to_string()),
            _ => {}
        }
    }

    parsed
}

pub fn read_auth_file(path: &Path) -> Result<AuthFile> {
    warn_if_exposed(path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading credentials file {}", path.display()))?;
    Ok(parse_auth_file(&content))
}

/// The RELAY_* variables, captured once. Empty values count as unset.
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    username: Option<String>,
    password: Option<String>,
    authfile: Option<String>,
}

impl EnvOverrides {
    fn capture() -> Self {
        Self {
            username: env_var("RELAY_USERNAME"),
            password: env_var("RELAY_PASSWORD"),
            authfile: env_var("RELAY_AUTHFILE"),
        }
    }
}

/// Resolve the full login. Order per field: CLI flag, RELAY_* variable,
/// authfile, relay.toml, interactive prompt.
pub fn resolve_credentials(args: &Args, config: &Config, want_enable: bool) -> Result<Credentials> {
    resolve_from(args, config, EnvOverrides::capture(), want_enable)
}

fn resolve_from(
    args: &Args,
    config: &Config,
    env: EnvOverrides,
    want_enable: bool,
) -> Result<Credentials> {
    let auth_defaults = config.auth.clone().unwrap_or_default();

    let authfile_path = args
        .authfile
        .clone()
        .or(env.authfile)
        .or(auth_defaults.authfile);
    let from_file = match &authfile_path {
        Some(path) => read_auth_file(&input::expand_path(path))?,
        None => AuthFile::default(),
    };

    let username = match args
        .username
        .clone()
        .or(env.username)
        .or(from_file.username)
        .or(auth_defaults.username)
    {
        Some(username) => username,
        None => prompts::ask_username()?,
    };

    let password = match args
        .password
        .clone()
        .or(env.password)
        .or(from_file.password)
    {
        Some(password) => password,
        None => prompts::ask_password("Password")?,
    };

    let enable = if want_enable {
        Some(match from_file.enable {
            Some(secret) => secret,
            None => prompts::ask_password("Enable secret")?,
        })
    } else {
        None
    };

    Ok(Credentials {
        username,
        password,
        enable,
    })
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(unix)]
pub fn is_group_readable(path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::metadata(path)?.permissions().mode() & 0o040 != 0)
}

#[cfg(unix)]
pub fn is_other_readable(path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::metadata(path)?.permissions().mode() & 0o004 != 0)
}

#[cfg(not(unix))]
pub fn is_group_readable(_path: &Path) -> io::Result<bool> {
    Ok(false)
}

#[cfg(not(unix))]
pub fn is_other_readable(_path: &Path) -> io::Result<bool> {
    Ok(false)
}

/// Advisory only: a world-readable authfile still works, but the
/// operator gets told about it every time.
fn warn_if_exposed(path: &Path) {
    let group = is_group_readable(path).unwrap_or(false);
    let other = is_other_readable(path).unwrap_or(false);

    let who = match (group, other) {
        (true, true) => "group and others",
        (true, false) => "group",
        (false, true) => "others",
        (false, false) => return,
    };

    eprintln!(
        "{} {} is readable by {}; chmod 600 is a better idea",
        "Warning:".yellow().bold(),
        path.display(),
        who
    );
}
