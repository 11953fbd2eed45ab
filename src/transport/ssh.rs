//! Interactive SSH sessions against network devices
//!
//! Network gear wants a pty and a shell, not exec channels: IOS closes
//! exec channels after one command and enable mode needs a live dialog.
//! So each device gets one shell channel and commands are typed into it,
//! reading until the prompt comes back.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;
use ssh2::Session;

use super::{DeviceSession, Dialer, SessionError};
use crate::config::Credentials;

/// `r1>`, `sw-core-01#`, `r1(config-if)#` and friends. The first
/// capture is the hostname, the second the privilege sigil.
const PROMPT_PATTERN: &str = r"^([A-Za-z0-9][A-Za-z0-9_.-]*)(?:\([^)]*\))?([>#])\s*$";

pub struct SshDialer {
    credentials: Credentials,
    port: u16,
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl SshDialer {
    pub fn new(
        credentials: Credentials,
        port: u16,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Self {
        Self {
            credentials,
            port,
            connect_timeout,
            command_timeout,
        }
    }
}

impl Dialer for SshDialer {
    fn dial(&self, host: &str) -> Result<Box<dyn DeviceSession>, SessionError> {
        let session = SshSession::open(
            host,
            self.port,
            &self.credentials,
            self.connect_timeout,
            self.command_timeout,
        )?;
        Ok(Box::new(session))
    }
}

pub struct SshSession {
    channel: ssh2::Channel,
    // The channel keeps the session alive internally; held here so the
    // connection outlives any reordering of struct drops.
    _session: Session,
    host: String,
    hostname: String,
    prompt: Regex,
    command_timeout: Duration,
}

impl SshSession {
    fn open(
        host: &str,
        port: u16,
        credentials: &Credentials,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let mut addrs = (host, port)
            .to_socket_addrs()
            .map_err(|source| SessionError::Connect {
                host: host.to_string(),
                port,
                source,
            })?;
        let addr = addrs.next().ok_or_else(|| SessionError::Resolve {
            host: host.to_string(),
            port,
        })?;
        let tcp = TcpStream::connect_timeout(&addr, connect_timeout).map_err(|source| {
            SessionError::Connect {
                host: host.to_string(),
                port,
                source,
            }
        })?;

        let mut session = Session::new().map_err(|source| SessionError::Handshake {
            host: host.to_string(),
            source,
        })?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout_ms(command_timeout));
        session
            .handshake()
            .map_err(|source| SessionError::Handshake {
                host: host.to_string(),
                source,
            })?;

        session
            .userauth_password(&credentials.username, &credentials.password)
            .map_err(|_| SessionError::Auth {
                username: credentials.username.clone(),
                host: host.to_string(),
            })?;
        if !session.authenticated() {
            return Err(SessionError::Auth {
                username: credentials.username.clone(),
                host: host.to_string(),
            });
        }

        let mut channel = session
            .channel_session()
            .map_err(|source| SessionError::Channel {
                host: host.to_string(),
                source,
            })?;
        channel
            .request_pty("vt100", None, None)
            .map_err(|source| SessionError::Channel {
                host: host.to_string(),
                source,
            })?;
        channel.shell().map_err(|source| SessionError::Channel {
            host: host.to_string(),
            source,
        })?;

        let mut connection = Self {
            channel,
            _session: session,
            host: host.to_string(),
            hostname: String::new(),
            prompt: prompt_regex(),
            command_timeout,
        };

        // Wake the line, swallow any banner, and learn the hostname.
        connection.send_line("")?;
        let greeting = connection.read_until_prompt().map_err(|e| match e {
            SessionError::CommandTimeout { seconds, .. } => SessionError::NoPrompt {
                host: connection.host.clone(),
                seconds,
            },
            other => other,
        })?;
        let first = find_prompt(tail(&greeting), &connection.prompt).ok_or_else(|| {
            SessionError::NoPrompt {
                host: connection.host.clone(),
                seconds: command_timeout.as_secs(),
            }
        })?;
        connection.hostname = first.hostname;

        if let Some(secret) = &credentials.enable {
            if !first.privileged {
                connection.enter_enable(secret)?;
            }
        }

        // Stop the pager so long output never waits on a keypress.
        connection.send_line("terminal length 0")?;
        connection.read_until_prompt()?;

        Ok(connection)
    }

    fn enter_enable(&mut self, secret: &str) -> Result<(), SessionError> {
        let prompt = self.prompt.clone();
        let password = password_prompt_regex();

        self.send_line("enable")?;
        let reply = {
            let stop_prompt = prompt.clone();
            let stop_password = password.clone();
            self.read_until(move |line| {
                stop_password.is_match(line) || stop_prompt.is_match(line)
            })
            .map_err(|_| SessionError::EnableFailed {
                host: self.host.clone(),
            })?
        };

        if password.is_match(tail(&reply)) {
            self.send_line(secret)?;
            let confirm = {
                let stop_prompt = prompt.clone();
                self.read_until(move |line| stop_prompt.is_match(line))
                    .map_err(|_| SessionError::EnableFailed {
                        host: self.host.clone(),
                    })?
            };
            self.confirm_privileged(tail(&confirm), &prompt)
        } else {
            // Some devices skip the password dialog entirely.
            self.confirm_privileged(tail(&reply), &prompt)
        }
    }

    fn confirm_privileged(&mut self, line: &str, prompt: &Regex) -> Result<(), SessionError> {
        match find_prompt(line, prompt) {
            Some(after) if after.privileged => {
                self.hostname = after.hostname;
                Ok(())
            }
            _ => Err(SessionError::EnableFailed {
                host: self.host.clone(),
            }),
        }
    }

    fn send_line(&mut self, line: &str) -> Result<(), SessionError> {
        self.channel.write_all(line.as_bytes())?;
        self.channel.write_all(b"\n")?;
        self.channel.flush()?;
        Ok(())
    }

    fn read_until_prompt(&mut self) -> Result<String, SessionError> {
        let prompt = self.prompt.clone();
        self.read_until(move |line| prompt.is_match(line))
    }

    /// Accumulate channel output until the last line satisfies `stop`
    /// or the command timeout runs out. The deadline covers the whole
    /// capture, not just the first byte.
    fn read_until<F>(&mut self, stop: F) -> Result<String, SessionError>
    where
        F: Fn(&str) -> bool,
    {
        let deadline = Instant::now() + self.command_timeout;
        let mut captured = String::new();
        let mut buf = [0u8; 4096];

        loop {
            match self.channel.read(&mut buf) {
                Ok(0) => {
                    if self.channel.eof() {
                        return Err(SessionError::ChannelClosed {
                            host: self.host.clone(),
                        });
                    }
                    thread::sleep(Duration::from_millis(25));
                }
                Ok(n) => {
                    captured.push_str(&String::from_utf8_lossy(&buf[..n]));
                    if stop(tail(&captured)) {
                        return Ok(captured);
                    }
                }
                Err(e) if retryable(&e) => {}
                Err(e) => return Err(SessionError::Io(e)),
            }

            if Instant::now() >= deadline {
                return Err(SessionError::CommandTimeout {
                    seconds: self.command_timeout.as_secs(),
                    captured: captured.len(),
                });
            }
        }
    }
}

impl DeviceSession for SshSession {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn run(&mut self, command: &str) -> Result<String, SessionError> {
        self.send_line(command)?;
        let captured = self.read_until_prompt()?;
        Ok(clean_capture(&captured, command, &self.prompt))
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        let _ = self.channel.send_eof();
        let _ = self.channel.close();
    }
}

struct PromptMatch {
    hostname: String,
    privileged: bool,
}

fn prompt_regex() -> Regex {
    Regex::new(PROMPT_PATTERN).unwrap()
}

fn password_prompt_regex() -> Regex {
    Regex::new(r"(?i)password\s*:\s*$").unwrap()
}

fn find_prompt(line: &str, prompt: &Regex) -> Option<PromptMatch> {
    let caps = prompt.captures(line)?;
    Some(PromptMatch {
        hostname: caps[1].to_string(),
        privileged: &caps[2] == "#",
    })
}

/// Everything after the last newline; the line the cursor sits on.
fn tail(text: &str) -> &str {
    match text.rfind('\n') {
        Some(i) => &text[i + 1..],
        None => text,
    }
}

fn retryable(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

fn timeout_ms(timeout: Duration) -> u32 {
    timeout.as_millis().min(u32::MAX as u128) as u32
}

/// Strip the pty artifacts out of a raw capture: CRLF endings, the
/// echoed command on the first line, the prompt waiting at the bottom.
fn clean_capture(captured: &str, command: &str, prompt: &Regex) -> String {
    let text = captured.replace("\r\n", "\n").replace('\r', "");
    let mut lines: Vec<&str> = text.lines().collect();

    while lines.first().map_or(false, |l| l.trim().is_empty()) {
        lines.remove(0);
    }
    if lines.first().map_or(false, |l| l.trim() == command.trim()) {
        lines.remove(0);
    }
    while lines
        .last()
        .map_or(false, |l| l.trim().is_empty() || prompt.is_match(l))
    {
        lines.pop();
    }

    lines.join("\n")
}
