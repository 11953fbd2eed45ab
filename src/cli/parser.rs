//! Argument parser for the relay command line

use std::env;

use anyhow::{anyhow, bail, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    /// Device list file, one host per line (-s)
    pub switches: Option<String>,

    /// Command list file, one command per line (-c)
    pub commands: Option<String>,

    /// Login username (-U)
    pub username: Option<String>,

    /// Login password (-P)
    pub password: Option<String>,

    /// Credentials file path (-A)
    pub authfile: Option<String>,

    /// Enter enable mode after login (-e)
    pub enable: bool,

    /// Echo device output to the screen (-p)
    pub print_output: bool,

    /// Skip writing per-device transcript files (-w)
    pub no_write: bool,

    /// Per-command timeout in seconds (-t)
    pub timeout: Option<u64>,

    /// TCP connect timeout in seconds (-T)
    pub connect_timeout: Option<u64>,

    /// Pause between commands in seconds (-d)
    pub delay: Option<u64>,

    /// SSH port (--port)
    pub port: Option<u16>,

    /// Show resolved settings before running (-v)
    pub verbose: bool,

    /// Show version (-V)
    pub version: bool,

    /// Generate shell completions
    pub completions: Option<String>,
}

impl Args {
    pub fn parse() -> Result<Self> {
        let raw: Vec<String> = env::args().skip(1).collect();
        Self::parse_args(raw)
    }

    fn parse_args(args: Vec<String>) -> Result<Self> {
        let mut result = Args::default();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];

            // Split --flag=value forms up front
            let (name, inline) = match arg.split_once('=') {
                Some((n, v)) if n.starts_with("--") => (n, Some(v)),
                _ => (arg.as_str(), None),
            };

            match name {
                "-s" | "--switches" => {
                    result.switches = Some(take_value(&args, &mut i, inline, "-s/--switches")?)
                }
                "-c" | "--commands" => {
                    result.commands = Some(take_value(&args, &mut i, inline, "-c/--commands")?)
                }
                "-U" | "--username" => {
                    result.username = Some(take_value(&args, &mut i, inline, "-U/--username")?)
                }
                "-P" | "--password" => {
                    result.password = Some(take_value(&args, &mut i, inline, "-P/--password")?)
                }
                "-A" | "--authfile" => {
                    result.authfile = Some(take_value(&args, &mut i, inline, "-A/--authfile")?)
                }
                "-e" | "--enable" => result.enable = true,
                "-p" | "--print" => result.print_output = true,
                "-w" | "--no-write" => result.no_write = true,
                "-t" | "--timeout" => {
                    let value = take_value(&args, &mut i, inline, "-t/--timeout")?;
                    result.timeout = Some(parse_seconds(&value, "-t/--timeout")?);
                }
                "-T" | "--connect-timeout" => {
                    let value = take_value(&args, &mut i, inline, "-T/--connect-timeout")?;
                    result.connect_timeout = Some(parse_seconds(&value, "-T/--connect-timeout")?);
                }
                "-d" | "--delay" => {
                    let value = take_value(&args, &mut i, inline, "-d/--delay")?;
                    result.delay = Some(parse_seconds(&value, "-d/--delay")?);
                }
                "--port" => {
                    let value = take_value(&args, &mut i, inline, "--port")?;
                    result.port = Some(parse_port(&value)?);
                }
                "--completions" => {
                    result.completions = Some(take_value(&args, &mut i, inline, "--completions")?)
                }
                "-v" | "--verbose" => result.verbose = true,
                "-V" | "--version" => result.version = true,
                "-h" | "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--help-env" => {
                    print_help_env();
                    std::process::exit(0);
                }

                // Combined boolean shorts like -pw or -pev
                s if s.starts_with('-') && !s.starts_with("--") && s.len() > 2 => {
                    parse_cluster(s, &mut result)?;
                }

                _ => bail!("Unknown argument {arg:?}; run 'relay --help'"),
            }

            i += 1;
        }

        Ok(result)
    }
}

fn parse_cluster(cluster: &str, result: &mut Args) -> Result<()> {
    for c in cluster.chars().skip(1) {
        match c {
            'e' => result.enable = true,
            'p' => result.print_output = true,
            'w' => result.no_write = true,
            'v' => result.verbose = true,
            'V' => result.version = true,
            's' | 'c' | 'U' | 'P' | 'A' | 't' | 'T' | 'd' => {
                bail!("Flag -{c} takes a value and cannot be combined (in {cluster:?})")
            }
            _ => bail!("Unknown flag -{c} (in {cluster:?})"),
        }
    }
    Ok(())
}

fn take_value(args: &[String], i: &mut usize, inline: Option<&str>, flag: &str) -> Result<String> {
    if let Some(value) = inline {
        if value.is_empty() {
            bail!("{flag} requires a value");
        }
        return Ok(value.to_string());
    }
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}

fn parse_seconds(value: &str, flag: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| anyhow!("{flag} expects a whole number of seconds, got {value:?}"))
}

fn parse_port(value: &str) -> Result<u16> {
    let port: u16 = value
        .parse()
        .map_err(|_| anyhow!("--port expects a number between 1 and 65535, got {value:?}"))?;
    if port == 0 {
        bail!("--port 0 is not a usable SSH port");
    }
    Ok(port)
}

fn print_help() {
    println!(
        r#"relay - run a command batch across network devices over SSH

USAGE:
    relay [OPTIONS]

    With no -s/-c, relay asks for a single host and command interactively.

OPTIONS:
    -s, --switches <FILE>         File with one device host per line
    -c, --commands <FILE>         File with one command per line
    -U, --username <USER>         Login username
    -P, --password <PASS>         Login password
    -A, --authfile <FILE>         Credentials file (username:/password:/enable: lines)
    -e, --enable                  Enter enable mode after login
    -p, --print                   Echo device output to the screen
    -w, --no-write                Do not write per-device transcript files
    -t, --timeout <SECS>          Per-command timeout (default: 60)
    -T, --connect-timeout <SECS>  TCP connect timeout (default: 10)
    -d, --delay <SECS>            Pause between commands (default: 0)
        --port <PORT>             SSH port (default: 22)
        --completions <SHELL>     Generate shell completions (bash, zsh, fish, powershell, elvish)
        --help-env                Show environment variables
    -v, --verbose                 Show resolved settings before running
    -V, --version                 Show version
    -h, --help                    Show this help

SAFETY:
    Every command is screened against a destructive-command denylist
    (reload, erase, write erase, delete and their abbreviations) before
    anything is sent. One match stops the whole run before the first
    connection is opened. There is no flag to skip the screen.

EXAMPLES:
    relay -s switches.txt -c commands.txt -p
    relay -s core.txt -c audit.txt -A ~/.relay_auth -w -p
    relay -s lab.txt -c config_push.txt -e -t 120 -d 2
    relay -s all.txt -c show_cmds.txt -U nick --port 2222

FILES:
    ./relay.toml, ~/relay.toml, ~/.config/relay/config.toml
        Defaults for [connection], [auth] and [output]; passwords never
        belong there.
    Transcripts land in the current directory as
    <hostname>-<YYYYmmdd-HHMMSS>.txt unless -w is given.

Run 'relay --help-env' for environment variables.
"#
    );
}

fn print_help_env() {
    println!(
        r#"relay - Environment Variables Reference

CREDENTIALS:
    RELAY_USERNAME     Login username (overridden by -U)
    RELAY_PASSWORD     Login password (overridden by -P)
    RELAY_AUTHFILE     Credentials file path (overridden by -A)

DISPLAY:
    NO_COLOR           Disable colored output (standard env var)

Precedence for credentials: CLI flag, then environment variable, then
authfile, then relay.toml, then an interactive prompt for whatever is
still missing. Passwords are never read from relay.toml.

EXAMPLES:
    export RELAY_USERNAME=netops
    export RELAY_AUTHFILE=~/.relay_auth
    relay -s switches.txt -c commands.txt
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_args(vec![]).unwrap();
        assert_eq!(args, Args::default());
        assert!(args.switches.is_none());
        assert!(!args.enable);
        assert!(args.timeout.is_none());
    }

    #[test]
    fn test_parse_files_and_credentials() {
        let args = Args::parse_args(
            ["-s", "sw.txt", "-c", "cmds.txt", "-U", "nick", "-P", "secret"]
                .map(String::from)
                .to_vec(),
        )
        .unwrap();

        assert_eq!(args.switches.as_deref(), Some("sw.txt"));
        assert_eq!(args.commands.as_deref(), Some("cmds.txt"));
        assert_eq!(args.username.as_deref(), Some("nick"));
        assert_eq!(args.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_parse_long_equals_forms() {
        let args = Args::parse_args(
            ["--switches=sw.txt", "--timeout=120", "--port=2222"]
                .map(String::from)
                .to_vec(),
        )
        .unwrap();

        assert_eq!(args.switches.as_deref(), Some("sw.txt"));
        assert_eq!(args.timeout, Some(120));
        assert_eq!(args.port, Some(2222));
    }

    #[test]
    fn test_parse_numeric_flags() {
        let args = Args::parse_args(
            ["-t", "45", "-T", "5", "-d", "2"].map(String::from).to_vec(),
        )
        .unwrap();

        assert_eq!(args.timeout, Some(45));
        assert_eq!(args.connect_timeout, Some(5));
        assert_eq!(args.delay, Some(2));
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let err = Args::parse_args(["-t", "soon"].map(String::from).to_vec()).unwrap_err();
        assert!(err.to_string().contains("seconds"));

        let err = Args::parse_args(["--port", "0"].map(String::from).to_vec()).unwrap_err();
        assert!(err.to_string().contains("port 0"));

        let err = Args::parse_args(["--port", "70000"].map(String::from).to_vec()).unwrap_err();
        assert!(err.to_string().contains("65535"));
    }

    #[test]
    fn test_combined_boolean_shorts() {
        let args = Args::parse_args(vec!["-pwe".to_string()]).unwrap();
        assert!(args.print_output);
        assert!(args.no_write);
        assert!(args.enable);
        assert!(!args.verbose);
    }

    #[test]
    fn test_value_flag_cannot_join_a_cluster() {
        let err = Args::parse_args(vec!["-ps".to_string()]).unwrap_err();
        assert!(err.to_string().contains("takes a value"));
    }

    #[test]
    fn test_unknown_flags_are_errors() {
        let err = Args::parse_args(vec!["--frobnicate".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown argument"));

        let err = Args::parse_args(vec!["-pz".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"));

        // Bare words are not a query; this is not that kind of tool
        let err = Args::parse_args(vec!["switches.txt".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown argument"));
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let err = Args::parse_args(vec!["-s".to_string()]).unwrap_err();
        assert!(err.to_string().contains("requires a value"));

        let err = Args::parse_args(vec!["--switches=".to_string()]).unwrap_err();
        assert!(err.to_string().contains("requires a value"));
    }

    #[test]
    fn test_version_and_verbose() {
        let args = Args::parse_args(["-V"].map(String::from).to_vec()).unwrap();
        assert!(args.version);

        let args = Args::parse_args(["-v"].map(String::from).to_vec()).unwrap();
        assert!(args.verbose);
    }

    #[test]
    fn test_completions_flag() {
        let args = Args::parse_args(["--completions", "zsh"].map(String::from).to_vec()).unwrap();
        assert_eq!(args.completions.as_deref(), Some("zsh"));
    }
}
