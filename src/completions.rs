//! Shell completions generation

use clap::{Arg, Command};
use clap_complete::{generate, Shell};
use std::io;

/// Build a clap Command for shell completions
/// This mirrors our custom parser's flags
fn build_cli() -> Command {
    Command::new("relay")
        .about("Run a command batch across network devices over SSH")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("switches")
                .short('s')
                .long("switches")
                .help("File with one device host per line")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("commands")
                .short('c')
                .long("commands")
                .help("File with one command per line")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("username")
                .short('U')
                .long("username")
                .help("Login username")
                .value_name("USER"),
        )
        .arg(
            Arg::new("password")
                .short('P')
                .long("password")
                .help("Login password")
                .value_name("PASS"),
        )
        .arg(
            Arg::new("authfile")
                .short('A')
                .long("authfile")
                .help("Credentials file (username:/password:/enable: lines)")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("enable")
                .short('e')
                .long("enable")
                .help("Enter enable mode after login")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print")
                .short('p')
                .long("print")
                .help("Echo device output to the screen")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-write")
                .short('w')
                .long("no-write")
                .help("Do not write per-device transcript files")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Per-command timeout in seconds")
                .value_name("SECS"),
        )
        .arg(
            Arg::new("connect-timeout")
                .short('T')
                .long("connect-timeout")
                .help("TCP connect timeout in seconds")
                .value_name("SECS"),
        )
        .arg(
            Arg::new("delay")
                .short('d')
                .long("delay")
                .help("Pause between commands in seconds")
                .value_name("SECS"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .help("SSH port")
                .value_name("PORT"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show resolved settings before running")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("help-env")
                .long("help-env")
                .help("Show environment variables")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .help("Generate shell completions")
                .value_name("SHELL")
                .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
        )
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: &str) {
    let mut cmd = build_cli();

    let shell = match shell.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" | "pwsh" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => {
            eprintln!(
                "Unknown shell: {}. Supported: bash, zsh, fish, powershell, elvish",
                shell
            );
            return;
        }
    };

    generate(shell, &mut cmd, "relay", &mut io::stdout());
}
