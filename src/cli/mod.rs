//! CLI module - argument parsing and the top-level run flow

mod parser;
pub mod prompts;

pub use parser::*;

use std::process;

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::{resolve_credentials, Config};
use crate::executor::{BatchRunner, Rejection, SafetyGate};
use crate::input::{expand_path, read_lines};
use crate::transport::SshDialer;

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let args = Args::parse()?;

    if args.version {
        println!("relay {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Some(ref shell) = args.completions {
        crate::completions::generate_completions(shell);
        return Ok(());
    }

    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    let config = Config::load()?;
    let settings = config.resolve(&args)?;

    if args.verbose {
        eprintln!(
            "{} port={}, connect_timeout={:?}, command_timeout={:?}, delay={:?}, print={}, write={}, enable={}",
            "[verbose]".bright_black(),
            settings.port,
            settings.connect_timeout,
            settings.command_timeout,
            settings.delay,
            settings.print_output,
            settings.write_files,
            settings.enable
        );
    }

    // Targets and commands come first so a bad file fails before any prompt
    let targets = load_targets(&args)?;
    let commands = load_commands(&args)?;

    let credentials = resolve_credentials(&args, &config, settings.enable)?;

    // The whole batch is screened before the first connection is opened
    let vetted = match SafetyGate::new().vet(&commands) {
        Ok(vetted) => vetted,
        Err(rejection) => {
            print_refusal(&rejection);
            // Refusing is the tool working as intended, not a failure
            process::exit(0);
        }
    };

    let dialer = SshDialer::new(
        credentials,
        settings.port,
        settings.connect_timeout,
        settings.command_timeout,
    );
    let report = BatchRunner::new(&dialer, &settings).run(&targets, &vetted)?;

    println!(
        "{} {} command(s) on {} device(s)",
        "Done:".green().bold(),
        vetted.len(),
        report.devices.len()
    );

    Ok(())
}

fn load_targets(args: &Args) -> Result<Vec<String>> {
    match args.switches {
        Some(ref path) => {
            let path = expand_path(path);
            let targets = read_lines(&path)?;
            if targets.is_empty() {
                bail!("Device list {} is empty", path.display());
            }
            Ok(targets)
        }
        None => Ok(vec![prompts::ask_host()?]),
    }
}

fn load_commands(args: &Args) -> Result<Vec<String>> {
    match args.commands {
        Some(ref path) => {
            let path = expand_path(path);
            let commands = read_lines(&path)?;
            if commands.is_empty() {
                bail!("Command list {} is empty", path.display());
            }
            Ok(commands)
        }
        None => Ok(vec![prompts::ask_command()?]),
    }
}

fn print_refusal(rejection: &Rejection) {
    eprintln!(
        "{} {}",
        "Refusing to run:".red().bold(),
        rejection.command.bright_white()
    );
    eprintln!(
        "{}",
        format!(
            "Matches destructive pattern {:?} (command {} of the list)",
            rejection.pattern,
            rejection.position + 1
        )
        .red()
    );
    eprintln!(
        "{}",
        "Nothing was sent to any device. Remove the command and run again.".yellow()
    );
}
