//! The device run loop with output capture
//!
//! Strictly sequential: one device at a time, one command at a time,
//! in list order. Change windows are walked through, not raced through,
//! and any failure stops the run instead of silently skipping a device.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use super::VettedCommands;
use crate::config::Settings;
use crate::output::{self, Spinner};
use crate::transport::Dialer;

/// Output of one command on one device.
#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub command: String,
    pub output: String,
}

/// Everything captured from one device.
#[derive(Debug, Clone)]
pub struct DeviceReport {
    /// The address the device was dialed on.
    pub host: String,
    /// What the device calls itself, per its prompt.
    pub hostname: String,
    pub entries: Vec<CommandEntry>,
    pub transcript: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub devices: Vec<DeviceReport>,
}

/// Walks the device list. Only accepts [`VettedCommands`], so by the
/// time anything reaches this type the whole batch has been screened.
pub struct BatchRunner<'a> {
    dialer: &'a dyn Dialer,
    settings: &'a Settings,
}

impl<'a> BatchRunner<'a> {
    pub fn new(dialer: &'a dyn Dialer, settings: &'a Settings) -> Self {
        Self { dialer, settings }
    }

    pub fn run(&self, targets: &[String], commands: &VettedCommands) -> Result<RunReport> {
        let progress = self.progress_bar(targets.len());
        let mut report = RunReport::default();

        for host in targets {
            if let Some(bar) = &progress {
                bar.set_message(host.clone());
            }

            let device = self.run_device(host, commands, progress.as_ref())?;
            report.devices.push(device);

            if let Some(bar) = &progress {
                bar.inc(1);
            }
        }

        if let Some(bar) = &progress {
            bar.finish_and_clear();
        }

        Ok(report)
    }

    fn run_device(
        &self,
        host: &str,
        commands: &VettedCommands,
        progress: Option<&ProgressBar>,
    ) -> Result<DeviceReport> {
        let mut spinner =
            (progress.is_none() && std::io::stdout().is_terminal()).then(|| Spinner::start(host));
        let dialed = self.dialer.dial(host);
        if let Some(spinner) = spinner.as_mut() {
            spinner.stop();
        }
        let mut session = dialed.with_context(|| format!("connecting to {host}"))?;

        let hostname = session.hostname().to_string();
        announce(
            progress,
            format!(
                "{} {} {}",
                "Connected:".green(),
                hostname.bright_white().bold(),
                format!("({host})").bright_black()
            ),
        );

        let mut entries = Vec::with_capacity(commands.len());
        for (index, command) in commands.iter().enumerate() {
            if index > 0 && !self.settings.delay.is_zero() {
                thread::sleep(self.settings.delay);
            }

            let output = session
                .run(command)
                .with_context(|| format!("running {command:?} on {hostname}"))?;

            if self.settings.print_output {
                println!(
                    "{} {}",
                    format!("{hostname}#").cyan(),
                    command.bright_white()
                );
                if !output.is_empty() {
                    println!("{output}");
                }
            }

            entries.push(CommandEntry {
                command: command.clone(),
                output,
            });
        }

        let mut device = DeviceReport {
            host: host.to_string(),
            hostname,
            entries,
            transcript: None,
        };

        if self.settings.write_files {
            let path = output::write_transcript(&device)?;
            announce(
                progress,
                format!(
                    "{} {}",
                    "Saved:".green(),
                    path.display().to_string().bright_black()
                ),
            );
            device.transcript = Some(path);
        }

        Ok(device)
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if self.settings.print_output || total < 2 {
            return None;
        }

        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:30} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(bar)
    }
}

/// Print a status line without tearing the progress bar. While a bar is
/// drawing, a plain println! would interleave with its redraws.
fn announce(progress: Option<&ProgressBar>, line: String) {
    match progress {
        Some(bar) => bar.suspend(|| println!("{line}")),
        None => println!("{line}"),
    }
}
