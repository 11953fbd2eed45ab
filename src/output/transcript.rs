//! Per-device transcript files
//!
//! One file per device, dropped in the current directory, named after
//! what the device calls itself rather than the address it was dialed
//! on. The body reads like the console session it came from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::executor::DeviceReport;

/// `<hostname>-<YYYYmmdd-HHMMSS>.txt`. The hostname comes from the
/// device prompt, which only ever contains filename-safe characters.
pub fn transcript_filename(hostname: &str, when: &DateTime<Local>) -> String {
    format!("{}-{}.txt", hostname, when.format("%Y%m%d-%H%M%S"))
}

pub fn render_transcript(report: &DeviceReport, when: &DateTime<Local>) -> String {
    let mut text = format!(
        "relay {} - {} ({}) - {}\n\n",
        env!("CARGO_PKG_VERSION"),
        report.hostname,
        report.host,
        when.format("%Y-%m-%d %H:%M:%S"),
    );

    for entry in &report.entries {
        text.push_str(&format!("{}# {}\n", report.hostname, entry.command));
        if !entry.output.is_empty() {
            text.push_str(&entry.output);
            text.push('\n');
        }
        text.push('\n');
    }

    text
}

pub fn write_transcript(report: &DeviceReport) -> Result<PathBuf> {
    let when = Local::now();
    let path = PathBuf::from(transcript_filename(&report.hostname, &when));
    std::fs::write(&path, render_transcript(report, &when))
        .with_context(|| format!("writing transcript {}", path.display()))?;
    Ok(path)
}
