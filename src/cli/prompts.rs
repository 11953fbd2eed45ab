//! Interactive prompts for anything the flags and config left unset

use anyhow::{bail, Context, Result};
use requestty::Question;

/// Ask for a single device host when no -s file was given.
pub fn ask_host() -> Result<String> {
    let question = Question::input("host")
        .message("Device host")
        .build();
    let answer = requestty::prompt_one(question).context("prompting for device host")?;
    let host = answer.as_string().unwrap_or_default().trim().to_string();
    if host.is_empty() {
        bail!("No device host given");
    }
    Ok(host)
}

/// Ask for a single command when no -c file was given.
pub fn ask_command() -> Result<String> {
    let question = Question::input("command")
        .message("Command to run")
        .build();
    let answer = requestty::prompt_one(question).context("prompting for command")?;
    let command = answer.as_string().unwrap_or_default().trim().to_string();
    if command.is_empty() {
        bail!("No command given");
    }
    Ok(command)
}

pub fn ask_username() -> Result<String> {
    let question = Question::input("username")
        .message("Username")
        .build();
    let answer = requestty::prompt_one(question).context("prompting for username")?;
    let username = answer.as_string().unwrap_or_default().trim().to_string();
    if username.is_empty() {
        bail!("No username given");
    }
    Ok(username)
}

/// Masked prompt, used for both the login password and the enable secret.
pub fn ask_password(label: &str) -> Result<String> {
    let question = Question::password("password")
        .message(label)
        .mask('*')
        .build();
    let answer = requestty::prompt_one(question)
        .with_context(|| format!("prompting for {}", label.to_lowercase()))?;
    let password = answer.as_string().unwrap_or_default().to_string();
    if password.is_empty() {
        bail!("No {} given", label.to_lowercase());
    }
    Ok(password)
}
