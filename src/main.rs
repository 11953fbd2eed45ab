//! relay - run a command batch across network devices over SSH.
//!
//! Every command is screened against a destructive-command denylist
//! before the first connection is opened. No surprises.

mod cli;
mod completions;
mod config;
mod executor;
mod input;
mod output;
mod transport;

use anyhow::Result;
use cli::run;

fn main() -> Result<()> {
    run()
}
