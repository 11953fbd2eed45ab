//! Screen and transcript output

mod spinner;
mod transcript;

pub use spinner::Spinner;
pub use transcript::{render_transcript, transcript_filename, write_transcript};
