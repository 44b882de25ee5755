//! CLI input/output: formats, rendering, exit codes.

mod exit_code;
mod format;

pub use exit_code::ExitCode;
pub use format::{OutputFormat, render_corpus, render_outcome};
