//! Record and progress output on stdout and stderr.

mod json;
mod progress;

pub use json::JsonOutput;
pub use progress::ProgressBar;
