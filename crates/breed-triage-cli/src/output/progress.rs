//! Batch progress on stderr using indicatif.

use breed_triage_core::{ProgressEvent, ProgressSink, TriageRecord};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

enum Mode {
    /// Nothing at all, not even skip warnings.
    Silent,
    /// A live bar; regulated hits are counted in its final message.
    Bar(IndicatifBar),
    /// One stderr line per regulated hit or skipped file.
    Lines,
}

/// Reports batch progress to the terminal.
pub struct ProgressBar {
    mode: Mode,
}

impl ProgressBar {
    /// Picks the display for a run of `total` images.
    ///
    /// `quiet` wins over `show_bar`.
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        let mode = if quiet {
            Mode::Silent
        } else if show_bar {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("#>-"));
            }
            Mode::Bar(bar)
        } else {
            Mode::Lines
        };
        Self { mode }
    }

    fn report_hit(record: &TriageRecord) {
        if record.decision.is_regulated() {
            eprintln!("{}: regulated ({})", record.path, record.decision.final_breed);
        }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        match (&self.mode, event) {
            (Mode::Silent, _) => {}
            (Mode::Bar(bar), ProgressEvent::Started { path, index, total }) => {
                if let Some(t) = total {
                    bar.set_length(t as u64);
                }
                bar.set_position(index as u64);
                bar.set_message(path);
            }
            (Mode::Bar(bar), ProgressEvent::Completed { .. }) => bar.inc(1),
            (Mode::Lines, ProgressEvent::Completed { record }) => Self::report_hit(&record),
            (mode, ProgressEvent::Skipped { path, reason }) => {
                if let Mode::Bar(bar) = mode {
                    bar.inc(1);
                }
                eprintln!("WARN: Skipping {path}: {reason}");
            }
            (
                Mode::Bar(bar),
                ProgressEvent::Finished {
                    processed,
                    skipped,
                    regulated,
                },
            ) => bar.finish_with_message(format!(
                "{regulated} regulated of {processed} triaged, {skipped} skipped"
            )),
            (Mode::Lines, ProgressEvent::Started { .. } | ProgressEvent::Finished { .. }) => {}
        }
    }
}
