//! Spinner shown while a validation runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner for the duration of one `check`.
///
/// Draws to stderr; indicatif hides it when stderr is not a terminal.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} {elapsed:.dim}") {
            pb.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "●"]));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Remove the spinner line so the report starts on a clean line.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_finishes_the_bar() {
        let spinner = Spinner::new("Checking http://localhost:3000/");
        spinner.clear();
        assert!(spinner.pb.is_finished());
    }
}
