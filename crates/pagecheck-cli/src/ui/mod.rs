//! Terminal output: status messages, the report renderer and a spinner.
//!
//! Color is decided once at startup by [`init_colors`]. Everything that
//! paints goes through [`paint`], so `--no-color`, `NO_COLOR` and piped
//! output all produce plain text.
//!
//! ```no_run
//! use pagecheck_cli::ui;
//!
//! ui::init_colors(false);
//! let spinner = ui::Spinner::new("Checking https://example.com");
//! spinner.clear();
//! ui::success("Page passed");
//! ```

mod format;
mod messages;
mod report;
mod spinner;

use owo_colors::{OwoColorize, Style};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, severity_style, status_style};
pub use messages::{error, info, success, warning};
pub use report::{print_report, render_report};
pub use spinner::Spinner;

static COLORS: AtomicBool = AtomicBool::new(false);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors follow whether
/// stdout is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stdout().features().colors_supported()
}

/// Decide once whether output is colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

/// Whether [`paint`] emits ANSI codes.
pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Render `text` with `style` when colors are enabled.
pub fn paint(text: impl Display, style: Style) -> String {
    if colors_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
