//! Diagnostic output.
//!
//! The pipeline never prints directly. Every stage receives a [`Reporter`] and
//! sends its status lines through it, so tests can record diagnostics instead
//! of capturing process output.

use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

/// Sink for status lines emitted while a backup runs.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);

    /// Additional detail, shown only in verbose mode.
    fn debug(&self, message: &str);

    /// Returns a progress bar for `total` units of work.
    ///
    /// The default bar is hidden; reporters that draw to a terminal override
    /// this.
    fn progress(&self, total: u64) -> ProgressBar {
        let _ = total;
        ProgressBar::hidden()
    }
}

/// Themed status lines on stderr.
pub struct ConsoleReporter {
    term: Term,
    verbose: bool,
    color_theme: String,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            term: Term::stderr(),
            verbose,
            color_theme: "default".to_string(),
        }
    }

    pub fn with_color_theme(mut self, theme: String) -> Self {
        self.color_theme = theme;
        self
    }

    /// Accent color name and the 256-color shades used for
    /// (warning, error, success) lines. Unknown themes fall back to white.
    fn palette(&self) -> (&'static str, [u8; 3]) {
        match self.color_theme.as_str() {
            "cyan" => ("cyan", [51, 87, 123]),
            "magenta" => ("magenta", [201, 126, 213]),
            "green" => ("green", [46, 28, 120]),
            _ => ("white", [255, 250, 255]),
        }
    }

    /// Returns (info_style, warning_style, error_style, success_style)
    fn get_status_styles(&self) -> (Style, Style, Style, Style) {
        let (accent, [warning, error, success]) = self.palette();
        (
            Style::from_dotted_str(accent),
            Style::new().color256(warning),
            Style::new().color256(error),
            Style::new().color256(success),
        )
    }

    /// Bar colors (spinner_color, bar_color) for progress templates
    fn get_bar_colors(&self) -> (String, String) {
        let (accent, _) = self.palette();
        (
            format!(".{accent}"),
            format!("bright_{accent}/bright_{accent}"),
        )
    }

    fn print_status(&self, tag: &str, style: &Style, message: &str) {
        let white_bold = Style::new().white().bold();
        let _ = self.term.write_line(&format!(
            "{} {}",
            style.apply_to(tag).bold(),
            white_bold.apply_to(message)
        ));
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        let (info_style, _, _, _) = self.get_status_styles();
        self.print_status("[*]", &info_style, message);
    }

    fn warn(&self, message: &str) {
        let (_, warning_style, _, _) = self.get_status_styles();
        self.print_status("[!] WARNING:", &warning_style, message);
    }

    fn error(&self, message: &str) {
        let (_, _, error_style, _) = self.get_status_styles();
        self.print_status("[!] ERROR:", &error_style, message);
    }

    fn success(&self, message: &str) {
        let (_, _, _, success_style) = self.get_status_styles();
        self.print_status("[✓]", &success_style, message);
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("{} {}", Style::new().dim().apply_to("[.]"), message));
        }
    }

    // Verbose mode prints a line per file, which would tear a live bar.
    fn progress(&self, total: u64) -> ProgressBar {
        if self.verbose || !self.term.is_term() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        let (spinner_color, bar_color) = self.get_bar_colors();
        if let Ok(style) = ProgressStyle::default_bar().template(&format!(
            "{{spinner:{}}} {{bar:40.{}}} {{pos}}/{{len}} ({{percent}}%) {{msg}}",
            spinner_color, bar_color
        )) {
            pb.set_style(style.progress_chars("█ ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message("Encoding");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Formats a byte count with binary units, e.g. `1.50 KB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

#[cfg(test)]
pub(crate) use memory::{Level, MemoryReporter};
