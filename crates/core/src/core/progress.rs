use std::{fmt::Write, str::FromStr};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressKind {
    #[default]
    Bar,
    Line,
    Spinner,
    Dots,
    Dots2,
    Arc,
}

impl ProgressKind {
    fn tick_strings(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Bar | Self::Line => None,
            Self::Spinner => Some(&["|", "/", "-", "\\", " "]),
            Self::Dots => Some(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "]),
            Self::Dots2 => Some(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷", " "]),
            Self::Arc => Some(&["◜", "◠", "◝", "◞", "◡", "◟", " "]),
        }
    }
}

impl FromStr for ProgressKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "spinner" => Ok(Self::Spinner),
            "dots" => Ok(Self::Dots),
            "dots2" => Ok(Self::Dots2),
            "arc" => Ok(Self::Arc),
            other => Err(format!(
                "unknown progress type `{}`, expected bar, line, spinner, dots, dots2 or arc",
                other
            )),
        }
    }
}

/// Progress display settings for an extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerOption {
    pub logging: bool,
    pub prefix: String,
    pub display_filename: bool,
    pub display_percentage: bool,
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub bar_bg: String,
}

impl Default for LoggerOption {
    fn default() -> Self {
        Self {
            logging: true,
            prefix: "Extract".to_string(),
            display_filename: true,
            display_percentage: true,
            kind: ProgressKind::Bar,
            bar_bg: "bgWhite".to_string(),
        }
    }
}

impl LoggerOption {
    pub fn silent() -> Self {
        Self {
            logging: false,
            ..Default::default()
        }
    }

    /// `bgCyan` -> `cyan`, anything unknown falls back to white.
    fn color(&self) -> &'static str {
        const COLORS: [&str; 8] = [
            "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
        ];

        let name = self.bar_bg.trim_start_matches("bg").to_ascii_lowercase();
        COLORS
            .into_iter()
            .find(|color| *color == name)
            .unwrap_or("white")
    }

    fn label(&self, path: &str) -> String {
        if !self.display_filename {
            return String::new();
        }

        let filename = path.rsplit('/').next().unwrap_or_default();

        if self.prefix.is_empty() {
            format!("{} ", filename)
        } else {
            format!("{} {} ", self.prefix, filename)
        }
    }

    fn template(&self) -> String {
        let body = match self.kind {
            ProgressKind::Bar => format!("{{wide_bar:.{}}}", self.color()),
            ProgressKind::Line => "{wide_bar}".to_string(),
            _ => "{spinner}".to_string(),
        };

        let percentage = if self.display_percentage {
            " {percentage} %"
        } else {
            ""
        };

        format!("{{prefix}}{}{}", body, percentage)
    }

    fn style(&self) -> ProgressStyle {
        let style = ProgressStyle::with_template(&self.template()).unwrap_or_else(|err| {
            warn!("invalid progress template, using default: {}", err);
            ProgressStyle::default_bar()
        });

        let style = style.with_key("percentage", |state: &ProgressState, w: &mut dyn Write| {
            let _ = write!(w, "{:.2}", state.fraction() * 100.0);
        });

        match self.kind.tick_strings() {
            Some(ticks) => style.tick_strings(ticks),
            None if self.kind == ProgressKind::Line => style.progress_chars("=> "),
            None => style.progress_chars("█ "),
        }
    }
}

/// Line progress of one stylesheet scan, drawn on stderr.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    spinning: bool,
}

impl ProgressReporter {
    pub fn new(option: &LoggerOption, path: &str, total: usize) -> Self {
        if !option.logging {
            return Self::hidden();
        }

        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr())
            .with_style(option.style())
            .with_prefix(option.label(path));

        Self {
            bar: Some(bar),
            spinning: option.kind.tick_strings().is_some(),
        }
    }

    pub fn hidden() -> Self {
        Self {
            bar: None,
            spinning: false,
        }
    }

    pub fn update(&self, count: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(count as u64);
            if self.spinning {
                bar.tick();
            }
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
