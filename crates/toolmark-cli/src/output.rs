use crate::types::OutputFormat;
use anyhow::Result;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Console writer: pretty JSON or plain text, colored only on a terminal
pub struct Output {
    format: OutputFormat,
    style: Style,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        let color = format == OutputFormat::Plain && std::io::stdout().is_terminal();
        Self {
            format,
            style: Style { color },
        }
    }

    pub fn render<T, F>(&self, value: &T, plain: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&Style) -> String,
    {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Plain => print!("{}", plain(&self.style)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
}

impl Style {
    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn good(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bad(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn accent(&self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Shorten to `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("line one\nline two", 40), "line one line two");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }

    #[test]
    fn test_plain_style_has_no_escapes() {
        let style = Style { color: false };
        assert_eq!(style.heading("Sessions"), "Sessions");
        assert_eq!(style.bad("failed"), "failed");
    }
}
