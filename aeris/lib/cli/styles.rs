use clap::builder::styling::{AnsiColor, Effects, Style, Styles};
use std::{fmt::Write, io::IsTerminal};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Whether stdout is an ANSI-capable interactive terminal.
static IS_ANSI_TERMINAL: std::sync::LazyLock<bool> = std::sync::LazyLock::new(|| {
    std::io::stdout().is_terminal() && std::env::var("TERM").map_or(true, |term| term != "dumb")
});

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns a `Styles` object with the default styles for the CLI.
pub fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Green.on_default() | Effects::BOLD)
        .invalid(AnsiColor::Red.on_default() | Effects::BOLD)
}

fn apply_style(text: &str, style: &Style, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }

    let mut styled = String::with_capacity(text.len() + 20);
    let _ = write!(styled, "{}", style);
    styled.push_str(text);
    let _ = write!(styled, "{}", style.render_reset());
    styled
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Applies the [`styles`] palette to text printed by the binary.
///
/// Styling is skipped when stdout is not an interactive terminal.
pub trait AnsiStyles {
    /// Apply header style to text
    fn header(&self) -> String;

    /// Apply literal style to text
    fn literal(&self) -> String;

    /// Apply error style to text
    fn error(&self) -> String;

    /// Apply valid style to text
    fn valid(&self) -> String;
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<T: AsRef<str> + ?Sized> AnsiStyles for T {
    fn header(&self) -> String {
        apply_style(self.as_ref(), styles().get_header(), *IS_ANSI_TERMINAL)
    }

    fn literal(&self) -> String {
        apply_style(self.as_ref(), styles().get_literal(), *IS_ANSI_TERMINAL)
    }

    fn error(&self) -> String {
        apply_style(self.as_ref(), styles().get_error(), *IS_ANSI_TERMINAL)
    }

    fn valid(&self) -> String {
        apply_style(self.as_ref(), styles().get_valid(), *IS_ANSI_TERMINAL)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_style_disabled_is_plain() {
        let style = styles();
        assert_eq!(apply_style("web", style.get_header(), false), "web");
    }

    #[test]
    fn test_apply_style_enabled_wraps_text() {
        let style = styles();

        let header = apply_style("web", style.get_header(), true);
        assert!(header.contains("\x1b[1m"));
        assert!(header.contains("\x1b[33m"));
        assert!(header.contains("web"));
        assert!(header.ends_with("\x1b[0m"));
    }
}
