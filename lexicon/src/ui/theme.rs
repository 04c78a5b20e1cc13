//! Color theme and styling for the Lexicon TUI

use ratatui::style::{Color, Modifier, Style};

use lexicon_core::Tone;

/// Game UI color theme
#[derive(Debug, Clone)]
pub struct GameTheme {
    pub foreground: Color,
    pub border: Color,
    pub title: Color,

    pub heading: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub muted: Color,
    pub highlight: Color,
    pub input: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::Magenta,
            title: Color::LightMagenta,

            heading: Color::LightBlue,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            muted: Color::DarkGray,
            highlight: Color::LightYellow,
            input: Color::Cyan,
        }
    }
}

impl GameTheme {
    /// Style for a tone-tagged segment
    pub fn tone_style(&self, tone: Tone) -> Style {
        let base = Style::default();
        match tone {
            Tone::Plain => base.fg(self.foreground),
            Tone::Heading => base.fg(self.heading).add_modifier(Modifier::BOLD),
            Tone::Success => base.fg(self.success).add_modifier(Modifier::BOLD),
            Tone::Warning => base.fg(self.warning).add_modifier(Modifier::BOLD),
            Tone::Danger => base.fg(self.danger).add_modifier(Modifier::BOLD),
            Tone::Muted => base.fg(self.muted),
            Tone::Help => base.fg(self.muted).add_modifier(Modifier::ITALIC),
            Tone::Highlight => base.fg(self.highlight).add_modifier(Modifier::BOLD),
            Tone::Input => base.fg(self.input),
        }
    }

    /// Get border style
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Get title style
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title)
            .add_modifier(Modifier::BOLD)
    }

    /// Footer text style
    pub fn footer_style(&self, is_notice: bool) -> Style {
        if is_notice {
            Style::default().fg(self.warning)
        } else {
            Style::default().fg(self.muted)
        }
    }
}
