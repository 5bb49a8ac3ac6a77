//! Theme module
//!
//! Shared colors and styles for the progress view.

use ratatui::style::{Color, Modifier, Style};

/// Theme colors
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    /// Hint / secondary text
    pub hint: Color,
    pub border: Color,
    pub progress: Color,
    pub title: Color,
}

impl Theme {
    /// Plain text
    pub fn normal(&self) -> Style {
        Style::new().fg(self.fg).bg(self.bg)
    }

    pub fn title(&self) -> Style {
        Style::new()
            .fg(self.title)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::new().fg(self.border).bg(self.bg)
    }

    pub fn hint(&self) -> Style {
        Style::new().fg(self.hint).bg(self.bg)
    }

    pub fn success(&self) -> Style {
        Style::new().fg(self.success).bg(self.bg)
    }

    pub fn warning(&self) -> Style {
        Style::new().fg(self.warning).bg(self.bg)
    }

    pub fn error(&self) -> Style {
        Style::new().fg(self.error).bg(self.bg)
    }

    pub fn progress(&self) -> Style {
        Style::new().fg(self.progress).bg(self.bg)
    }

    /// Style for a progress line, picked from its leading verb
    pub fn for_message(&self, message: &str) -> Style {
        if message.starts_with("Error") {
            self.error()
        } else if message.starts_with("Would") {
            self.warning()
        } else if message.starts_with("Moved") || message.starts_with("Copied") {
            self.success()
        } else {
            self.hint()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        THEME
    }
}

/// Global theme instance
pub static THEME: Theme = Theme {
    bg: Color::Black,
    fg: Color::White,
    success: Color::Green,
    warning: Color::Yellow,
    error: Color::Red,
    hint: Color::Gray,
    border: Color::Cyan,
    progress: Color::Cyan,
    title: Color::Cyan,
};

pub fn theme() -> &'static Theme {
    &THEME
}
