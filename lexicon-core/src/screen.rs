//! Render output of a game state: a title and lines of tone-tagged text.
//!
//! States describe *what* to show; the host decides how each [`Tone`] looks.

/// Semantic styling hint for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Plain,
    Heading,
    Success,
    Warning,
    Danger,
    Muted,
    Help,
    Highlight,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub segments: Vec<Segment>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new().push(text, Tone::Plain)
    }

    pub fn styled(text: impl Into<String>, tone: Tone) -> Self {
        Self::new().push(text, tone)
    }

    pub fn push(mut self, text: impl Into<String>, tone: Tone) -> Self {
        self.segments.push(Segment {
            text: text.into(),
            tone,
        });
        self
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub title: String,
    pub lines: Vec<Line>,
}

impl Screen {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(&mut self, line: Line) -> &mut Self {
        self.lines.push(line);
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(Line::new());
        self
    }

    /// Add each line of `text` with the same tone.
    pub fn paragraph(&mut self, text: &str, tone: Tone) -> &mut Self {
        for part in text.lines() {
            self.lines.push(Line::styled(part, tone));
        }
        self
    }

    /// Plain-text rendering, used by the headless runner and in tests.
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("== {} ==\n", self.title);
        for line in &self.lines {
            out.push_str(&line.text());
            out.push('\n');
        }
        out
    }
}

pub const DIVIDER: &str = "───────────────────────────────────────────";

pub fn divider() -> Line {
    Line::styled(DIVIDER, Tone::Muted)
}

/// Tone for a health ratio: healthy, hurt, critical.
pub fn health_tone(current: i32, max: i32) -> Tone {
    let ratio = current.max(0) as f64 / max.max(1) as f64;
    if ratio > 0.5 {
        Tone::Success
    } else if ratio > 0.25 {
        Tone::Warning
    } else {
        Tone::Danger
    }
}

pub fn score_tone(score: i32) -> Tone {
    match score {
        s if s >= 7 => Tone::Success,
        s if s >= 5 => Tone::Warning,
        _ => Tone::Danger,
    }
}

fn bar(current: i32, max: i32, width: usize) -> (String, String, i32) {
    let max = max.max(1);
    let current = current.clamp(0, max);
    let filled = (current as usize * width) / max as usize;
    (
        "█".repeat(filled),
        "░".repeat(width - filled),
        current * 100 / max,
    )
}

/// `[label]: ████░░ (66%)`
pub fn hp_bar(label: &str, current: i32, max: i32, width: usize) -> Line {
    let tone = health_tone(current, max);
    let (filled, empty, percent) = bar(current, max, width);
    Line::new()
        .push(format!("[{label}]: "), Tone::Plain)
        .push(filled, tone)
        .push(empty, Tone::Muted)
        .push(format!(" ({percent}%)"), tone)
}

/// Compact HP / gold / XP summary.
pub fn status_bar(hp: i32, max_hp: i32, gold: u32, xp: u32) -> Line {
    let tone = health_tone(hp, max_hp);
    let (filled, empty, _) = bar(hp, max_hp, 10);
    Line::new()
        .push("HP: ", Tone::Muted)
        .push(filled, tone)
        .push(empty, Tone::Muted)
        .push(format!(" {hp}/{max_hp}"), tone)
        .push("  Gold: ", Tone::Muted)
        .push(gold.to_string(), Tone::Highlight)
        .push("  XP: ", Tone::Muted)
        .push(xp.to_string(), Tone::Plain)
}

pub fn menu_item(text: &str, selected: bool) -> Line {
    if selected {
        Line::styled(format!("> {text}"), Tone::Highlight)
    } else {
        Line::styled(format!("  {text}"), Tone::Plain)
    }
}

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_tone_thresholds() {
        assert_eq!(health_tone(100, 100), Tone::Success);
        assert_eq!(health_tone(50, 100), Tone::Warning);
        assert_eq!(health_tone(26, 100), Tone::Warning);
        assert_eq!(health_tone(25, 100), Tone::Danger);
        assert_eq!(health_tone(0, 0), Tone::Danger);
    }

    #[test]
    fn test_score_tone() {
        assert_eq!(score_tone(9), Tone::Success);
        assert_eq!(score_tone(7), Tone::Success);
        assert_eq!(score_tone(5), Tone::Warning);
        assert_eq!(score_tone(4), Tone::Danger);
    }

    #[test]
    fn test_hp_bar_text() {
        let line = hp_bar("Goblin HP", 15, 30, 10);
        assert_eq!(line.text(), "[Goblin HP]: █████░░░░░ (50%)");

        let overfull = hp_bar("You", 150, 100, 4);
        assert_eq!(overfull.text(), "[You]: ████ (100%)");

        let negative = hp_bar("You", -5, 100, 4);
        assert_eq!(negative.text(), "[You]: ░░░░ (0%)");
    }

    #[test]
    fn test_status_bar_text() {
        let line = status_bar(97, 100, 8, 10);
        assert!(line.text().contains("97/100"));
        assert!(line.text().contains("Gold: 8"));
        assert!(line.text().ends_with("XP: 10"));
    }

    #[test]
    fn test_plain_text() {
        let mut screen = Screen::new("MENU");
        screen.line(menu_item("Start Game", true)).line(menu_item("Settings", false));
        assert_eq!(
            screen.to_plain_text(),
            "== MENU ==\n> Start Game\n  Settings\n"
        );
    }

    #[test]
    fn test_spinner_wraps() {
        assert_eq!(spinner_frame(0), spinner_frame(SPINNER_FRAMES.len()));
    }
}
