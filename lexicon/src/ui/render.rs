//! Render orchestration for the Lexicon TUI

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use lexicon_core::{Game, Screen};

use crate::ui::theme::GameTheme;

const BOX_WIDTH: u16 = 72;

/// Main render function
pub fn render(frame: &mut Frame, game: &Game, theme: &GameTheme) {
    let area = frame.area();
    let [main_area, footer_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);

    let screen = game.render();
    let lines = screen_lines(&screen, theme);
    let viewport = game.context().viewport;
    let width = BOX_WIDTH.min(viewport.width.saturating_sub(2)).max(20);
    let width = width.min(main_area.width);
    let height = wrapped_height(&lines, width.saturating_sub(2)).saturating_add(2);
    let box_area = centered_rect_fixed(width, height, main_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(Span::styled(format!(" {} ", screen.title), theme.title_style()));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, box_area);

    render_footer(frame, game, theme, footer_area);
}

fn screen_lines(screen: &Screen, theme: &GameTheme) -> Vec<Line<'static>> {
    screen
        .lines
        .iter()
        .map(|line| {
            Line::from(
                line.segments
                    .iter()
                    .map(|s| Span::styled(s.text.clone(), theme.tone_style(s.tone)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn render_footer(frame: &mut Frame, game: &Game, theme: &GameTheme, area: Rect) {
    let ctx = game.context();
    let provider = Span::styled(
        format!(" provider: {} ", ctx.provider_name()),
        theme.footer_style(false),
    );
    let mut spans = vec![provider];
    if let Some(notice) = &ctx.notice {
        spans.push(Span::styled(format!("| {notice}"), theme.footer_style(true)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Rows `lines` occupy once wrapped to `inner_width` columns. Word wrapping
/// breaks early at spaces, so every wrapped line gets one spare row.
fn wrapped_height(lines: &[Line], inner_width: u16) -> u16 {
    let inner = usize::from(inner_width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| {
            let width = line.width();
            if width <= inner {
                1
            } else {
                width.div_ceil(inner) + 1
            }
        })
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// A `width` x `height` rect centered in `area`, shrunk to fit.
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_height_counts_wrapped_rows() {
        let short = Line::from("Press [Enter] to continue...");
        let long = Line::from("word ".repeat(30));
        assert_eq!(wrapped_height(&[short.clone()], 70), 1);
        // 150 columns at 70 per row is three rows, plus one spare.
        assert_eq!(wrapped_height(&[long.clone()], 70), 4);
        assert_eq!(wrapped_height(&[short, long, Line::default()], 70), 6);
    }

    #[test]
    fn test_wrapped_box_keeps_last_line_visible() {
        use ratatui::{backend::TestBackend, Terminal};

        let help = "(Type your combat action and press Enter, Esc to flee)";
        let mut lines: Vec<Line> = (0..4).map(|_| Line::from("x ".repeat(40))).collect();
        lines.push(Line::from(help));

        let inner = 30;
        let height = wrapped_height(&lines, inner) + 2;
        let mut terminal = Terminal::new(TestBackend::new(inner + 2, height)).unwrap();
        terminal
            .draw(|f| {
                let paragraph = Paragraph::new(lines.clone())
                    .block(Block::default().borders(Borders::ALL))
                    .wrap(Wrap { trim: false });
                f.render_widget(paragraph, f.area());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Esc to flee)"), "help line was clipped");
    }

    #[test]
    fn test_centered_rect_fits() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect_fixed(72, 20, area);
        assert_eq!(rect, Rect::new(14, 10, 72, 20));

        let small = centered_rect_fixed(72, 50, Rect::new(0, 0, 60, 10));
        assert_eq!(small, Rect::new(0, 0, 60, 10));
    }
}
