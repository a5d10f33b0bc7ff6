use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::color::ColorScheme;
use crate::galaxy::{Param, Session};

/// Width of the slider panel in columns, borders included.
pub const PANEL_WIDTH: u16 = 34;

const KEY_HELP: [&str; 6] = [
    "↑↓ select  ←→ adjust",
    "a/d yaw  w/s tilt  +/- zoom",
    "space animate  t reset time",
    "r reseed  0 defaults",
    "c color  e export  p panel",
    "q quit",
];

/// Text gauge such as `█████░░░░░` for a ratio in [0, 1].
pub fn gauge(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

/// Slider panel for the adjustable parameters plus session status.
pub struct ParamPanel<'a> {
    pub session: &'a Session,
    pub selected: Param,
    pub color_scheme: ColorScheme,
    pub animate: bool,
}

impl ParamPanel<'_> {
    fn lines(&self, inner_width: usize) -> Vec<Line<'static>> {
        let params = self.session.params();
        let accent = {
            let (r, g, b) = self.color_scheme.get_color(0.8, 1.0);
            Color::Rgb(r, g, b)
        };
        let bar_width = inner_width.saturating_sub(2);
        let mut lines = Vec::new();

        for param in Param::ALL {
            let selected = param == self.selected;
            let marker = if selected { "▶ " } else { "  " };
            let value = params.get(param);
            let label_style = if selected {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let label = format!("{marker}{}", param.label());
            let value_text = format!("{value:.2}");
            let pad = inner_width.saturating_sub(label.chars().count() + value_text.len());

            lines.push(Line::from(vec![
                Span::styled(label, label_style),
                Span::raw(" ".repeat(pad)),
                Span::styled(value_text, label_style),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    gauge(param.range().ratio(value), bar_width),
                    Style::default().fg(if selected { accent } else { Color::DarkGray }),
                ),
            ]));
        }

        let shape = self.session.shape();
        let clock = if self.animate { "running" } else { "static" };
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("stars {}  arms {}  pitch {:.2}", shape.stars, shape.arms, shape.pitch),
            Style::default().fg(Color::Gray),
        ));
        lines.push(Line::styled(
            format!("seed {}  t = {:.2} ({clock})", shape.seed, self.session.time()),
            Style::default().fg(Color::Gray),
        ));
        lines.push(Line::styled(
            format!("color {}", self.color_scheme.name()),
            Style::default().fg(Color::Gray),
        ));
        lines.push(Line::raw(""));
        for help in KEY_HELP {
            lines.push(Line::styled(help, Style::default().fg(Color::DarkGray)));
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Spiral Galaxy ");
        let inner = block.inner(area);
        let paragraph = Paragraph::new(self.lines(inner.width as usize)).block(block);
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_fills_proportionally() {
        assert_eq!(gauge(0.0, 4), "░░░░");
        assert_eq!(gauge(0.5, 4), "██░░");
        assert_eq!(gauge(1.0, 4), "████");
        assert_eq!(gauge(7.0, 4), "████");
        assert_eq!(gauge(0.5, 0), "");
    }

    #[test]
    fn panel_lists_every_parameter() {
        let session = Session::default();
        let panel = ParamPanel {
            session: &session,
            selected: Param::Omega,
            color_scheme: ColorScheme::Plasma,
            animate: false,
        };
        let text: Vec<String> = panel
            .lines(30)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        for param in Param::ALL {
            assert!(text.iter().any(|l| l.contains(param.label())), "{param}");
        }
        assert!(text.iter().any(|l| l.starts_with("▶ Angular velocity")));
        assert!(text.iter().any(|l| l.contains("0.40")));
        assert!(text.iter().any(|l| l.contains("(static)")));
    }
}
