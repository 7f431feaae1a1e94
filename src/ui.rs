pub mod charting;
pub mod screen;

use aimr::{
    mode::GameMode,
    reflex::ROUNDS,
    session::{HudStat, ReflexStateView, Summary, SummaryDetail},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph, Widget, Wrap},
};

use crate::{App, CELL_HEIGHT_PX, CELL_WIDTH_PX};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        hud_line(self).render(chunks[0], buf);

        if let Some(fault) = &self.fault {
            Paragraph::new(Span::styled(
                fault.as_str(),
                Style::default().patch(bold_style).fg(Color::Red),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);
        } else if self.settings.mode == GameMode::Reflex {
            render_reflex(self, chunks[1], buf);
        } else {
            render_arena(self, chunks[1], buf);
        }

        Paragraph::new(Span::styled(
            "(s)top / (r)etry / (m)ode / (esc)ape",
            italic_style,
        ))
        .render(chunks[2], buf);
    }
}

fn hud_line(app: &App) -> Paragraph<'static> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let hud = &app.hud;

    let mut spans = vec![
        Span::styled(app.settings.mode.title(), bold_style.fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(format!("{} pts", hud.score), bold_style),
    ];
    if app.settings.mode != GameMode::Reflex {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(format!("{}s", hud.time_left), dim_style));
    }
    spans.push(Span::raw("   "));
    spans.push(match hud.stat {
        HudStat::Accuracy(acc) => Span::styled(format!("{acc}% acc"), bold_style),
        HudStat::Streak {
            streak,
            max_streak,
            multiplier,
        } => Span::styled(
            format!("streak {streak} (best {max_streak})  x{multiplier}"),
            bold_style.fg(Color::Magenta),
        ),
        HudStat::Reflex { round, .. } => {
            Span::styled(format!("round {round}/{ROUNDS}"), bold_style)
        }
    });

    Paragraph::new(Line::from(spans))
}

/// Target disk and crosshair, sampled at the center of every cell
fn render_arena(app: &App, area: Rect, buf: &mut Buffer) {
    let target_style = Style::default().fg(Color::Red);

    if let Some(target) = app.target {
        let center = target.center();
        let radius = target.width / 2.0;
        for row in 0..area.height {
            for col in 0..area.width {
                let x = (col as f64 + 0.5) * CELL_WIDTH_PX;
                let y = (row as f64 + 0.5) * CELL_HEIGHT_PX;
                let inside = (x - center.x).hypot(y - center.y) <= radius;
                if inside {
                    if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                        cell.set_symbol("█");
                        cell.set_style(target_style);
                    }
                }
            }
        }
    }

    let cursor = app.engine.cursor().position;
    let col = ((cursor.x / CELL_WIDTH_PX) as u16).min(area.width.saturating_sub(1));
    let row = ((cursor.y / CELL_HEIGHT_PX) as u16).min(area.height.saturating_sub(1));
    if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
        cell.set_symbol("+");
        cell.set_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    }
}

fn render_reflex(app: &App, area: Rect, buf: &mut Buffer) {
    let (round, state) = match app.hud.stat {
        HudStat::Reflex { round, state } => (round, state),
        _ => (1, ReflexStateView::Idle),
    };
    let (message, bg) = match state {
        ReflexStateView::Idle => (format!("Round {round}/{ROUNDS}: click to start"), Color::Blue),
        ReflexStateView::Waiting => ("Wait for green...".to_string(), Color::Red),
        ReflexStateView::Go => ("CLICK!".to_string(), Color::Green),
        ReflexStateView::Early => ("Too soon! Click to try again".to_string(), Color::Yellow),
    };

    Block::default()
        .style(Style::default().bg(bg))
        .render(area, buf);

    let middle = Rect::new(area.x, area.y + area.height / 2, area.width, area.height.min(1));
    Paragraph::new(Span::styled(
        message,
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(middle, buf);
}

/// End-of-session results
pub struct SummaryView<'a>(pub &'a Summary);

impl Widget for SummaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let summary = self.0;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // padding
                Constraint::Length(1), // stats
                Constraint::Min(0),    // reaction chart
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Line::from(vec![
            Span::styled(summary.mode.title(), bold_style.fg(Color::Cyan)),
            Span::raw(" - "),
            Span::styled(summary.reason.to_string(), bold_style),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let stats = match &summary.detail {
            SummaryDetail::Accuracy {
                accuracy,
                hits,
                shots,
            } => format!(
                "{} pts   {}% acc   {}/{} hits",
                summary.score, accuracy, hits, shots
            ),
            SummaryDetail::Tracking { max_streak } => {
                format!("{} pts   best streak {}", summary.score, max_streak)
            }
            SummaryDetail::Reflex {
                mean_ms: Some(mean),
                std_dev_ms,
                calibration_ms,
                ..
            } => format!(
                "{:.0} ms avg   {:.1} sd   ({} ms calibration)",
                mean,
                std_dev_ms.unwrap_or(0.0),
                charting::format_label(*calibration_ms)
            ),
            SummaryDetail::Reflex { mean_ms: None, .. } => "no rounds recorded".to_string(),
        };
        Paragraph::new(Span::styled(stats, bold_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        if let SummaryDetail::Reflex { rounds_ms, .. } = &summary.detail {
            if !rounds_ms.is_empty() {
                let bars = charting::reaction_bars(rounds_ms);
                let data: Vec<(&str, u64)> = bars.iter().map(|(l, v)| (l.as_str(), *v)).collect();
                BarChart::default()
                    .block(
                        Block::default()
                            .title(format!("reaction ms: {}", charting::rounds_line(rounds_ms)))
                            .borders(Borders::ALL),
                    )
                    .data(data.as_slice())
                    .bar_width(6)
                    .bar_gap(2)
                    .max(charting::chart_max(rounds_ms))
                    .bar_style(Style::default().fg(Color::Magenta))
                    .value_style(Style::default().fg(Color::Black).bg(Color::Magenta))
                    .render(chunks[3], buf);
            }
        }

        Paragraph::new(Span::styled("(r)etry / (m)ode / (esc)ape", italic_style))
            .render(chunks[4], buf);
    }
}
