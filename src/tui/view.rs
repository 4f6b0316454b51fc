use crate::shared::{DisplayState, MAX_EFFECT_LEVEL};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};
use ratatui::Frame;

use super::spectrum::draw_spectrum;

const HELP: &str = "space play/pause  s stop  [ ] bass  - = echo  m mp3  w wav  q quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // transport bar
            Constraint::Length(4), // knobs
            Constraint::Min(6),    // spectrum
            Constraint::Length(1), // status
            Constraint::Length(1), // help
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_transport(frame, sections[1], state);
    draw_knobs(frame, sections[2], state);
    draw_spectrum(frame, sections[3], &state.spectrum, state.playing);
    draw_status(frame, sections[4], state);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        sections[5],
    );
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let transport_color = match state.transport {
        "PLAYING" => Color::Green,
        "PAUSED" => Color::Yellow,
        _ => Color::Gray,
    };
    let line = Line::from(vec![
        Span::styled("voxtty ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("[{}]", state.transport),
            Style::default().fg(transport_color),
        ),
        Span::raw(format!(
            "  {} Hz  {} ch  {:.2}s",
            state.sample_rate, state.channels, state.duration_secs
        )),
    ]);
    frame.render_widget(Paragraph::new(line).block(Block::bordered()), area);
}

fn draw_transport(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let ratio = if state.duration_secs > 0.0 {
        (state.position_secs / state.duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(Block::bordered())
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio)
        .label(format!(
            "{} / {}",
            clock(state.position_secs),
            clock(state.duration_secs)
        ));
    frame.render_widget(gauge, area);
}

fn draw_knobs(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines = vec![
        knob_line("bass", state.bass_level, format!("+{:.1} dB", state.bass_gain_db)),
        knob_line("echo", state.echo_level, format!("fb {:.2}", state.echo_feedback)),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(" effects ")),
        area,
    );
}

fn knob_line(name: &str, level: u8, detail: String) -> Line<'static> {
    let filled = level.min(MAX_EFFECT_LEVEL) as usize;
    let empty = MAX_EFFECT_LEVEL as usize - filled;
    Line::from(vec![
        Span::raw(format!("{name:<5}")),
        Span::styled("■".repeat(filled), Style::default().fg(Color::LightMagenta)),
        Span::styled("·".repeat(empty), Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {level:>2}  {detail}")),
    ])
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let style = if state.processing {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if state.status.starts_with("Render failed") {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(state.status.as_str()).style(style), area);
}

// m:ss.t
fn clock(secs: f64) -> String {
    let secs = secs.max(0.0);
    let minutes = (secs / 60.0).floor() as u64;
    format!("{}:{:04.1}", minutes, secs - minutes as f64 * 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format() {
        assert_eq!(clock(0.0), "0:00.0");
        assert_eq!(clock(65.3), "1:05.3");
    }
}
