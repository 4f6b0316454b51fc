use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Sparkline};
use ratatui::Frame;

// bars are byte magnitudes, so the ceiling is fixed
const MAX_LEVEL: u64 = 255;

pub fn draw_spectrum(frame: &mut Frame, area: Rect, bars: &[u64], playing: bool) {
    let color = if playing {
        Style::default().fg(Color::LightMagenta)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let sparkline = Sparkline::default()
        .block(Block::bordered().title(" spectrum "))
        .data(bars)
        .max(MAX_LEVEL)
        .style(color);
    frame.render_widget(sparkline, area);
}
