use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::InputEvent;
use super::mode::TuiState;

// poll for input from tui and resolve key presses into input events for the
// middle layer to handle
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &TuiState) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],
        _ if ts.processing => vec![], // nothing else until the export is written

        // space is one button for both directions
        KeyCode::Char(' ') if ts.playing => vec![InputEvent::Pause],
        KeyCode::Char(' ') => vec![InputEvent::Play],
        KeyCode::Char('s') => vec![InputEvent::Stop],

        // knobs, lower key = down
        KeyCode::Char('[') => vec![InputEvent::BassDown],
        KeyCode::Char(']') => vec![InputEvent::BassUp],
        KeyCode::Char('-') => vec![InputEvent::EchoDown],
        KeyCode::Char('=') | KeyCode::Char('+') => vec![InputEvent::EchoUp],

        KeyCode::Char('m') => vec![InputEvent::ExportMp3],
        KeyCode::Char('w') => vec![InputEvent::ExportWav],

        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_follows_transport() {
        let stopped = TuiState::default();
        let playing = TuiState { playing: true, ..Default::default() };
        assert_eq!(handle_key(KeyCode::Char(' '), &stopped), vec![InputEvent::Play]);
        assert_eq!(handle_key(KeyCode::Char(' '), &playing), vec![InputEvent::Pause]);
    }

    #[test]
    fn only_quit_while_processing() {
        let busy = TuiState { processing: true, ..Default::default() };
        assert!(handle_key(KeyCode::Char('m'), &busy).is_empty());
        assert_eq!(handle_key(KeyCode::Esc, &busy), vec![InputEvent::Quit]);
    }
}
