use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use voxtty::{AudioSink, Clock, EffectParams, PlaybackController, SampleBuffer, Session, TransportState};

#[derive(Default)]
struct RecordingSink {
    sessions: Vec<Session>,
    live: bool,
}

impl AudioSink for RecordingSink {
    fn start(&mut self, session: Session) {
        // the controller must have halted anything older first
        assert!(!self.live, "two sessions alive at once");
        self.live = true;
        self.sessions.push(session);
    }

    fn halt(&mut self) {
        self.live = false;
    }

    fn set_params(&mut self, _effects: EffectParams) {}
}

#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    fn advance(&self, secs: f64) {
        self.0.set(self.0.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

fn five_second_player() -> (PlaybackController<RecordingSink, ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    let mut player = PlaybackController::new(RecordingSink::default(), clock.clone());
    player.load(Arc::new(SampleBuffer::silent(24_000, 1, 5 * 24_000).unwrap()));
    (player, clock)
}

#[test]
fn pause_at_two_seconds_resumes_there() {
    let (mut player, clock) = five_second_player();
    player.play();
    clock.advance(2.0);
    player.pause();
    clock.advance(3.0);
    player.play();

    let resumed = player.sink().sessions.last().unwrap().offset_secs;
    assert!((resumed - 2.0).abs() < 1e-9, "resumed at {resumed}");
    assert_eq!(player.transport(), TransportState::Playing);
}

#[test]
fn misuse_is_harmless() {
    let (mut player, _clock) = five_second_player();
    player.pause();
    player.stop();
    player.stop();
    assert_eq!(player.transport(), TransportState::Stopped);
    player.play();
    player.play();
    assert_eq!(player.sink().sessions.len(), 1);
}

#[test]
fn each_play_gets_a_fresh_session() {
    let (mut player, clock) = five_second_player();
    for _ in 0..3 {
        player.play();
        clock.advance(0.5);
        player.pause();
    }
    assert_eq!(player.sink().sessions.len(), 3);
    assert!(!player.sink().live);
}

#[test]
fn echo_delays_completion() {
    let (mut player, clock) = five_second_player();
    player.set_effects(EffectParams::new(0, 1));
    player.play();
    clock.advance(5.5);
    assert!(!player.tick());
    assert_eq!(player.transport(), TransportState::Playing);
    clock.advance(1.5);
    assert!(player.tick());
    assert_eq!(player.transport(), TransportState::Stopped);
    assert_eq!(player.position_secs(), 0.0);
}

#[test]
fn new_buffer_stops_playback() {
    let (mut player, clock) = five_second_player();
    player.play();
    clock.advance(1.0);
    player.load(Arc::new(SampleBuffer::silent(24_000, 1, 100).unwrap()));
    assert_eq!(player.transport(), TransportState::Stopped);
    assert!(!player.sink().live);
    player.play();
    assert_eq!(player.sink().sessions.last().unwrap().offset_secs, 0.0);
}
