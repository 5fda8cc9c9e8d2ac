use std::collections::VecDeque;

use crate::config::InstrumentConfig;
use crate::error::ConfigError;
use crate::input::InputEvent;
use crate::midi::{MidiSink, Outbox};
use crate::surface::{PlaySurface, Redraw};

/// Outcome of one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Nothing changed; skip painting.
    Idle,
    Paint(Redraw),
    /// The session is over and every held tile has been released. Carries the
    /// repaint of those releases on the frame the session ends.
    Ended(Option<Redraw>),
}

/// Running totals for the status panel and the end-of-session overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    pub frames: u64,
    pub painted: u64,
    pub holds: u64,
    pub releases: u64,
    pub rubs: u64,
    pub messages: u64,
    pub peak_held: usize,
    pub started_ms: Option<f64>,
    pub last_ms: f64,
}

impl SessionStats {
    pub fn elapsed_secs(&self) -> u64 {
        match self.started_ms {
            Some(start) => ((self.last_ms - start).max(0.0) / 1000.0) as u64,
            None => 0,
        }
    }

    fn count(&mut self, redraw: &Redraw) {
        self.painted += 1;
        self.holds += redraw.pressed as u64;
        self.releases += redraw.released as u64;
        self.rubs += redraw.rubbed as u64;
    }
}

/// One play session: queued input, the surface and the outbound MIDI batch.
///
/// Everything runs on the caller's frame loop. Raw events are only queued by
/// [`push`](Self::push); [`tick`](Self::tick) applies them and reconciles once.
pub struct Session {
    name: String,
    surface: PlaySurface,
    outbox: Outbox,
    queue: VecDeque<InputEvent>,
    live: bool,
    stats: SessionStats,
}

impl Session {
    pub fn new(name: impl Into<String>, surface: PlaySurface, outbox: Outbox) -> Self {
        Self {
            name: name.into(),
            surface,
            outbox,
            queue: VecDeque::new(),
            live: true,
            stats: SessionStats::default(),
        }
    }

    pub fn from_config(
        config: &InstrumentConfig,
        screen_w: i32,
        screen_h: i32,
        sink: Box<dyn MidiSink>,
    ) -> Result<Self, ConfigError> {
        let layouts = config.layouts()?;
        let surface = PlaySurface::new(screen_w, screen_h, &layouts, config.align)?;
        log::info!(
            "session `{}` started with {} panels",
            config.name,
            surface.panels().len()
        );
        Ok(Self::new(config.name.clone(), surface, Outbox::new(sink)))
    }

    pub fn surface(&self) -> &PlaySurface {
        &self.surface
    }

    pub fn outbox_mut(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Frame timestamp in milliseconds, used only for the session clock.
    pub fn set_clock(&mut self, now_ms: f64) {
        self.stats.started_ms.get_or_insert(now_ms);
        self.stats.last_ms = now_ms;
    }

    /// Queue an event for the next tick. Ignored once the session has ended.
    pub fn push(&mut self, event: InputEvent) {
        if self.live {
            self.queue.push_back(event);
        }
    }

    pub fn tick(&mut self) -> Tick {
        if !self.live {
            return Tick::Ended(None);
        }
        while let Some(event) = self.queue.pop_front() {
            if event == InputEvent::Quit {
                return Tick::Ended(self.end());
            }
            self.surface.input(event);
        }
        self.stats.frames += 1;
        let tick = match self.surface.crank(&mut self.outbox) {
            Some(redraw) => {
                self.stats.count(&redraw);
                Tick::Paint(redraw)
            }
            None => Tick::Idle,
        };
        self.stats.peak_held = self.stats.peak_held.max(self.surface.held().len());
        self.stats.messages = self.outbox.sent();
        tick
    }

    /// Stop the session, releasing anything still held. Safe to call twice; only
    /// the first call can return a repaint.
    pub fn end(&mut self) -> Option<Redraw> {
        if !self.live {
            return None;
        }
        self.live = false;
        self.queue.clear();
        let redraw = self.surface.release_all(&mut self.outbox);
        if let Some(redraw) = &redraw {
            self.stats.count(redraw);
        }
        self.stats.messages = self.outbox.sent();
        log::info!(
            "session `{}` ended after {} frames, {} notes held",
            self.name,
            self.stats.frames,
            self.stats.holds
        );
        redraw
    }

    /// Full paint list for the first frame or after a resize of the canvas element.
    pub fn draw_all(&self) -> Redraw {
        self.surface.draw()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("live", &self.live)
            .field("queued", &self.queue.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::tests::Recorder;
    use crate::midi::MidiMessage;

    fn pads() -> (Session, Recorder) {
        let config = InstrumentConfig::from_json(
            r#"{"name": "test", "panels": [{"kind": "pads", "x": 0, "y": 0, "cols": 3, "rows": 1, "x_offset": 2}]}"#,
        )
        .unwrap();
        // 3 cells of 4 pips + 2 gaps + 2 margins = 16 x 6 pips at 10 px
        let rec = Recorder::default();
        let session = Session::from_config(&config, 160, 60, Box::new(rec.clone())).unwrap();
        (session, rec)
    }

    #[test]
    fn idle_frames_do_nothing() {
        let (mut s, rec) = pads();
        assert_eq!(s.tick(), Tick::Idle);
        assert_eq!(s.tick(), Tick::Idle);
        assert_eq!(s.stats().frames, 2);
        assert_eq!(s.stats().painted, 0);
        assert!(rec.0.borrow().is_empty());
    }

    #[test]
    fn quit_releases_held_notes_in_one_batch() {
        let (mut s, rec) = pads();
        let idle = s.draw_all();
        s.push(InputEvent::finger_down(1, 30.0, 30.0));
        s.push(InputEvent::finger_down(2, 130.0, 30.0));
        assert!(matches!(s.tick(), Tick::Paint(_)));
        s.push(InputEvent::Quit);
        s.push(InputEvent::finger_down(3, 80.0, 30.0));
        let Tick::Ended(Some(last)) = s.tick() else {
            panic!("quit with held pads should repaint them");
        };
        assert_eq!(last.released, 2);
        // the final repaint puts both pads back to their idle faces
        assert!(!last.blits.is_empty());
        assert!(last.blits.iter().all(|b| idle.blits.contains(b)));
        assert_eq!(s.draw_all(), idle);
        assert_eq!(s.tick(), Tick::Ended(None));

        let batches = rec.0.borrow();
        assert_eq!(batches.len(), 2);
        assert_eq!(
            batches[1],
            vec![MidiMessage::note_off(58, 0), MidiMessage::note_off(62, 0)]
        );
        assert_eq!(s.stats().holds, 2);
        assert_eq!(s.stats().releases, 2);
        assert_eq!(s.stats().messages, 4);
    }

    #[test]
    fn ended_session_ignores_input() {
        let (mut s, rec) = pads();
        assert_eq!(s.end(), None);
        assert_eq!(s.end(), None);
        s.push(InputEvent::finger_down(1, 30.0, 30.0));
        assert_eq!(s.tick(), Tick::Ended(None));
        assert!(rec.0.borrow().is_empty());
    }

    #[test]
    fn margin_hits_land_on_the_backdrop() {
        let (mut s, rec) = pads();
        s.push(InputEvent::finger_down(1, 5.0, 5.0));
        let Tick::Paint(redraw) = s.tick() else {
            panic!("backdrop hold should repaint");
        };
        assert_eq!(redraw.pressed, 1);
        assert!(rec.0.borrow().is_empty());
    }

    #[test]
    fn clock_tracks_elapsed_time() {
        let (mut s, _) = pads();
        assert_eq!(s.stats().elapsed_secs(), 0);
        s.set_clock(1000.0);
        s.set_clock(62_500.0);
        assert_eq!(s.stats().elapsed_secs(), 61);
    }
}
