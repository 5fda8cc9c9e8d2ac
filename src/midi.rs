//! Outbound MIDI messages and the per-frame batching outbox.
//!
//! Tile callbacks never talk to a device directly. They push [`MidiMessage`]s into
//! an [`Outbox`], and the surface flushes the outbox at most once per frame so a
//! chord struck in one frame leaves as one batch.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    PolyPressure { channel: u8, note: u8, pressure: u8 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiMessage {
    pub fn note_on(note: u8, velocity: u8, channel: u8) -> Self {
        Self::NoteOn {
            channel,
            note,
            velocity,
        }
    }

    pub fn note_off(note: u8, channel: u8) -> Self {
        Self::NoteOff {
            channel,
            note,
            velocity: 0,
        }
    }

    pub fn poly_pressure(note: u8, pressure: u8, channel: u8) -> Self {
        Self::PolyPressure {
            channel,
            note,
            pressure,
        }
    }

    /// Wire bytes. Data bytes are masked to 7 bits.
    pub fn to_bytes(&self) -> Vec<u8> {
        let status = |kind: u8, channel: u8| kind | (channel & 0x0F);
        match *self {
            Self::NoteOn {
                channel,
                note,
                velocity,
            } => vec![status(0x90, channel), note & 0x7F, velocity & 0x7F],
            Self::NoteOff {
                channel,
                note,
                velocity,
            } => vec![status(0x80, channel), note & 0x7F, velocity & 0x7F],
            Self::PolyPressure {
                channel,
                note,
                pressure,
            } => vec![status(0xA0, channel), note & 0x7F, pressure & 0x7F],
            Self::ProgramChange { channel, program } => {
                vec![status(0xC0, channel), program & 0x7F]
            }
        }
    }
}

/// Scale a `[0, 1]` amount onto `lo..=hi`, clamped.
pub fn scale_7bit(amount: f64, lo: u8, hi: u8) -> u8 {
    let v = amount * (hi - lo) as f64 + lo as f64;
    v.clamp(lo as f64, hi as f64) as u8
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spelling {
    #[default]
    Sharp,
    Flat,
}

const SHARPS: [&str; 12] = [
    "C", "C♯", "D", "D♯", "E", "F", "F♯", "G", "G♯", "A", "A♯", "B",
];
const FLATS: [&str; 12] = [
    "C", "D♭", "D", "E♭", "E", "F", "G♭", "G", "A♭", "A", "B♭", "B",
];

/// Scientific pitch name, middle C (60) is `C4`.
pub fn note_name(note: u8, spelling: Spelling) -> String {
    let octave = note as i32 / 12 - 1;
    let index = (note % 12) as usize;
    let name = match spelling {
        Spelling::Sharp => SHARPS[index],
        Spelling::Flat => FLATS[index],
    };
    format!("{name}{octave}")
}

pub fn is_accidental(note: u8) -> bool {
    matches!(note % 12, 1 | 3 | 6 | 8 | 10)
}

/// Receives each flushed batch. One call per non-empty flush.
pub trait MidiSink {
    fn deliver(&mut self, batch: &[MidiMessage]);

    /// Human readable name of the destination, if connected.
    fn name(&self) -> Option<String> {
        None
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl MidiSink for NullSink {
    fn deliver(&mut self, _batch: &[MidiMessage]) {}
}

pub struct Outbox {
    pending: Vec<MidiMessage>,
    sink: Box<dyn MidiSink>,
    sent: u64,
}

impl Outbox {
    pub fn new(sink: Box<dyn MidiSink>) -> Self {
        Self {
            pending: Vec::new(),
            sink,
            sent: 0,
        }
    }

    pub fn push(&mut self, msg: MidiMessage) {
        self.pending.push(msg);
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[MidiMessage] {
        &self.pending
    }

    /// Messages delivered so far this session.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn set_sink(&mut self, sink: Box<dyn MidiSink>) {
        self.sink = sink;
    }

    /// Hand every pending message to the sink as one batch. Returns the batch size.
    pub fn flush(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let n = self.pending.len();
        self.sink.deliver(&self.pending);
        log::trace!("flushed {n} midi messages");
        self.pending.clear();
        self.sent += n as u64;
        n
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox")
            .field("pending", &self.pending.len())
            .field("sent", &self.sent)
            .finish()
    }
}
