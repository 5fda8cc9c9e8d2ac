//! Instrument panels built on the surface's [`PanelLayout`] interface.
//!
//! Each variant knows its pip box up front and creates its tiles once the mapper
//! exists. The tile actions here carry nothing but the note data they play.

mod piano;
mod plate;
mod roller;
mod theremin;
mod tile_array;

pub use piano::{Piano, Spill};
pub use plate::Plate;
pub use roller::Roller;
pub use theremin::Theremin;
pub use tile_array::{PadGrid, TileArray};

use crate::error::LayoutError;
use crate::midi::{MidiMessage, Outbox};
use crate::model::TileAction;

/// Plain key: note-on at a fixed velocity, note-off on release.
#[derive(Debug, Clone, Copy)]
pub struct NoteKey {
    pub note: u8,
    pub velocity: u8,
    pub channel: u8,
}

impl NoteKey {
    pub fn new(note: u8, velocity: u8, channel: u8) -> Self {
        Self {
            note,
            velocity,
            channel,
        }
    }
}

impl TileAction for NoteKey {
    fn hold(&mut self, out: &mut Outbox, _x: f64, _y: f64) {
        out.push(MidiMessage::note_on(self.note, self.velocity, self.channel));
    }

    fn release(&mut self, out: &mut Outbox) {
        out.push(MidiMessage::note_off(self.note, self.channel));
    }
}

/// Most tiles a single panel may create.
pub(crate) const MAX_PANEL_TILES: i64 = 1 << 16;

/// Reject a `cols` x `rows` tile block larger than [`MAX_PANEL_TILES`].
pub(crate) fn check_tile_count(cols: i64, rows: i64) -> Result<(), LayoutError> {
    let count = cols.abs().saturating_mul(rows.abs());
    if count > MAX_PANEL_TILES {
        return Err(LayoutError::too_large("tile count", count));
    }
    Ok(())
}

/// Clamp a computed note into the 7-bit range.
pub(crate) fn clamp_note(note: i64) -> u8 {
    note.clamp(0, 127) as u8
}
