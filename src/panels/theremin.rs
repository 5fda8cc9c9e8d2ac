use crate::color::{hsv, Rgb};
use crate::error::LayoutError;
use crate::geometry::{PipBox, PipMapper};
use crate::model::{Built, Face, PanelLayout, Tile};

use super::{check_tile_count, NoteKey};

/// One tile per pip. Columns sweep the note range left to right and the hue
/// wheel with it; rows get quieter and darker toward the bottom.
#[derive(Debug, Clone)]
pub struct Theremin {
    pip_box: PipBox,
    low_note: u8,
    high_note: u8,
    channel: u8,
}

impl Theremin {
    pub fn new(
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        low_note: u8,
        high_note: u8,
    ) -> Result<Self, LayoutError> {
        if high_note < low_note || high_note > 127 {
            return Err(LayoutError::EmptyNoteRange);
        }
        check_tile_count(w.into(), h.into())?;
        Ok(Self {
            pip_box: PipBox::checked(x.into(), y.into(), w.into(), h.into())?,
            low_note,
            high_note,
            channel: 0,
        })
    }

    pub fn on_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// Note and velocity for the cell at `(col, row)`.
    pub fn voice(&self, col: i32, row: i32) -> (u8, u8) {
        let (hue, val) = self.shade(col, row);
        let span = (self.high_note - self.low_note) as f64;
        let note = self.low_note as f64 + span * hue;
        (note as u8, (val * 127.0) as u8)
    }

    fn shade(&self, col: i32, row: i32) -> (f64, f64) {
        let frac = |i: i32, n: i32| if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
        (frac(col, self.pip_box.w), 1.0 - frac(row, self.pip_box.h))
    }
}

impl PanelLayout for Theremin {
    fn pip_box(&self) -> PipBox {
        self.pip_box
    }

    fn build(&self, map: &PipMapper) -> Built {
        let frame = map.pip_rect(&self.pip_box);
        let (w, h) = (self.pip_box.w, self.pip_box.h);
        let mut tiles = Vec::with_capacity((w * h) as usize + 1);
        tiles.push(Tile::backdrop(frame, Rgb::BLACK));
        for row in 0..h {
            for col in 0..w {
                let (hue, val) = self.shade(col, row);
                let (note, loud) = self.voice(col, row);
                tiles.push(Tile::single(
                    map.rect(self.pip_box.min_x + col, self.pip_box.min_y + row, 1, 1),
                    Face::solid(hsv(hue, 1.0, val)),
                    Face::solid(Rgb::WHITE),
                    Box::new(NoteKey::new(note, loud, self.channel)),
                ));
            }
        }
        Built { frame, tiles }
    }

    fn kind(&self) -> &'static str {
        "theremin"
    }
}
