use crate::color::{held_color, Rgb};
use crate::error::LayoutError;
use crate::geometry::{PipBox, PipMapper};
use crate::midi::{is_accidental, note_name, scale_7bit, MidiMessage, Outbox, Spelling};
use crate::model::{Built, Face, PanelLayout, Tile, TileAction};

use super::clamp_note;

const KEY_COLORS: [Rgb; 2] = [Rgb(240, 240, 240), Rgb(224, 224, 224)];
const ACCIDENTAL: Rgb = Rgb(32, 32, 32);
const LABEL: Rgb = Rgb(128, 128, 128);

/// Channel carrying horizontal position as pressure.
pub const PITCH_CHANNEL: u8 = 1;
/// Channel carrying distance from the vertical center as pressure.
pub const VOLUME_CHANNEL: u8 = 2;

/// A key played on two channels at once, with position streamed as polyphonic
/// pressure on each.
#[derive(Debug)]
struct RollerKey {
    note: u8,
}

impl TileAction for RollerKey {
    fn hold(&mut self, out: &mut Outbox, x: f64, y: f64) {
        out.push(MidiMessage::note_on(self.note, 127, PITCH_CHANNEL));
        out.push(MidiMessage::note_on(self.note, 127, VOLUME_CHANNEL));
        self.rub(out, x, y);
    }

    fn rub(&mut self, out: &mut Outbox, x: f64, y: f64) {
        let volume = 1.0 - (y * 2.0 - 1.0).abs();
        out.push(MidiMessage::poly_pressure(
            self.note,
            scale_7bit(x, 0, 127),
            PITCH_CHANNEL,
        ));
        out.push(MidiMessage::poly_pressure(
            self.note,
            scale_7bit(volume, 0, 127),
            VOLUME_CHANNEL,
        ));
    }

    fn release(&mut self, out: &mut Outbox) {
        out.push(MidiMessage::note_off(self.note, PITCH_CHANNEL));
        out.push(MidiMessage::note_off(self.note, VOLUME_CHANNEL));
    }
}

/// A row of chromatic keys, one per note starting at `root`.
#[derive(Debug, Clone)]
pub struct Roller {
    pip_box: PipBox,
    root: u8,
    notes: u8,
    tile_w: i32,
    tile_h: i32,
}

impl Roller {
    pub fn new(
        x: i32,
        y: i32,
        root: u8,
        notes: u8,
        tile_w: i32,
        tile_h: i32,
    ) -> Result<Self, LayoutError> {
        if notes == 0 {
            return Err(LayoutError::EmptyNoteRange);
        }
        if tile_w <= 0 {
            return Err(LayoutError::non_positive("roller key width", tile_w));
        }
        if tile_h <= 0 {
            return Err(LayoutError::non_positive("roller key height", tile_h));
        }
        let width = i64::from(tile_w) * i64::from(notes);
        Ok(Self {
            pip_box: PipBox::checked(x.into(), y.into(), width, tile_h.into())?,
            root,
            notes,
            tile_w,
            tile_h,
        })
    }
}

impl PanelLayout for Roller {
    fn pip_box(&self) -> PipBox {
        self.pip_box
    }

    fn build(&self, map: &PipMapper) -> Built {
        let pip_box = self.pip_box();
        let frame = map.pip_rect(&pip_box);
        let mut tiles = vec![Tile::backdrop(frame, Rgb::FRAME)];
        for i in 0..self.notes as i32 {
            let note = clamp_note(i64::from(self.root) + i64::from(i));
            let fill = if is_accidental(note) {
                ACCIDENTAL
            } else {
                KEY_COLORS[i as usize % KEY_COLORS.len()]
            };
            let rect = map.rect(
                pip_box.min_x + i * self.tile_w,
                pip_box.min_y,
                self.tile_w,
                self.tile_h,
            );
            tiles.push(Tile::single(
                rect,
                Face::labelled(fill, note_name(note, Spelling::Sharp), LABEL, 65),
                Face::solid(held_color(note as u32)),
                Box::new(RollerKey { note }),
            ));
        }
        Built { frame, tiles }
    }

    fn kind(&self) -> &'static str {
        "roller"
    }
}
