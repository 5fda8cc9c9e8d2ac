use serde::{Deserialize, Serialize};

use crate::color::{held_color, Rgb};
use crate::error::LayoutError;
use crate::geometry::{PipBox, PipMapper, PixelRect, MAX_PIP};
use crate::midi::{note_name, Spelling};
use crate::model::{Built, Face, PanelLayout, Tile};

use super::{clamp_note, NoteKey};

const WHITE_KEYS: [Rgb; 2] = [Rgb(240, 240, 240), Rgb(224, 224, 224)];
const BLACK_KEY: Rgb = Rgb(32, 32, 32);
const ROOT_LABEL: Rgb = Rgb(128, 128, 128);
/// The full MIDI note range.
const MAX_NOTES: u32 = 128;
const WHITE_LABEL: Rgb = Rgb(192, 192, 192);

/// What to do with a black key that hangs past the right edge of the keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spill {
    /// Leave it hanging outside the frame.
    Dangle,
    /// Cut it at the frame.
    Clamp,
    /// Grow the frame to include it.
    Expand,
    /// Drop the key, like a real keyboard.
    #[default]
    Discard,
}

/// A row of piano keys with an arbitrary root and white-key scale.
///
/// Each scale step is the distance to the next white key: a 2 puts a black key
/// between the two whites.
#[derive(Debug, Clone)]
pub struct Piano {
    pip_box: PipBox,
    root: u8,
    scale: Vec<u8>,
    white_w: i32,
    black_h: i32,
    white_h: i32,
    spill: Spill,
    channel: u8,
}

impl Piano {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x: i32,
        y: i32,
        root: u8,
        scale: &[u8],
        notes: u32,
        white_w: i32,
        black_h: i32,
        white_h: i32,
        spill: Spill,
    ) -> Result<Self, LayoutError> {
        if let Some(&bad) = scale.iter().find(|&&s| s != 1 && s != 2) {
            return Err(LayoutError::ScaleInterval(bad));
        }
        if scale.is_empty() || notes == 0 {
            return Err(LayoutError::EmptyNoteRange);
        }
        if notes > MAX_NOTES {
            return Err(LayoutError::too_large("notes", notes));
        }
        let sizes = [
            ("white key width", white_w),
            ("black key height", black_h),
            ("white key height", white_h),
        ];
        for (what, v) in sizes {
            if v <= 0 {
                return Err(LayoutError::non_positive(what, v));
            }
            if v > MAX_PIP {
                return Err(LayoutError::too_large(what, v));
            }
        }
        let scale = fit_scale(scale, notes);
        let width = scale.len() as i64 * i64::from(white_w);
        Ok(Self {
            pip_box: PipBox::checked(x.into(), y.into(), width, white_h.into())?,
            root,
            scale,
            white_w,
            black_h,
            white_h,
            spill,
            channel: 0,
        })
    }

    pub fn on_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    /// The scale after repeating/truncating to the requested note count.
    #[cfg(test)]
    pub fn intervals(&self) -> &[u8] {
        &self.scale
    }

    /// White and black key notes, in key order.
    pub fn notes(&self) -> (Vec<u8>, Vec<u8>) {
        let mut whites = Vec::with_capacity(self.scale.len());
        let mut blacks = Vec::new();
        let mut note = i64::from(self.root);
        for &step in &self.scale {
            whites.push(clamp_note(note));
            if step == 2 {
                blacks.push(clamp_note(note + 1));
            }
            note += i64::from(step);
        }
        (whites, blacks)
    }

    /// Black key rects, before spill handling. Keys in a run between two
    /// single-step whites share the span of that run evenly.
    fn black_keys(&self, whites: &[PixelRect], white_px: i32, black_px: i32) -> Vec<PixelRect> {
        let mut groups: Vec<Vec<i32>> = vec![Vec::new()];
        for (white, &step) in whites.iter().zip(&self.scale) {
            if step == 2 {
                if let Some(g) = groups.last_mut() {
                    g.push(white.x);
                }
            } else {
                groups.push(Vec::new());
            }
        }

        let top = whites.first().map_or(0, |w| w.y);
        let mut keys = Vec::new();
        for group in groups.iter().filter(|g| !g.is_empty()) {
            let g = group.len();
            let start = group[0] as f64;
            let full_span = (white_px * (g as i32 + 1)) as f64;
            let width = full_span / (2 * g + 1) as f64;
            let x_min = start + width;
            let x_max = start + full_span - width;
            for k in 0..g {
                let x = if g == 1 {
                    x_min
                } else {
                    let alpha = k as f64 / (g - 1) as f64;
                    (1.0 - alpha) * x_min + alpha * x_max - width * alpha
                };
                keys.push(PixelRect::new(x as i32, top, width as i32, black_px));
            }
        }
        keys
    }
}

/// Repeat `scale` until it spans `notes` semitones, then cut it there. The final
/// step shrinks to 1 when the last whole step would overshoot.
fn fit_scale(scale: &[u8], notes: u32) -> Vec<u8> {
    let mut fitted = Vec::new();
    let mut distance = 0u32;
    for &step in scale.iter().cycle() {
        fitted.push(step);
        distance += step as u32;
        if distance >= notes {
            break;
        }
    }
    if distance > notes {
        if let Some(last) = fitted.last_mut() {
            *last = 1;
        }
    }
    fitted
}

impl PanelLayout for Piano {
    fn pip_box(&self) -> PipBox {
        self.pip_box
    }

    fn build(&self, map: &PipMapper) -> Built {
        let pip_box = self.pip_box();
        let mut frame = map.pip_rect(&pip_box);
        let whites: Vec<PixelRect> = (0..self.scale.len() as i32)
            .map(|i| {
                map.rect(
                    pip_box.min_x + i * self.white_w,
                    pip_box.min_y,
                    self.white_w,
                    self.white_h,
                )
            })
            .collect();
        let white_px = self.white_w * map.pip_size();
        let black_px = self.black_h * map.pip_size();
        let mut blacks = self.black_keys(&whites, white_px, black_px);

        if let Some(last) = blacks.last().copied() {
            if last.right() > frame.right() {
                log::debug!("piano black key spills past frame, {:?}", self.spill);
                match self.spill {
                    Spill::Dangle => {}
                    Spill::Clamp => {
                        let n = blacks.len();
                        blacks[n - 1] = last.clip(&frame);
                    }
                    Spill::Expand => frame = frame.union(&last),
                    Spill::Discard => {
                        blacks.pop();
                    }
                }
            }
        }

        let (white_notes, black_notes) = self.notes();
        let mut tiles = Vec::with_capacity(1 + whites.len() + blacks.len());
        tiles.push(Tile::backdrop(frame, Rgb::FRAME));

        for (i, (rect, note)) in whites.into_iter().zip(white_notes).enumerate() {
            let label = if (note as i32 - self.root as i32).rem_euclid(12) == 0 {
                ROOT_LABEL
            } else {
                WHITE_LABEL
            };
            let idle = Face::labelled(
                WHITE_KEYS[i % WHITE_KEYS.len()],
                note_name(note, Spelling::Flat),
                label,
                100,
            );
            tiles.push(Tile::single(
                rect,
                idle,
                Face::solid(held_color(note as u32)),
                Box::new(NoteKey::new(note, 127, self.channel)),
            ));
        }
        for (rect, note) in blacks.into_iter().zip(black_notes) {
            let idle = Face::labelled(BLACK_KEY, note_name(note, Spelling::Sharp), ROOT_LABEL, 100);
            tiles.push(Tile::single(
                rect,
                idle,
                Face::solid(held_color(note as u32)),
                Box::new(NoteKey::new(note, 127, self.channel)),
            ));
        }
        Built { frame, tiles }
    }

    fn kind(&self) -> &'static str {
        "piano"
    }
}
