use crate::color::{held_color, rainbow_gradient, Rgb};
use crate::error::LayoutError;
use crate::geometry::{PipBox, PipMapper};
use crate::midi::{scale_7bit, MidiMessage, Outbox};
use crate::model::{Built, Face, PanelLayout, Tile, TileAction};

use super::{check_tile_count, clamp_note, NoteKey};

/// What goes into one cell of a [`TileArray`].
pub struct Cell {
    pub idle: Face,
    pub active: Face,
    pub action: Box<dyn TileAction>,
}

/// Supplies cell content by grid position. `col`/`row` count from the top left.
pub trait CellSource {
    fn cell(&self, index: usize, col: i32, row: i32) -> Cell;
}

/// A `cols` x `rows` block of square cells with a margin around the edge and
/// spacing between cells, all measured in pips.
#[derive(Debug, Clone)]
pub struct TileArray<S> {
    pip_box: PipBox,
    cols: i32,
    rows: i32,
    tile_pips: i32,
    margin_pips: i32,
    spacing_pips: i32,
    source: S,
}

impl<S: CellSource> TileArray<S> {
    /// `x`/`y` are pips, `cols`/`rows` are cell counts. A negative count lays the
    /// array out toward negative pip coordinates.
    pub fn new(
        x: i32,
        y: i32,
        cols: i32,
        rows: i32,
        tile_pips: i32,
        margin_pips: i32,
        spacing_pips: i32,
        source: S,
    ) -> Result<Self, LayoutError> {
        if cols == 0 {
            return Err(LayoutError::non_positive("columns", cols));
        }
        if rows == 0 {
            return Err(LayoutError::non_positive("rows", rows));
        }
        if tile_pips <= 0 {
            return Err(LayoutError::non_positive("tile size", tile_pips));
        }
        check_tile_count(cols.into(), rows.into())?;
        let (margin, spacing) = (i64::from(margin_pips).abs(), i64::from(spacing_pips).abs());
        let extent = |n: i64| n * i64::from(tile_pips) + (n - 1) * spacing + 2 * margin;
        let (cols, rows) = (i64::from(cols), i64::from(rows));
        let pip_box = PipBox::checked(
            x.into(),
            y.into(),
            extent(cols.abs()) * cols.signum(),
            extent(rows.abs()) * rows.signum(),
        )?;
        // the checked box bounds every count and gap below
        Ok(Self {
            pip_box,
            cols: cols.abs() as i32,
            rows: rows.abs() as i32,
            tile_pips,
            margin_pips: margin as i32,
            spacing_pips: spacing as i32,
            source,
        })
    }

    #[cfg(test)]
    pub fn dimensions(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }
}

impl<S: CellSource> PanelLayout for TileArray<S> {
    fn pip_box(&self) -> PipBox {
        self.pip_box
    }

    fn build(&self, map: &PipMapper) -> Built {
        let frame = map.pip_rect(&self.pip_box);
        let mut tiles = Vec::with_capacity((self.cols * self.rows) as usize + 1);
        tiles.push(Tile::backdrop(frame, Rgb::FRAME));
        let step = self.tile_pips + self.spacing_pips;
        for index in 0..(self.cols * self.rows) as usize {
            let col = index as i32 % self.cols;
            let row = index as i32 / self.cols;
            let rect = map.rect(
                self.pip_box.min_x + self.margin_pips + step * col,
                self.pip_box.min_y + self.margin_pips + step * row,
                self.tile_pips,
                self.tile_pips,
            );
            let Cell {
                idle,
                active,
                action,
            } = self.source.cell(index, col, row);
            tiles.push(Tile::single(rect, idle, active, action));
        }
        Built { frame, tiles }
    }

    fn kind(&self) -> &'static str {
        "tiles"
    }
}

/// Pressure sent by aftertouch pads: strongest toward the top right.
pub fn pad_pressure(x: f64, y: f64) -> u8 {
    scale_7bit((x + 1.0 - y) * 0.5, 1, 64)
}

/// Note-on plus polyphonic pressure that follows the finger.
#[derive(Debug)]
struct PressurePad {
    key: NoteKey,
}

impl TileAction for PressurePad {
    fn hold(&mut self, out: &mut Outbox, x: f64, y: f64) {
        self.key.hold(out, x, y);
        self.rub(out, x, y);
    }

    fn rub(&mut self, out: &mut Outbox, x: f64, y: f64) {
        out.push(MidiMessage::poly_pressure(
            self.key.note,
            pad_pressure(x, y),
            self.key.channel,
        ));
    }

    fn release(&mut self, out: &mut Outbox) {
        self.key.release(out);
    }
}

/// Isomorphic note pads. Moving right adds `x_offset` semitones, moving up adds
/// `y_offset`; the middle cell plays `center`.
#[derive(Debug, Clone)]
pub struct PadGrid {
    notes: Vec<u8>,
    colors: Vec<Rgb>,
    aftertouch: bool,
    channel: u8,
}

impl PadGrid {
    pub fn new(
        cols: i32,
        rows: i32,
        center: i32,
        x_offset: i32,
        y_offset: i32,
        aftertouch: bool,
        channel: u8,
    ) -> Result<Self, LayoutError> {
        check_tile_count(cols.into(), rows.into())?;
        let cols = i64::from(cols).abs().max(1);
        let rows = i64::from(rows).abs().max(1);
        let (cx, cy) = (cols / 2, rows / 2);
        let (center, x_offset, y_offset) =
            (i64::from(center), i64::from(x_offset), i64::from(y_offset));
        let notes: Vec<u8> = (0..cols * rows)
            .map(|i| {
                let (col, row) = (i % cols, i / cols);
                clamp_note(center + (col - cx) * x_offset - (row - cy) * y_offset)
            })
            .collect();
        let low = notes.iter().copied().min().unwrap_or(0) as f64;
        let high = notes.iter().copied().max().unwrap_or(0) as f64;
        let colors = notes
            .iter()
            .map(|&n| rainbow_gradient(n as f64, low, high))
            .collect();
        Ok(Self {
            notes,
            colors,
            aftertouch,
            channel,
        })
    }

    #[cfg(test)]
    pub fn note(&self, index: usize) -> Option<u8> {
        self.notes.get(index).copied()
    }
}

impl CellSource for PadGrid {
    fn cell(&self, index: usize, _col: i32, _row: i32) -> Cell {
        let note = self.notes.get(index).copied().unwrap_or(0);
        let idle = self.colors.get(index).copied().unwrap_or(Rgb::BLACK);
        let key = NoteKey::new(note, 127, self.channel);
        let action: Box<dyn TileAction> = if self.aftertouch {
            Box::new(PressurePad { key })
        } else {
            Box::new(key)
        };
        Cell {
            idle: Face::solid(idle),
            active: Face::solid(held_color(index as u32)),
            action,
        }
    }
}
