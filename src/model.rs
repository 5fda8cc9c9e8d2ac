//! Tiles, panels and the capability interface panel variants implement.

use crate::color::Rgb;
use crate::geometry::{PipBox, PipMapper, PixelRect};
use crate::midi::Outbox;

/// Text drawn on top of a face, bottom-aligned by `v_align` percent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label {
    pub text: String,
    pub color: Rgb,
    pub v_align: u8,
}

/// What to paint for a tile part: a fill plus an optional label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Face {
    pub fill: Rgb,
    pub label: Option<Label>,
}

impl Face {
    pub fn solid(fill: Rgb) -> Self {
        Self { fill, label: None }
    }

    pub fn labelled(fill: Rgb, text: impl Into<String>, color: Rgb, v_align: u8) -> Self {
        Self {
            fill,
            label: Some(Label {
                text: text.into(),
                color,
                v_align,
            }),
        }
    }
}

/// Lifecycle callbacks of a tile. Positions are tile-normalized `[0, 1]`.
///
/// Implementors carry only what their variant needs (usually a note number) and
/// write outbound messages into the [`Outbox`].
pub trait TileAction {
    fn hold(&mut self, out: &mut Outbox, x: f64, y: f64);

    fn rub(&mut self, _out: &mut Outbox, _x: f64, _y: f64) {}

    fn release(&mut self, out: &mut Outbox);
}

/// Does nothing. Used for panel backdrops.
#[derive(Debug, Default)]
pub struct Inert;

impl TileAction for Inert {
    fn hold(&mut self, _out: &mut Outbox, _x: f64, _y: f64) {}

    fn release(&mut self, _out: &mut Outbox) {}
}

/// One drawable rectangle of a tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Part {
    pub rect: PixelRect,
    pub idle: Face,
    pub active: Face,
}

/// A paint instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Blit {
    pub face: Face,
    pub rect: PixelRect,
}

pub struct Tile {
    parts: Vec<Part>,
    bounds: PixelRect,
    action: Box<dyn TileAction>,
    lit: bool,
    last_xy: Option<(f64, f64)>,
}

impl Tile {
    /// A tile with no parts has an empty bounding rect and can never be hit.
    pub fn new(parts: Vec<Part>, action: Box<dyn TileAction>) -> Self {
        let bounds = parts
            .iter()
            .map(|p| p.rect)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self {
            parts,
            bounds,
            action,
            lit: false,
            last_xy: None,
        }
    }

    /// A single-rect tile with separate idle and active faces.
    pub fn single(rect: PixelRect, idle: Face, active: Face, action: Box<dyn TileAction>) -> Self {
        Self::new(vec![Part { rect, idle, active }], action)
    }

    /// A backdrop that never changes appearance and ignores contact.
    pub fn backdrop(rect: PixelRect, fill: Rgb) -> Self {
        let face = Face::solid(fill);
        Self::single(rect, face.clone(), face, Box::new(Inert))
    }

    #[cfg(test)]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Union of all part rects. Fixed after construction.
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    pub fn hits(&self, px: f64, py: f64) -> bool {
        self.parts.iter().any(|p| p.rect.contains(px, py))
    }

    pub fn blits(&self) -> impl Iterator<Item = Blit> + '_ {
        self.parts.iter().map(|p| Blit {
            face: if self.lit { p.active.clone() } else { p.idle.clone() },
            rect: p.rect,
        })
    }

    #[cfg(test)]
    pub(crate) fn last_reported(&self) -> Option<(f64, f64)> {
        self.last_xy
    }

    pub(crate) fn hold(&mut self, out: &mut Outbox, at: (f64, f64)) {
        self.lit = true;
        self.action.hold(out, at.0, at.1);
        self.last_xy = Some(at);
    }

    /// Returns `true` when `at` differs from the last reported position and `rub` fired.
    pub(crate) fn rub_if_moved(&mut self, out: &mut Outbox, at: (f64, f64)) -> bool {
        if self.last_xy == Some(at) {
            return false;
        }
        self.action.rub(out, at.0, at.1);
        self.last_xy = Some(at);
        true
    }

    pub(crate) fn release(&mut self, out: &mut Outbox) {
        self.lit = false;
        self.action.release(out);
        self.last_xy = None;
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("bounds", &self.bounds)
            .field("parts", &self.parts.len())
            .field("lit", &self.lit)
            .finish()
    }
}

/// What a panel variant produces once the pip mapping is known.
pub struct Built {
    /// Pixel frame of the whole panel; the cheap-reject rect for hit testing.
    pub frame: PixelRect,
    /// Tiles in paint order. Later tiles sit on top.
    pub tiles: Vec<Tile>,
}

/// Capability interface for panel variants (pads, piano rows, plates...).
///
/// The surface never looks at variant fields. It asks for the pip bounding box
/// before geometry exists, then calls `build` exactly once with the shared mapper.
pub trait PanelLayout {
    fn pip_box(&self) -> PipBox;

    fn build(&self, map: &PipMapper) -> Built;

    /// Short name for logs and the status HUD.
    fn kind(&self) -> &'static str;
}

/// A built panel: fixed frame, tiles late-bound by `build`.
pub struct Panel {
    frame: PixelRect,
    tiles: Vec<Tile>,
}

impl Panel {
    pub(crate) fn build(layout: &dyn PanelLayout, map: &PipMapper) -> Self {
        let Built { frame, tiles } = layout.build(map);
        log::debug!(
            "built {} panel: {} tiles in {:?}",
            layout.kind(),
            tiles.len(),
            frame
        );
        Self { frame, tiles }
    }

    pub fn frame(&self) -> PixelRect {
        self.frame
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tile_mut(&mut self, index: usize) -> &mut Tile {
        &mut self.tiles[index]
    }

    /// Index of the topmost tile under the point. Only consults tiles when the
    /// point is inside the panel frame.
    pub fn match_point(&self, px: f64, py: f64) -> Option<usize> {
        if !self.frame.contains(px, py) {
            return None;
        }
        self.tiles.iter().rposition(|t| t.hits(px, py))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_every_part() {
        let face = Face::solid(Rgb::WHITE);
        let part = |x, y| Part {
            rect: PixelRect::new(x, y, 10, 10),
            idle: face.clone(),
            active: face.clone(),
        };
        let tile = Tile::new(vec![part(0, 0), part(30, 5)], Box::new(Inert));
        assert_eq!(tile.bounds(), PixelRect::new(0, 0, 40, 15));
        assert!(tile.hits(35.0, 10.0));
        assert!(!tile.hits(20.0, 5.0));
    }

    #[test]
    fn active_face_only_while_lit() {
        let mut out = Outbox::default();
        let mut tile = Tile::single(
            PixelRect::new(0, 0, 10, 10),
            Face::solid(Rgb::BLACK),
            Face::solid(Rgb::WHITE),
            Box::new(Inert),
        );
        assert_eq!(tile.blits().next().unwrap().face.fill, Rgb::BLACK);
        tile.hold(&mut out, (0.5, 0.5));
        assert_eq!(tile.last_reported(), Some((0.5, 0.5)));
        assert!(!tile.rub_if_moved(&mut out, (0.5, 0.5)));
        assert!(tile.rub_if_moved(&mut out, (0.25, 0.5)));
        assert_eq!(tile.blits().next().unwrap().face.fill, Rgb::WHITE);
        tile.release(&mut out);
        assert_eq!(tile.blits().next().unwrap().face.fill, Rgb::BLACK);
        assert_eq!(tile.last_reported(), None);
    }
}
