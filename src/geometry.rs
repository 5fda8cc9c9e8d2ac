//! Pip-space layout math and the single pip-to-pixel mapping shared by every panel.
//!
//! Layout happens in "pips", an abstract integer unit whose origin is arbitrary and
//! may be negative. Once all panels are known, [`PipMapper`] picks the largest whole
//! number of pixels per pip that fits the screen and aligns the play area inside
//! the leftover margin.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// A rectangle in screen pixels. Left/top inclusive, right/bottom exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && px < self.right() as f64
            && py >= self.y as f64
            && py < self.bottom() as f64
    }

    /// Smallest rect covering both.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        PixelRect::new(x, y, r - x, b - y)
    }

    /// Intersection, or an empty rect at `self`'s origin when they do not overlap.
    pub fn clip(&self, other: &PixelRect) -> PixelRect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r <= x || b <= y {
            return PixelRect::new(self.x, self.y, 0, 0);
        }
        PixelRect::new(x, y, r - x, b - y)
    }

    /// Position of `(px, py)` relative to this rect, each axis clamped to `[0, 1]`.
    pub fn normalize(&self, px: f64, py: f64) -> (f64, f64) {
        let nx = if self.w > 0 {
            (px - self.x as f64) / self.w as f64
        } else {
            0.0
        };
        let ny = if self.h > 0 {
            (py - self.y as f64) / self.h as f64
        } else {
            0.0
        };
        (nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0))
    }
}

/// Largest pip coordinate or extent a panel may use on either axis.
pub const MAX_PIP: i32 = 1 << 16;

/// A bounding box in pip space with non-negative extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipBox {
    pub min_x: i32,
    pub min_y: i32,
    pub w: i32,
    pub h: i32,
}

impl PipBox {
    /// Negative `w`/`h` grow the box toward negative coordinates. Zero extents are
    /// clamped to one pip so a degenerate panel still occupies a cell.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        let (min_x, w) = if w < 0 {
            (x.saturating_add(w), w.saturating_neg())
        } else {
            (x, w)
        };
        let (min_y, h) = if h < 0 {
            (y.saturating_add(h), h.saturating_neg())
        } else {
            (y, h)
        };
        Self {
            min_x,
            min_y,
            w: w.max(1),
            h: h.max(1),
        }
    }

    /// Like [`PipBox::new`], but every input must lie within `±MAX_PIP`. Panels
    /// build their boxes through this so any union of them stays representable.
    pub fn checked(x: i64, y: i64, w: i64, h: i64) -> Result<Self, LayoutError> {
        for (what, v) in [("x", x), ("y", y), ("width", w), ("height", h)] {
            if v.abs() > i64::from(MAX_PIP) {
                return Err(LayoutError::too_large(what, v));
            }
        }
        Ok(Self::new(x as i32, y as i32, w as i32, h as i32))
    }

    /// Inclusive right-most pip column.
    pub const fn max_x(&self) -> i32 {
        self.min_x + self.w - 1
    }

    /// Inclusive bottom-most pip row.
    pub const fn max_y(&self) -> i32 {
        self.min_y + self.h - 1
    }

    pub fn union(&self, other: &PipBox) -> PipBox {
        let min_x = self.min_x.min(other.min_x);
        let min_y = self.min_y.min(other.min_y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        PipBox {
            min_x,
            min_y,
            w: max_x - min_x + 1,
            h: max_y - min_y + 1,
        }
    }
}

/// Component-wise min/max of every box, or `None` for an empty iterator.
pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a PipBox>) -> Option<PipBox> {
    boxes
        .into_iter()
        .fold(None, |acc: Option<PipBox>, b| match acc {
            None => Some(*b),
            Some(u) => Some(u.union(b)),
        })
}

/// Where the play area sits inside the unused screen margin.
///
/// 0 is flush top/left, 1 is flush bottom/right.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Align {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for Align {
    fn default() -> Self {
        Self {
            horizontal: 0.5,
            vertical: 1.0,
        }
    }
}

impl Align {
    pub fn new(horizontal: f64, vertical: f64) -> Result<Self, LayoutError> {
        for v in [horizontal, vertical] {
            if !(0.0..=1.0).contains(&v) {
                return Err(LayoutError::Alignment(v.to_string()));
            }
        }
        Ok(Self {
            horizontal,
            vertical,
        })
    }
}

/// Largest whole pixels-per-pip so the grid fits inside the screen on both axes.
pub fn fit_scale(screen_w: i32, screen_h: i32, grid_w: i32, grid_h: i32) -> i32 {
    if grid_w <= 0 || grid_h <= 0 {
        return 0;
    }
    (screen_w / grid_w).min(screen_h / grid_h).max(0)
}

/// The pip-to-pixel mapping. Computed once per session and immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipMapper {
    bounds: PipBox,
    pip: i32,
    offset_x: i32,
    offset_y: i32,
}

impl PipMapper {
    pub fn new(
        screen_w: i32,
        screen_h: i32,
        bounds: PipBox,
        align: Align,
    ) -> Result<Self, LayoutError> {
        let pip = fit_scale(screen_w, screen_h, bounds.w, bounds.h);
        if pip == 0 {
            return Err(LayoutError::ScreenTooSmall {
                width: screen_w,
                height: screen_h,
                pip_w: bounds.w,
                pip_h: bounds.h,
            });
        }
        let slack_x = screen_w - pip * bounds.w;
        let slack_y = screen_h - pip * bounds.h;
        Ok(Self {
            bounds,
            pip,
            offset_x: (slack_x as f64 * align.horizontal).floor() as i32,
            offset_y: (slack_y as f64 * align.vertical).floor() as i32,
        })
    }

    /// Pixels per pip.
    pub const fn pip_size(&self) -> i32 {
        self.pip
    }

    pub const fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Pixel position of the top-left corner of pip `(x, y)`.
    pub const fn point(&self, x: i32, y: i32) -> (i32, i32) {
        (
            self.offset_x + (x - self.bounds.min_x) * self.pip,
            self.offset_y + (y - self.bounds.min_y) * self.pip,
        )
    }

    /// Map a pip rectangle to pixels. Width and height scale directly.
    pub const fn rect(&self, x: i32, y: i32, w: i32, h: i32) -> PixelRect {
        let (px, py) = self.point(x, y);
        PixelRect::new(px, py, w * self.pip, h * self.pip)
    }

    pub const fn pip_rect(&self, b: &PipBox) -> PixelRect {
        self.rect(b.min_x, b.min_y, b.w, b.h)
    }

    /// The whole play area in pixels.
    #[cfg(test)]
    pub const fn play_rect(&self) -> PixelRect {
        self.pip_rect(&self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn negative_extent_grows_toward_origin() {
        let b = PipBox::new(0, -9, 5, -3);
        assert_eq!(b, PipBox { min_x: 0, min_y: -12, w: 5, h: 3 });
        assert_eq!(b.max_y(), -10);
    }

    #[test]
    fn zero_extent_is_clamped() {
        let b = PipBox::new(4, 4, 0, 0);
        assert_eq!((b.w, b.h), (1, 1));
        assert_eq!((b.max_x(), b.max_y()), (4, 4));
    }

    #[test]
    fn checked_box_rejects_coordinates_past_the_limit() {
        assert_eq!(
            PipBox::checked(0, 0, i64::from(i32::MIN), 1),
            Err(LayoutError::too_large("width", i32::MIN))
        );
        assert!(PipBox::checked(2_000_000_000, 0, 1, 1).is_err());
        assert_eq!(
            PipBox::checked(3, 4, -2, 5).unwrap(),
            PipBox::new(3, 4, -2, 5)
        );
        // still representable when built unchecked
        assert_eq!(PipBox::new(0, 0, i32::MIN, 1).w, i32::MAX);
    }

    #[test]
    fn far_apart_checked_boxes_union_without_overflow() {
        let m = i64::from(MAX_PIP);
        let a = PipBox::checked(-m, -m, -m, 1).unwrap();
        let b = PipBox::checked(m, m, m, 1).unwrap();
        let u = a.union(&b);
        assert_eq!(u.min_x, -2 * MAX_PIP);
        assert_eq!(u.max_x(), 2 * MAX_PIP - 1);
    }

    #[test]
    fn nine_by_nine_on_a_square_screen() {
        let m = PipMapper::new(1000, 1000, PipBox::new(0, 0, 9, 9), Align::default()).unwrap();
        assert_eq!(m.pip_size(), 111);
        // one spare pixel per axis: centered horizontally rounds down, bottom aligned keeps it on top
        assert_eq!(m.offset(), (0, 1));
        assert_eq!(m.rect(4, 4, 1, 1), PixelRect::new(444, 445, 111, 111));
    }

    #[test]
    fn negative_origin_maps_to_screen_origin() {
        let bounds = PipBox::new(-3, -2, 4, 4);
        let m = PipMapper::new(40, 40, bounds, Align::new(0.0, 0.0).unwrap()).unwrap();
        assert_eq!(m.point(-3, -2), (0, 0));
        assert_eq!(m.rect(-2, -2, 2, 1), PixelRect::new(10, 0, 20, 10));
    }

    #[test]
    fn alignment_outside_unit_range_is_rejected() {
        assert!(Align::new(1.5, 0.0).is_err());
        assert!(Align::new(0.0, -0.1).is_err());
    }

    #[test]
    fn screen_too_small_is_an_error() {
        let err = PipMapper::new(5, 5, PipBox::new(0, 0, 9, 9), Align::default());
        assert!(matches!(err, Err(LayoutError::ScreenTooSmall { .. })));
    }

    #[test]
    fn normalize_clamps() {
        let r = PixelRect::new(10, 10, 100, 50);
        assert_eq!(r.normalize(60.0, 35.0), (0.5, 0.5));
        assert_eq!(r.normalize(-5.0, 500.0), (0.0, 1.0));
    }

    #[test]
    fn clip_and_union() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(5, 5, 10, 10);
        assert_eq!(a.union(&b), PixelRect::new(0, 0, 15, 15));
        assert_eq!(a.clip(&b), PixelRect::new(5, 5, 5, 5));
        assert!(a.clip(&PixelRect::new(20, 20, 1, 1)).is_empty());
    }

    fn arb_box() -> impl Strategy<Value = PipBox> {
        (-50i32..50, -50i32..50, -20i32..20, -20i32..20)
            .prop_map(|(x, y, w, h)| PipBox::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn union_is_componentwise_min_max(boxes in prop::collection::vec(arb_box(), 1..8)) {
            let u = union_all(&boxes).unwrap();
            prop_assert_eq!(u.min_x, boxes.iter().map(|b| b.min_x).min().unwrap());
            prop_assert_eq!(u.min_y, boxes.iter().map(|b| b.min_y).min().unwrap());
            prop_assert_eq!(u.max_x(), boxes.iter().map(|b| b.max_x()).max().unwrap());
            prop_assert_eq!(u.max_y(), boxes.iter().map(|b| b.max_y()).max().unwrap());
        }

        #[test]
        fn scale_is_the_largest_that_fits(
            sw in 1i32..4000, sh in 1i32..4000, gw in 1i32..200, gh in 1i32..200,
        ) {
            let s = fit_scale(sw, sh, gw, gh);
            prop_assert!(s * gw <= sw && s * gh <= sh);
            prop_assert!((s + 1) * gw > sw || (s + 1) * gh > sh);
        }

        #[test]
        fn play_area_stays_on_screen(
            sw in 50i32..3000, sh in 50i32..3000,
            b in arb_box(),
            ax in 0.0f64..=1.0, ay in 0.0f64..=1.0,
        ) {
            if let Ok(m) = PipMapper::new(sw, sh, b, Align::new(ax, ay).unwrap()) {
                let r = m.play_rect();
                prop_assert!(r.x >= 0 && r.y >= 0);
                prop_assert!(r.right() <= sw && r.bottom() <= sh);
            }
        }
    }
}
