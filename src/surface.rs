//! The play surface: owns every panel, routes pointers to tiles and reconciles
//! contacts into hold/rub/release once per frame.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::LayoutError;
use crate::geometry::{union_all, Align, PipMapper, PixelRect};
use crate::input::{InputEvent, PointerId};
use crate::midi::Outbox;
use crate::model::{Blit, Panel, PanelLayout, Tile};

/// Stable reference to a tile: panel index, then tile index within the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub panel: usize,
    pub tile: usize,
}

/// Result of a frame in which something changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Redraw {
    /// Screen regions to present after painting.
    pub regions: Vec<PixelRect>,
    /// Paint instructions in order; later blits cover earlier ones.
    pub blits: Vec<Blit>,
    pub pressed: usize,
    pub released: usize,
    pub rubbed: usize,
}

/// Where a pointer currently rests: its tile and the hit position normalized to
/// that tile's bounds. `seq` orders contacts by their latest hit.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Contact {
    tile: TileId,
    at: (f64, f64),
    seq: u64,
}

pub struct PlaySurface {
    screen_w: i32,
    screen_h: i32,
    map: PipMapper,
    panels: Vec<Panel>,
    contacts: HashMap<PointerId, Contact>,
    seq: u64,
    held: BTreeSet<TileId>,
    mouse_down: bool,
}

impl PlaySurface {
    /// Compute the pip mapping for `layouts` on a `screen_w` x `screen_h` display
    /// and build every panel in list order.
    pub fn new(
        screen_w: i32,
        screen_h: i32,
        layouts: &[Box<dyn PanelLayout>],
        align: Align,
    ) -> Result<Self, LayoutError> {
        let boxes: Vec<_> = layouts.iter().map(|l| l.pip_box()).collect();
        let bounds = union_all(&boxes).ok_or(LayoutError::NoPanels)?;
        let map = PipMapper::new(screen_w, screen_h, bounds, align)?;
        log::info!(
            "play surface {}x{} pips at {} px/pip on {}x{} screen, offset {:?}",
            bounds.w,
            bounds.h,
            map.pip_size(),
            screen_w,
            screen_h,
            map.offset()
        );
        let panels = layouts
            .iter()
            .map(|l| Panel::build(l.as_ref(), &map))
            .collect();
        Ok(Self {
            screen_w,
            screen_h,
            map,
            panels,
            contacts: HashMap::new(),
            seq: 0,
            held: BTreeSet::new(),
            mouse_down: false,
        })
    }

    pub fn mapper(&self) -> &PipMapper {
        &self.map
    }

    pub fn screen_size(&self) -> (i32, i32) {
        (self.screen_w, self.screen_h)
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.panels.get(id.panel)?.tiles().get(id.tile)
    }

    /// Tiles that were held at the end of the last reconciliation.
    pub fn held(&self) -> &BTreeSet<TileId> {
        &self.held
    }

    #[cfg(test)]
    pub fn contact(&self, pointer: PointerId) -> Option<TileId> {
        self.contacts.get(&pointer).map(|c| c.tile)
    }

    /// Topmost tile under a pixel point. Panels earlier in the list win.
    pub fn match_point(&self, px: f64, py: f64) -> Option<TileId> {
        self.panels
            .iter()
            .enumerate()
            .find_map(|(panel, p)| p.match_point(px, py).map(|tile| TileId { panel, tile }))
    }

    /// Hit test, and normalize the point to the matched tile's bounds.
    fn test_point(&self, px: f64, py: f64) -> Option<(TileId, (f64, f64))> {
        let id = self.match_point(px, py)?;
        let at = self.tile(id)?.bounds().normalize(px, py);
        Some((id, at))
    }

    fn touch(&mut self, pointer: PointerId, px: f64, py: f64) {
        match self.test_point(px, py) {
            Some((tile, at)) => {
                self.seq += 1;
                let seq = self.seq;
                self.contacts.insert(pointer, Contact { tile, at, seq });
            }
            None => {
                self.contacts.remove(&pointer);
            }
        }
    }

    /// Feed one raw event. Transitions are resolved by the next [`crank`](Self::crank).
    pub fn input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Down { pointer, at } => {
                if pointer == PointerId::Mouse {
                    self.mouse_down = true;
                }
                let (x, y) = at.to_pixel(self.screen_w, self.screen_h);
                self.touch(pointer, x, y);
            }
            InputEvent::Move { pointer, at } => {
                if pointer == PointerId::Mouse && !self.mouse_down {
                    return;
                }
                let (x, y) = at.to_pixel(self.screen_w, self.screen_h);
                self.touch(pointer, x, y);
            }
            InputEvent::Up { pointer } => {
                if pointer == PointerId::Mouse {
                    self.mouse_down = false;
                }
                self.contacts.remove(&pointer);
            }
            InputEvent::Quit => {}
        }
    }

    /// Reconcile contacts against the tiles held last frame.
    ///
    /// Fires at most one release and one hold per tile, rubs only tiles whose
    /// position moved, then flushes `out` once. A tile under several pointers
    /// reports the position of the one that touched it last. Returns `None` when
    /// nothing changed so the caller can skip painting.
    pub fn crank(&mut self, out: &mut Outbox) -> Option<Redraw> {
        let mut positions: BTreeMap<TileId, (u64, (f64, f64))> = BTreeMap::new();
        for c in self.contacts.values() {
            let latest = positions.entry(c.tile).or_insert((c.seq, c.at));
            if c.seq > latest.0 {
                *latest = (c.seq, c.at);
            }
        }
        let held_now: BTreeSet<TileId> = positions.keys().copied().collect();
        let released: Vec<TileId> = self.held.difference(&held_now).copied().collect();
        let pressed: Vec<TileId> = held_now.difference(&self.held).copied().collect();
        let sustained: Vec<TileId> = held_now.intersection(&self.held).copied().collect();
        self.held = held_now;

        for id in &released {
            self.panels[id.panel].tile_mut(id.tile).release(out);
        }
        for id in &pressed {
            if let Some(&(_, at)) = positions.get(id) {
                self.panels[id.panel].tile_mut(id.tile).hold(out, at);
            }
        }
        let rubbed: Vec<TileId> = sustained
            .into_iter()
            .filter(|id| {
                positions.get(id).is_some_and(|&(_, at)| {
                    self.panels[id.panel].tile_mut(id.tile).rub_if_moved(out, at)
                })
            })
            .collect();

        if released.is_empty() && pressed.is_empty() && rubbed.is_empty() {
            return None;
        }
        out.flush();
        log::trace!(
            "crank: {} pressed, {} released, {} rubbed",
            pressed.len(),
            released.len(),
            rubbed.len()
        );
        let dirty: BTreeSet<usize> = released
            .iter()
            .chain(&pressed)
            .chain(&rubbed)
            .map(|id| id.panel)
            .collect();
        let mut redraw = self.redraw_panels(dirty);
        redraw.pressed = pressed.len();
        redraw.released = released.len();
        redraw.rubbed = rubbed.len();
        Some(redraw)
    }

    /// Drop every contact and release every held tile. Used on session end so no
    /// note is left sounding.
    pub fn release_all(&mut self, out: &mut Outbox) -> Option<Redraw> {
        self.contacts.clear();
        self.mouse_down = false;
        let released = self.held.len();
        let redraw = self.crank(out);
        if released > 0 {
            log::info!("released {released} held tiles");
        }
        redraw
    }

    /// Everything, for the first paint.
    pub fn draw(&self) -> Redraw {
        self.redraw_panels(0..self.panels.len())
    }

    fn redraw_panels(&self, panels: impl IntoIterator<Item = usize>) -> Redraw {
        let mut redraw = Redraw::default();
        for index in panels {
            let panel = &self.panels[index];
            redraw.regions.push(panel.frame());
            redraw
                .blits
                .extend(panel.tiles().iter().flat_map(|t| t.blits()));
        }
        redraw
    }
}

impl std::fmt::Debug for PlaySurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaySurface")
            .field("screen", &(self.screen_w, self.screen_h))
            .field("pip", &self.map.pip_size())
            .field("panels", &self.panels.len())
            .field("held", &self.held)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::geometry::{PipBox, PixelRect};
    use crate::input::Locus;
    use crate::midi::tests::Recorder;
    use crate::midi::MidiMessage;
    use crate::model::{Built, Face, Part, TileAction};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Call {
        Hold(usize, f64, f64),
        Rub(usize, f64, f64),
        Release(usize),
    }

    pub(crate) type Log = Rc<RefCell<Vec<Call>>>;

    struct Spy {
        index: usize,
        log: Log,
    }

    impl TileAction for Spy {
        fn hold(&mut self, out: &mut Outbox, x: f64, y: f64) {
            out.push(MidiMessage::note_on(self.index as u8, 127, 0));
            self.log.borrow_mut().push(Call::Hold(self.index, x, y));
        }

        fn rub(&mut self, _out: &mut Outbox, x: f64, y: f64) {
            self.log.borrow_mut().push(Call::Rub(self.index, x, y));
        }

        fn release(&mut self, out: &mut Outbox) {
            out.push(MidiMessage::note_off(self.index as u8, 0));
            self.log.borrow_mut().push(Call::Release(self.index));
        }
    }

    /// `w` x `h` one-pip cells starting at `(x, y)`, row-major, spy actions
    /// numbered from `base`.
    pub(crate) struct SpyGrid {
        pub x: i32,
        pub y: i32,
        pub w: i32,
        pub h: i32,
        pub base: usize,
        pub log: Log,
    }

    impl PanelLayout for SpyGrid {
        fn pip_box(&self) -> PipBox {
            PipBox::new(self.x, self.y, self.w, self.h)
        }

        fn build(&self, map: &PipMapper) -> Built {
            let mut tiles = Vec::new();
            for row in 0..self.h {
                for col in 0..self.w {
                    let index = self.base + (row * self.w + col) as usize;
                    tiles.push(Tile::single(
                        map.rect(self.x + col, self.y + row, 1, 1),
                        Face::solid(Rgb::BLACK),
                        Face::solid(Rgb::WHITE),
                        Box::new(Spy {
                            index,
                            log: self.log.clone(),
                        }),
                    ));
                }
            }
            Built {
                frame: map.pip_rect(&self.pip_box()),
                tiles,
            }
        }

        fn kind(&self) -> &'static str {
            "spy"
        }
    }

    /// Two overlapping tiles: the second covers the right half of the first.
    struct Overlap {
        log: Log,
    }

    impl PanelLayout for Overlap {
        fn pip_box(&self) -> PipBox {
            PipBox::new(0, 0, 4, 2)
        }

        fn build(&self, map: &PipMapper) -> Built {
            let spy = |index| {
                Box::new(Spy {
                    index,
                    log: self.log.clone(),
                })
            };
            let face = Face::solid(Rgb::BLACK);
            let wide = Part {
                rect: map.rect(0, 0, 4, 2),
                idle: face.clone(),
                active: face.clone(),
            };
            let a = Tile::new(vec![wide], spy(0));
            let b = Tile::single(map.rect(2, 0, 2, 2), face.clone(), face, spy(1));
            Built {
                frame: map.pip_rect(&self.pip_box()),
                tiles: vec![a, b],
            }
        }

        fn kind(&self) -> &'static str {
            "overlap"
        }
    }

    fn nine_by_nine(log: &Log) -> PlaySurface {
        let layouts: Vec<Box<dyn PanelLayout>> = vec![Box::new(SpyGrid {
            x: 0,
            y: 0,
            w: 9,
            h: 9,
            base: 0,
            log: log.clone(),
        })];
        PlaySurface::new(1000, 1000, &layouts, Align::new(0.5, 1.0).unwrap()).unwrap()
    }

    fn holds(log: &Log) -> usize {
        log.borrow().iter().filter(|c| matches!(c, Call::Hold(..))).count()
    }

    fn rubs(log: &Log) -> usize {
        log.borrow().iter().filter(|c| matches!(c, Call::Rub(..))).count()
    }

    fn releases(log: &Log) -> usize {
        log.borrow().iter().filter(|c| matches!(c, Call::Release(..))).count()
    }

    #[test]
    fn empty_panel_list_is_rejected() {
        let err = PlaySurface::new(100, 100, &[], Align::default());
        assert!(matches!(err, Err(LayoutError::NoPanels)));
    }

    #[test]
    fn center_press_and_release() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        assert_eq!(s.mapper().pip_size(), 111);
        assert_eq!(s.mapper().offset(), (0, 1));

        s.input(InputEvent::finger_down(1, 500.0, 500.0));
        let redraw = s.crank(&mut out).expect("press repaints");
        assert_eq!(redraw.pressed, 1);
        let calls = log.borrow().clone();
        assert_eq!(calls.len(), 1);
        let Call::Hold(index, x, y) = calls[0] else {
            panic!("expected hold, got {:?}", calls[0]);
        };
        assert_eq!(index, 4 * 9 + 4);
        assert!((x - 0.5).abs() < 0.01 && (y - 0.5).abs() < 0.01);

        assert!(s.crank(&mut out).is_none());
        s.input(InputEvent::finger_up(1));
        let redraw = s.crank(&mut out).expect("release repaints");
        assert_eq!(redraw.released, 1);
        assert_eq!(holds(&log), 1);
        assert_eq!(releases(&log), 1);
        assert_eq!(rubs(&log), 0);
    }

    #[test]
    fn stationary_contact_holds_once_and_never_rubs() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(7, 120.0, 130.0));
        for _ in 0..20 {
            s.input(InputEvent::finger_move(7, 120.0, 130.0));
            s.crank(&mut out);
        }
        assert_eq!(holds(&log), 1);
        assert_eq!(rubs(&log), 0);
    }

    #[test]
    fn movement_inside_a_tile_rubs_with_new_position() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(1, 450.0, 500.0));
        s.crank(&mut out);
        s.input(InputEvent::finger_move(1, 540.0, 500.0));
        let redraw = s.crank(&mut out).unwrap();
        assert_eq!(redraw.rubbed, 1);
        let last = log.borrow().last().cloned().unwrap();
        let Call::Rub(40, x, _) = last else {
            panic!("expected rub on tile 40, got {last:?}");
        };
        assert!((x - 96.0 / 111.0).abs() < 1e-9);
    }

    #[test]
    fn second_finger_keeps_tile_held() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(1, 500.0, 500.0));
        s.input(InputEvent::finger_down(2, 510.0, 510.0));
        s.crank(&mut out);
        s.input(InputEvent::finger_up(1));
        s.crank(&mut out);
        assert_eq!(holds(&log), 1);
        assert_eq!(releases(&log), 0);
        assert_eq!(s.held().len(), 1);
    }

    #[test]
    fn departed_finger_leaves_no_rub_behind() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(1, 500.0, 500.0));
        s.crank(&mut out);
        // a second finger lands elsewhere on the held tile, then slides off it
        s.input(InputEvent::finger_down(2, 540.0, 540.0));
        s.input(InputEvent::finger_move(2, 600.0, 500.0));
        let redraw = s.crank(&mut out).unwrap();
        assert_eq!((redraw.pressed, redraw.rubbed), (1, 0));
        assert_eq!(rubs(&log), 0);
        assert!(matches!(log.borrow().last(), Some(Call::Hold(41, ..))));
    }

    #[test]
    fn latest_finger_on_a_shared_tile_drives_the_rub() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(1, 450.0, 500.0));
        s.crank(&mut out);
        s.input(InputEvent::finger_down(2, 540.0, 500.0));
        s.crank(&mut out);
        s.input(InputEvent::finger_up(2));
        s.crank(&mut out);
        let calls = log.borrow();
        let rubs: Vec<f64> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Rub(40, x, _) => Some(*x),
                _ => None,
            })
            .collect();
        // finger 2's spot, then back to finger 1's once finger 2 lifts
        assert_eq!(rubs, vec![96.0 / 111.0, 6.0 / 111.0]);
    }

    #[test]
    fn events_within_a_frame_collapse() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(1, 500.0, 500.0));
        s.input(InputEvent::finger_move(1, 50.0, 50.0));
        s.input(InputEvent::finger_move(1, 500.0, 500.0));
        s.crank(&mut out);
        assert_eq!(*log.borrow(), vec![Call::Hold(40, 56.0 / 111.0, 55.0 / 111.0)]);
    }

    #[test]
    fn sliding_to_another_tile_releases_then_holds() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(1, 500.0, 500.0));
        s.crank(&mut out);
        s.input(InputEvent::finger_move(1, 600.0, 500.0));
        s.crank(&mut out);
        let calls = log.borrow();
        assert!(matches!(calls[1], Call::Release(40)));
        assert!(matches!(calls[2], Call::Hold(41, ..)));
    }

    #[test]
    fn leaving_every_panel_drops_the_contact() {
        let log = Log::default();
        let layouts: Vec<Box<dyn PanelLayout>> = vec![Box::new(SpyGrid {
            x: 0,
            y: 0,
            w: 2,
            h: 1,
            base: 0,
            log: log.clone(),
        })];
        let mut s = PlaySurface::new(100, 100, &layouts, Align::new(0.0, 0.0).unwrap()).unwrap();
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(1, 10.0, 10.0));
        s.crank(&mut out);
        s.input(InputEvent::finger_move(1, 10.0, 90.0));
        assert_eq!(s.contact(PointerId::Finger(1)), None);
        s.crank(&mut out);
        assert_eq!(releases(&log), 1);
    }

    #[test]
    fn mouse_motion_counts_only_while_pressed() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::mouse_move(500.0, 500.0));
        assert!(s.crank(&mut out).is_none());
        s.input(InputEvent::mouse_down(500.0, 500.0));
        s.input(InputEvent::mouse_move(520.0, 500.0));
        s.crank(&mut out);
        s.input(InputEvent::mouse_up());
        s.input(InputEvent::mouse_move(100.0, 100.0));
        s.crank(&mut out);
        assert_eq!(holds(&log), 1);
        assert_eq!(releases(&log), 1);
    }

    #[test]
    fn normalized_display_coordinates_are_accepted() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::Down {
            pointer: PointerId::Finger(3),
            at: Locus::Display(0.5, 0.5),
        });
        s.crank(&mut out);
        assert!(matches!(log.borrow()[0], Call::Hold(40, ..)));
    }

    #[test]
    fn later_tile_wins_overlap() {
        let log = Log::default();
        let layouts: Vec<Box<dyn PanelLayout>> = vec![Box::new(Overlap { log: log.clone() })];
        let s = PlaySurface::new(40, 20, &layouts, Align::default()).unwrap();
        assert_eq!(s.match_point(5.0, 5.0), Some(TileId { panel: 0, tile: 0 }));
        assert_eq!(s.match_point(25.0, 5.0), Some(TileId { panel: 0, tile: 1 }));
    }

    #[test]
    fn earlier_panel_wins_across_panels() {
        let log = Log::default();
        let layouts: Vec<Box<dyn PanelLayout>> = vec![
            Box::new(SpyGrid { x: 0, y: 0, w: 2, h: 2, base: 0, log: log.clone() }),
            Box::new(SpyGrid { x: 1, y: 1, w: 2, h: 2, base: 100, log: log.clone() }),
        ];
        let s = PlaySurface::new(30, 30, &layouts, Align::default()).unwrap();
        assert_eq!(s.match_point(15.0, 15.0), Some(TileId { panel: 0, tile: 3 }));
        assert_eq!(s.match_point(25.0, 25.0), Some(TileId { panel: 1, tile: 3 }));
        assert_eq!(s.match_point(29.5, 0.0), None);
    }

    #[test]
    fn chord_is_flushed_as_one_batch() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let rec = Recorder::default();
        let mut out = Outbox::new(Box::new(rec.clone()));
        s.input(InputEvent::finger_down(1, 50.0, 950.0));
        s.input(InputEvent::finger_down(2, 500.0, 950.0));
        s.input(InputEvent::finger_down(3, 950.0, 950.0));
        s.crank(&mut out);
        assert_eq!(rec.0.borrow().len(), 1);
        assert_eq!(rec.0.borrow()[0].len(), 3);
        assert!(s.crank(&mut out).is_none());
        assert_eq!(rec.0.borrow().len(), 1);
    }

    #[test]
    fn only_changed_panels_repaint() {
        let log = Log::default();
        let layouts: Vec<Box<dyn PanelLayout>> = vec![
            Box::new(SpyGrid { x: 0, y: 0, w: 2, h: 1, base: 0, log: log.clone() }),
            Box::new(SpyGrid { x: 0, y: 2, w: 2, h: 1, base: 10, log: log.clone() }),
        ];
        let mut s = PlaySurface::new(20, 30, &layouts, Align::new(0.0, 0.0).unwrap()).unwrap();
        let mut out = Outbox::default();
        assert_eq!(s.draw().regions.len(), 2);
        s.input(InputEvent::finger_down(1, 15.0, 25.0));
        let redraw = s.crank(&mut out).unwrap();
        assert_eq!(redraw.regions, vec![PixelRect::new(0, 20, 20, 10)]);
        assert_eq!(redraw.blits.len(), 2);
        assert_eq!(redraw.blits[1].face.fill, Rgb::WHITE);
    }

    #[test]
    fn release_all_silences_everything() {
        let log = Log::default();
        let mut s = nine_by_nine(&log);
        let mut out = Outbox::default();
        s.input(InputEvent::finger_down(1, 50.0, 950.0));
        s.input(InputEvent::mouse_down(950.0, 950.0));
        s.crank(&mut out);
        let redraw = s.release_all(&mut out).unwrap();
        assert_eq!(redraw.released, 2);
        assert!(s.held().is_empty());
        assert!(s.release_all(&mut out).is_none());
        // mouse gate is closed again
        s.input(InputEvent::mouse_move(500.0, 500.0));
        assert!(s.crank(&mut out).is_none());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Down(i64, f64, f64),
        Move(i64, f64, f64),
        Up(i64),
        Crank,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        let pt = (0.0f64..1000.0, 0.0f64..1000.0);
        prop_oneof![
            (0i64..4, pt.clone()).prop_map(|(id, (x, y))| Op::Down(id, x, y)),
            (0i64..4, pt).prop_map(|(id, (x, y))| Op::Move(id, x, y)),
            (0i64..4).prop_map(Op::Up),
            Just(Op::Crank),
        ]
    }

    proptest! {
        #[test]
        fn every_hold_is_released_by_session_end(ops in prop::collection::vec(arb_op(), 0..60)) {
            let log = Log::default();
            let mut s = nine_by_nine(&log);
            let mut out = Outbox::default();
            for op in ops {
                match op {
                    Op::Down(id, x, y) => s.input(InputEvent::finger_down(id, x, y)),
                    Op::Move(id, x, y) => s.input(InputEvent::finger_move(id, x, y)),
                    Op::Up(id) => s.input(InputEvent::finger_up(id)),
                    Op::Crank => { s.crank(&mut out); }
                }
            }
            s.release_all(&mut out);
            let mut open: HashMap<usize, i32> = HashMap::new();
            for call in log.borrow().iter() {
                match call {
                    Call::Hold(i, ..) => {
                        let n = open.entry(*i).or_default();
                        prop_assert_eq!(*n, 0, "double hold on {}", i);
                        *n += 1;
                    }
                    Call::Release(i) => {
                        let n = open.entry(*i).or_default();
                        prop_assert_eq!(*n, 1, "release without hold on {}", i);
                        *n -= 1;
                    }
                    Call::Rub(i, ..) => prop_assert_eq!(open.get(i).copied(), Some(1)),
                }
            }
            prop_assert!(open.values().all(|n| *n == 0));
        }

        #[test]
        fn match_returns_last_overlapping_tile(x in 20.0f64..40.0, y in 0.0f64..20.0) {
            let log = Log::default();
            let layouts: Vec<Box<dyn PanelLayout>> = vec![Box::new(Overlap { log })];
            let s = PlaySurface::new(40, 20, &layouts, Align::default()).unwrap();
            prop_assert_eq!(s.match_point(x, y), Some(TileId { panel: 0, tile: 1 }));
        }
    }
}
