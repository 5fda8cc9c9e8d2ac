//! Canvas painting for surface redraws.

use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::model::{Blit, Face, Label};
use crate::surface::Redraw;

const LABEL_FONT: &str = "Georgia, 'Times New Roman', serif";
const MAX_CACHED_FACES: usize = 4096;

/// Font size and baseline for a label on a `w` x `h` face. `v_align` is a percent
/// of the free height below the text; 100 sits the label on the bottom edge.
pub fn label_metrics(w: i32, h: i32, v_align: u8) -> (f64, f64) {
    let font_px = (w as f64 * 0.5).max(1.0);
    let pad = (font_px * 0.25).min(h as f64 * 0.1);
    let free = (h as f64 - font_px - 2.0 * pad).max(0.0);
    let baseline = pad + font_px + free * (v_align.min(100) as f64 / 100.0);
    (font_px, baseline)
}

/// Offscreen rasters of labelled faces, keyed by size and face. Plain fills are
/// never cached since a `fill_rect` is cheaper than a blit.
#[derive(Default)]
pub struct FaceCache {
    faces: HashMap<(i32, i32, Face), HtmlCanvasElement>,
}

impl FaceCache {
    fn get_or_render(
        &mut self,
        document: &Document,
        w: i32,
        h: i32,
        face: &Face,
        label: &Label,
    ) -> Result<&HtmlCanvasElement, JsValue> {
        let key = (w, h, face.clone());
        if !self.faces.contains_key(&key) {
            if self.faces.len() >= MAX_CACHED_FACES {
                log::debug!("face cache full, dropping {} rasters", self.faces.len());
                self.faces.clear();
            }
            let canvas = rasterize(document, w, h, face, label)?;
            self.faces.insert(key.clone(), canvas);
        }
        self.faces
            .get(&key)
            .ok_or_else(|| JsValue::from_str("face cache miss"))
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

fn rasterize(
    document: &Document,
    w: i32,
    h: i32,
    face: &Face,
    label: &Label,
) -> Result<HtmlCanvasElement, JsValue> {
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(JsValue::from)?;
    canvas.set_width(w.max(1) as u32);
    canvas.set_height(h.max(1) as u32);
    let ctx = context_2d(&canvas)?;
    ctx.set_fill_style_str(&face.fill.css());
    ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
    let (font_px, baseline) = label_metrics(w, h, label.v_align);
    ctx.set_font(&format!("{font_px:.0}px {LABEL_FONT}"));
    ctx.set_text_align("center");
    ctx.set_text_baseline("alphabetic");
    ctx.set_fill_style_str(&label.color.css());
    ctx.fill_text(&label.text, w as f64 * 0.5, baseline)?;
    Ok(canvas)
}

/// Paints redraws onto the instrument canvas. One per session; owns its cache.
pub struct Painter {
    document: Document,
    ctx: CanvasRenderingContext2d,
    cache: FaceCache,
}

impl Painter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self {
            document,
            ctx: context_2d(canvas)?,
            cache: FaceCache::default(),
        })
    }

    /// Clear the whole canvas to black.
    pub fn clear(&self, w: f64, h: f64) {
        self.ctx.set_fill_style_str("#000");
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    pub fn paint(&mut self, redraw: &Redraw) {
        for r in &redraw.regions {
            self.ctx
                .clear_rect(r.x as f64, r.y as f64, r.w as f64, r.h as f64);
        }
        for blit in &redraw.blits {
            if let Err(e) = self.blit(blit) {
                log::warn!("blit failed: {e:?}");
            }
        }
    }

    fn blit(&mut self, blit: &Blit) -> Result<(), JsValue> {
        let r = blit.rect;
        if r.is_empty() {
            return Ok(());
        }
        match &blit.face.label {
            None => {
                self.ctx.set_fill_style_str(&blit.face.fill.css());
                self.ctx
                    .fill_rect(r.x as f64, r.y as f64, r.w as f64, r.h as f64);
            }
            Some(label) => {
                let raster = self
                    .cache
                    .get_or_render(&self.document, r.w, r.h, &blit.face, label)?;
                self.ctx
                    .draw_image_with_html_canvas_element(raster, r.x as f64, r.y as f64)?;
            }
        }
        Ok(())
    }
}
