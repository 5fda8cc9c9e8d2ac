use crate::color::Rgb;
use crate::error::LayoutError;
use crate::geometry::{PipBox, PipMapper};
use crate::model::{Built, PanelLayout, Tile};

/// A flat, inert panel. Useful as a spacer or a colored border.
#[derive(Debug, Clone)]
pub struct Plate {
    pip_box: PipBox,
    color: Rgb,
}

impl Plate {
    pub fn new(x: i32, y: i32, w: i32, h: i32, color: Rgb) -> Result<Self, LayoutError> {
        let pip_box = PipBox::checked(x.into(), y.into(), w.into(), h.into())?;
        Ok(Self { pip_box, color })
    }
}

impl PanelLayout for Plate {
    fn pip_box(&self) -> PipBox {
        self.pip_box
    }

    fn build(&self, map: &PipMapper) -> Built {
        let frame = map.pip_rect(&self.pip_box);
        Built {
            frame,
            tiles: vec![Tile::backdrop(frame, self.color)],
        }
    }

    fn kind(&self) -> &'static str {
        "plate"
    }
}
