//! Instrument configuration: which panels to build, where the play area sits and
//! how to reach a MIDI output. Loaded from a named preset or inline JSON.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::Align;
use crate::model::PanelLayout;
use crate::panels::{PadGrid, Piano, Plate, Roller, Spill, Theremin, TileArray};

pub const PRESETS: [&str; 6] = ["piano", "pads", "after-pads", "rollers", "theremin", "tiles"];

pub const DEFAULT_PRESET: &str = "piano";

const MAJOR: [u8; 7] = [2, 2, 1, 2, 2, 2, 1];
const DORIAN: [u8; 7] = [2, 1, 2, 2, 2, 1, 2];

fn default_frame() -> Rgb {
    Rgb::FRAME
}
fn default_tile_pips() -> i32 {
    4
}
fn default_one() -> i32 {
    1
}
fn default_root() -> u8 {
    60
}
fn default_scale() -> Vec<u8> {
    MAJOR.to_vec()
}
fn default_piano_notes() -> u32 {
    13
}
fn default_white_w() -> i32 {
    3
}
fn default_black_h() -> i32 {
    5
}
fn default_white_h() -> i32 {
    8
}
fn default_roller_notes() -> u8 {
    13
}
fn default_roller_tile() -> i32 {
    12
}
fn default_low() -> u8 {
    60
}
fn default_high() -> u8 {
    96
}

/// One panel, tagged by `kind`. Positions and sizes are pips unless noted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelSpec {
    Plate {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        #[serde(default = "default_frame")]
        color: Rgb,
    },
    /// `cols`/`rows` are cell counts.
    Pads {
        x: i32,
        y: i32,
        cols: i32,
        rows: i32,
        #[serde(default = "default_root")]
        center: u8,
        #[serde(default = "default_one")]
        x_offset: i32,
        #[serde(default = "default_one")]
        y_offset: i32,
        #[serde(default = "default_tile_pips")]
        tile_pips: i32,
        #[serde(default = "default_one")]
        margin_pips: i32,
        #[serde(default = "default_one")]
        spacing_pips: i32,
        #[serde(default)]
        aftertouch: bool,
    },
    Piano {
        x: i32,
        y: i32,
        #[serde(default = "default_root")]
        root: u8,
        #[serde(default = "default_scale")]
        scale: Vec<u8>,
        #[serde(default = "default_piano_notes")]
        notes: u32,
        #[serde(default = "default_white_w")]
        white_w: i32,
        #[serde(default = "default_black_h")]
        black_h: i32,
        #[serde(default = "default_white_h")]
        white_h: i32,
        #[serde(default)]
        spill: Spill,
    },
    Roller {
        x: i32,
        y: i32,
        #[serde(default = "default_root")]
        root: u8,
        #[serde(default = "default_roller_notes")]
        notes: u8,
        #[serde(default = "default_roller_tile")]
        tile_w: i32,
        #[serde(default = "default_roller_tile")]
        tile_h: i32,
    },
    Theremin {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        #[serde(default = "default_low")]
        low_note: u8,
        #[serde(default = "default_high")]
        high_note: u8,
    },
}

impl PanelSpec {
    /// Validate and turn into a buildable layout. `channel` applies to every
    /// variant except rollers, which own channels 1 and 2.
    pub fn layout(&self, channel: u8) -> Result<Box<dyn PanelLayout>, LayoutError> {
        let layout: Box<dyn PanelLayout> = match self {
            PanelSpec::Plate { x, y, w, h, color } => {
                Box::new(Plate::new(*x, *y, *w, *h, *color)?)
            }
            PanelSpec::Pads {
                x,
                y,
                cols,
                rows,
                center,
                x_offset,
                y_offset,
                tile_pips,
                margin_pips,
                spacing_pips,
                aftertouch,
            } => {
                let grid = PadGrid::new(
                    *cols,
                    *rows,
                    *center as i32,
                    *x_offset,
                    *y_offset,
                    *aftertouch,
                    channel,
                )?;
                Box::new(TileArray::new(
                    *x,
                    *y,
                    *cols,
                    *rows,
                    *tile_pips,
                    *margin_pips,
                    *spacing_pips,
                    grid,
                )?)
            }
            PanelSpec::Piano {
                x,
                y,
                root,
                scale,
                notes,
                white_w,
                black_h,
                white_h,
                spill,
            } => Box::new(
                Piano::new(*x, *y, *root, scale, *notes, *white_w, *black_h, *white_h, *spill)?
                    .on_channel(channel),
            ),
            PanelSpec::Roller {
                x,
                y,
                root,
                notes,
                tile_w,
                tile_h,
            } => Box::new(Roller::new(*x, *y, *root, *notes, *tile_w, *tile_h)?),
            PanelSpec::Theremin {
                x,
                y,
                w,
                h,
                low_note,
                high_note,
            } => Box::new(Theremin::new(*x, *y, *w, *h, *low_note, *high_note)?.on_channel(channel)),
        };
        Ok(layout)
    }
}

/// Where to send notes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiSettings {
    /// Output names tried in order; the first match wins.
    pub device_priority: Vec<String>,
    /// Program change sent once the output is connected.
    pub program: Option<u8>,
    pub channel: u8,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            device_priority: [
                "Arturia MicroFreak",
                "EP-1320",
                "VCV Rack input",
                "MiniFuse 2 MIDI 1",
                "TiMidity",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            program: None,
            channel: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub align: Align,
    pub panels: Vec<PanelSpec>,
    #[serde(default)]
    pub midi: MidiSettings,
}

impl InstrumentConfig {
    pub fn new(name: impl Into<String>, panels: Vec<PanelSpec>) -> Self {
        Self {
            name: name.into(),
            align: Align::default(),
            panels,
            midi: MidiSettings::default(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(text)?;
        if config.name.is_empty() {
            config.name = "custom".into();
        }
        config.validate()?;
        Ok(config)
    }

    /// Resolve a URL fragment: a preset name, inline JSON, or empty for the default.
    /// `aspect` is screen width over height.
    pub fn from_fragment(fragment: &str, aspect: f64) -> Result<Self, ConfigError> {
        let fragment = fragment.trim_start_matches('#').trim();
        if fragment.starts_with('{') {
            return Self::from_json(fragment);
        }
        let name = if fragment.is_empty() {
            DEFAULT_PRESET
        } else {
            fragment
        };
        Self::preset(name, aspect)
    }

    /// Built-in instruments. Grid shapes follow the screen's aspect ratio where
    /// that matters.
    pub fn preset(name: &str, aspect: f64) -> Result<Self, ConfigError> {
        let panels = match name {
            "piano" => (0..3)
                .map(|i| PanelSpec::Piano {
                    x: 0,
                    y: 9 * i,
                    root: (48 + 12 * i) as u8,
                    scale: DORIAN.to_vec(),
                    notes: 25,
                    white_w: 3,
                    black_h: 5,
                    white_h: 8,
                    spill: Spill::Discard,
                })
                .collect(),
            "pads" => vec![pads(odd_columns(9, aspect), 9, 2, 3, 4, false)],
            "after-pads" => vec![pads(odd_columns(9, aspect), 9, 1, 1, 8, true)],
            "rollers" => (0..7)
                .map(|i| PanelSpec::Roller {
                    x: 0,
                    y: -13 * i,
                    root: (24 + 12 * i) as u8,
                    notes: 13,
                    tile_w: 12,
                    tile_h: 12,
                })
                .collect(),
            "theremin" => {
                let rows = 24;
                vec![PanelSpec::Theremin {
                    x: 0,
                    y: 0,
                    w: ((rows as f64 * aspect) as i32).max(1),
                    h: rows,
                    low_note: 60,
                    high_note: 96,
                }]
            }
            "tiles" => vec![
                PanelSpec::Plate {
                    x: 17,
                    y: 1,
                    w: 1,
                    h: 1,
                    color: Rgb::FRAME,
                },
                pads(3, 4, 1, 3, 4, false),
                PanelSpec::Piano {
                    x: 0,
                    y: -9,
                    root: 60,
                    scale: vec![2, 2, 2, 1, 2, 2, 1],
                    notes: 25,
                    white_w: 3,
                    black_h: 5,
                    white_h: 8,
                    spill: Spill::Discard,
                },
            ],
            other => return Err(ConfigError::UnknownPreset(other.to_string())),
        };
        let config = Self::new(name, panels);
        config.validate()?;
        Ok(config)
    }

    /// Build every panel layout in list order.
    pub fn layouts(&self) -> Result<Vec<Box<dyn PanelLayout>>, LayoutError> {
        if self.panels.is_empty() {
            return Err(LayoutError::NoPanels);
        }
        self.panels
            .iter()
            .map(|p| p.layout(self.midi.channel))
            .collect()
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        Align::new(self.align.horizontal, self.align.vertical)?;
        self.layouts().map(|_| ())
    }
}

fn pads(cols: i32, rows: i32, x_offset: i32, y_offset: i32, tile_pips: i32, aftertouch: bool) -> PanelSpec {
    PanelSpec::Pads {
        x: 0,
        y: 0,
        cols,
        rows,
        center: 60,
        x_offset,
        y_offset,
        tile_pips,
        margin_pips: 1,
        spacing_pips: 1,
        aftertouch,
    }
}

/// Columns matching the screen shape for `rows` rows, always odd so a pad sits
/// in the middle.
fn odd_columns(rows: i32, aspect: f64) -> i32 {
    let cols = (rows as f64 * aspect) as i32;
    if cols % 2 == 0 { (cols - 1).max(1) } else { cols.max(1) }
}
