//! Error types for layout construction and configuration loading.

use thiserror::Error;

/// Rejected layout parameters. A session never starts with one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("an instrument needs at least one panel")]
    NoPanels,
    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: i64 },
    #[error("screen size {width}x{height} cannot hold a {pip_w}x{pip_h} pip grid")]
    ScreenTooSmall {
        width: i32,
        height: i32,
        pip_w: i32,
        pip_h: i32,
    },
    #[error("alignment fraction {0} is outside 0..=1")]
    Alignment(String),
    #[error("piano scale interval {0} is not 1 or 2")]
    ScaleInterval(u8),
    #[error("note range is empty")]
    EmptyNoteRange,
    #[error("{what} {value} is out of range")]
    TooLarge { what: &'static str, value: i64 },
}

impl LayoutError {
    pub(crate) fn non_positive(what: &'static str, value: impl Into<i64>) -> Self {
        Self::NonPositive {
            what,
            value: value.into(),
        }
    }

    pub(crate) fn too_large(what: &'static str, value: impl Into<i64>) -> Self {
        Self::TooLarge {
            what,
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid instrument config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
