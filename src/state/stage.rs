use std::rc::Rc;

use yew::prelude::*;

use crate::config::InstrumentConfig;
use crate::state::SessionStats;

/// Facts about the running surface for the status panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewStatus {
    pub pip: i32,
    pub screen: (i32, i32),
    pub panels: usize,
    pub tiles: usize,
    pub midi: Option<String>,
}

/// What the page is showing: the chosen instrument and the fate of its session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stage {
    pub config: Option<InstrumentConfig>,
    pub error: Option<String>,
    /// Bumped whenever the instrument view must be rebuilt from scratch.
    pub generation: u32,
    /// Bumped to ask the running session to end.
    pub end_request: u32,
    pub ended: Option<SessionStats>,
    pub status: ViewStatus,
    pub show_controls: bool,
}

pub enum StageAction {
    /// A URL fragment and the screen's width over height.
    Load { fragment: String, aspect: f64 },
    Restart,
    RequestEnd,
    Ended(SessionStats),
    Failed(String),
    Status(ViewStatus),
    ToggleControls,
}

impl Stage {
    pub fn new() -> Self {
        Self {
            show_controls: true,
            ..Default::default()
        }
    }

    pub fn instrument_name(&self) -> &str {
        self.config.as_ref().map_or("", |c| c.name.as_str())
    }

    fn rebuild(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.ended = None;
        self.status = ViewStatus::default();
    }
}

impl Reducible for Stage {
    type Action = StageAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use StageAction::*;
        let mut new = (*self).clone();
        match action {
            Load { fragment, aspect } => match InstrumentConfig::from_fragment(&fragment, aspect) {
                Ok(config) => {
                    log::info!("loaded instrument `{}`", config.name);
                    new.config = Some(config);
                    new.error = None;
                    new.rebuild();
                }
                Err(e) => {
                    log::warn!("cannot load `{fragment}`: {e}");
                    new.config = None;
                    new.error = Some(e.to_string());
                }
            },
            Restart => {
                if new.config.is_some() {
                    new.rebuild();
                }
            }
            RequestEnd => {
                if new.config.is_some() && new.ended.is_none() {
                    new.end_request = new.end_request.wrapping_add(1);
                }
            }
            Ended(stats) => {
                new.ended = Some(stats);
            }
            Failed(msg) => {
                new.config = None;
                new.error = Some(msg);
            }
            Status(status) => {
                new.status = status;
            }
            ToggleControls => {
                new.show_controls = !new.show_controls;
            }
        }
        Rc::new(new)
    }
}
