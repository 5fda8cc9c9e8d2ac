pub mod session;
pub mod stage;

pub use session::{Session, SessionStats, Tick};
pub use stage::{Stage, StageAction, ViewStatus};
