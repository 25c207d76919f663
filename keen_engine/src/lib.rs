pub mod actions;
pub mod cli;
pub mod constants;
pub mod cutscene;
pub mod episode;
pub mod host;
pub mod lumps;
pub mod map_state;
pub mod objects;
pub mod recording;
pub mod scan;
pub mod session;
pub mod spawn;
pub mod state;

#[cfg(test)]
mod testing;

pub use actions::{load_action_defs, ActionDef, ActionTable, BehaviorRegistry, Motion};
pub use constants::{BindError, EpisodeConstants};
pub use cutscene::{ExplosionOutcome, GalaxyExplosion};
pub use episode::{Episode, EpisodeId, Keen5, Keen6, Keen6Version};
pub use host::Host;
pub use map_state::{SwitchEffect, SwitchError};
pub use objects::{ObjectId, ObjectPool};
pub use recording::{HostEvent, RecordingHost};
pub use scan::ScanReport;
pub use session::{Level, Session, SessionError};
pub use state::{Difficulty, GameState, LevelState};
