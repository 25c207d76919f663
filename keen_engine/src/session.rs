use keen_formats::{LevelFile, MapError, MapPlanes, SymbolTable, TileInfo};
use log::{debug, info, warn};
use thiserror::Error;

use crate::actions::{ActionDef, ActionError, ActionTable, BehaviorRegistry, Motion, ThinkContext};
use crate::constants::{BindError, EpisodeConstants};
use crate::episode::{Episode, EpisodeId};
use crate::host::Host;
use crate::objects::{ObjectId, ObjectPool};
use crate::scan::{ScanContext, ScanReport};
use crate::spawn::{self, Spawner};
use crate::state::{Difficulty, GameState};

/// The map currently being played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub number: u16,
    pub map: MapPlanes,
    pub tileinfo: TileInfo,
}

impl Level {
    pub fn new(number: u16, map: MapPlanes, tileinfo: TileInfo) -> Self {
        Level {
            number,
            map,
            tileinfo,
        }
    }
}

impl TryFrom<LevelFile> for Level {
    type Error = MapError;

    fn try_from(file: LevelFile) -> Result<Self, Self::Error> {
        let (number, map, tileinfo) = file.into_parts()?;
        Ok(Level::new(number, map, tileinfo))
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("binding episode constants: {0}")]
    Bind(#[from] BindError),
    #[error("linking actions: {0}")]
    Actions(#[from] ActionError),
}

/// One activated episode: its constants, linked actions, game state and
/// the objects of the level in play.
pub struct Session {
    episode: Box<dyn Episode>,
    constants: EpisodeConstants,
    actions: ActionTable,
    pub game: GameState,
    pub objects: ObjectPool,
    level: Option<Level>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("episode", &self.episode)
            .field("game", &self.game)
            .field("objects", &self.objects.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl Session {
    /// Registers the episode's behaviours, links `action_defs` against them
    /// and binds the episode constants.
    pub fn activate(
        episode: Box<dyn Episode>,
        symbols: &SymbolTable,
        action_defs: Vec<ActionDef>,
    ) -> Result<Self, SessionError> {
        let mut registry = BehaviorRegistry::default();
        episode.setup_functions(&mut registry);
        debug!(
            "{} behaviours: {}",
            episode.id(),
            registry.names().collect::<Vec<_>>().join(", ")
        );
        let actions = ActionTable::build(action_defs, &registry)?;
        let constants = episode.define_constants(symbols)?;

        let missing: Vec<&str> = spawn::required_actions(episode.id())
            .into_iter()
            .filter(|name| actions.lookup(name).is_none())
            .collect();
        if !missing.is_empty() {
            warn!(
                "{} spawner actions missing; those spawns will be dropped: {}",
                missing.len(),
                missing.join(", ")
            );
        }
        info!(
            "activated {} with {} actions and {} behaviours",
            episode.id(),
            actions.len(),
            registry.len()
        );

        Ok(Session {
            game: GameState::new(episode.id()),
            episode,
            constants,
            actions,
            objects: ObjectPool::new(),
            level: None,
        })
    }

    pub fn episode(&self) -> &dyn Episode {
        self.episode.as_ref()
    }

    pub fn episode_id(&self) -> EpisodeId {
        self.episode.id()
    }

    pub fn constants(&self) -> &EpisodeConstants {
        &self.constants
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn new_game(&mut self, difficulty: Difficulty) {
        self.game.new_game(difficulty);
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    /// Makes `level` current, resets the object pool and scans its info
    /// plane.
    pub fn start_level(&mut self, level: Level, host: &mut dyn Host) -> ScanReport {
        let number = level.number;
        self.game.current_level = number;
        self.objects.reset_for_level();
        let level = self.level.insert(level);

        let mut ctx = ScanContext {
            episode: self.episode.id(),
            game: &mut self.game,
            constants: &self.constants,
            objects: &mut self.objects,
            actions: &self.actions,
            level,
            host,
            report: ScanReport {
                level: number,
                music: self.constants.level_music(number),
                ..ScanReport::default()
            },
        };
        self.episode.scan_info_layer(&mut ctx);
        ctx.finish();
        ctx.report
    }

    pub fn spawner<'a>(&'a mut self, host: &'a mut dyn Host) -> Spawner<'a> {
        Spawner {
            episode: self.episode.id(),
            demo_playback: self.game.demo_playback,
            constants: &self.constants,
            objects: &mut self.objects,
            actions: &self.actions,
            host,
        }
    }

    /// Runs the think hook of `id`'s current action once.
    pub fn think(&mut self, id: ObjectId, motion: &mut Motion, sprite_sync: i32) -> bool {
        let Some(level) = self.level.as_ref() else {
            return false;
        };
        let think = self
            .objects
            .get(id)
            .and_then(|object| object.action)
            .and_then(|action| self.actions.get(action))
            .and_then(|action| action.think);
        let Some(think) = think else {
            return false;
        };
        let mut ctx = ThinkContext {
            game: &mut self.game,
            objects: &mut self.objects,
            level,
            motion,
            sprite_sync,
        };
        think(&mut ctx, id);
        true
    }
}
