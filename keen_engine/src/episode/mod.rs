//! Episode definitions: one implementation per supported game, selected
//! once at startup.

use std::fmt;

use clap::ValueEnum;
use keen_formats::{GamePaths, SymbolTable};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::actions::BehaviorRegistry;
use crate::constants::{BindError, EpisodeConstants};
use crate::scan::ScanContext;

pub mod ck5;
pub mod ck6;

pub use ck5::Keen5;
pub use ck6::{Keen6, Keen6Version};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeId {
    Ck5,
    Ck6,
}

impl EpisodeId {
    /// Data file extension, e.g. `GAMEMAPS.CK5`.
    pub fn ext(self) -> &'static str {
        match self {
            EpisodeId::Ck5 => "CK5",
            EpisodeId::Ck6 => "CK6",
        }
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

/// Offsets into the original executable's data segment, used when reading
/// and writing DOS-compatible saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatchOffsets {
    pub last_level_to_mark_as_done: u16,
    pub obj_array: u16,
    pub temp_obj: u16,
    pub sprite_array: u16,
    pub print_x: u16,
    pub anim_tiles: u16,
    pub anim_tile_size: u16,
    pub has_creature_question: bool,
}

pub trait Episode: fmt::Debug {
    fn id(&self) -> EpisodeId;

    fn patch_offsets(&self) -> PatchOffsets;

    /// Whether every file the episode needs can be found. Never touches
    /// session state.
    fn is_present(&self, paths: &GamePaths) -> bool;

    /// Registers the episode's named behaviours.
    fn setup_functions(&self, registry: &mut BehaviorRegistry);

    fn define_constants(&self, symbols: &SymbolTable) -> Result<EpisodeConstants, BindError>;

    /// Walks the info plane of the loaded level, spawning objects and
    /// requesting the graphics they need.
    fn scan_info_layer(&self, ctx: &mut ScanContext<'_>);
}

const KEEN_FILES: [&str; 3] = ["EGAGRAPH", "GAMEMAPS", "AUDIO"];

const OMNI_FILES: [&str; 8] = [
    "EGAHEAD", "EGADICT", "GFXINFOE", "MAPHEAD", "AUDIODCT", "AUDIOHHD", "AUDINFOE", "ACTION",
];

pub(crate) fn required_files_present(paths: &GamePaths, ext: &str) -> bool {
    for stem in KEEN_FILES {
        let name = format!("{stem}.{ext}");
        if !paths.is_keen_file_present(&name) {
            debug!("{name} missing from {}", paths.keen_path().display());
            return false;
        }
    }
    for stem in OMNI_FILES {
        let name = format!("{stem}.{ext}");
        if !paths.is_omni_file_present(&name) {
            debug!("{name} missing from {}", paths.omni_path().display());
            return false;
        }
    }
    true
}

/// Builds the definition for `id` without checking for data files.
pub fn definition(id: EpisodeId, paths: &GamePaths) -> Box<dyn Episode> {
    match id {
        EpisodeId::Ck5 => Box::new(Keen5),
        EpisodeId::Ck6 => Box::new(Keen6::new(Keen6Version::detect(paths))),
    }
}

/// Returns the episode definition for `id` when its data is present.
pub fn detect(id: EpisodeId, paths: &GamePaths) -> Option<Box<dyn Episode>> {
    let episode = definition(id, paths);
    if !episode.is_present(paths) {
        return None;
    }
    info!("found {id} data in {}", paths.keen_path().display());
    Some(episode)
}

/// Tries every episode in order and returns the first one present.
pub fn detect_any(paths: &GamePaths) -> Option<Box<dyn Episode>> {
    [EpisodeId::Ck5, EpisodeId::Ck6]
        .into_iter()
        .find_map(|id| detect(id, paths))
}
