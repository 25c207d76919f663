#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use keen_engine::actions::ActionDef;
use keen_engine::episode::{self, ck5, EpisodeId};
use keen_engine::session::{Level, Session};
use keen_engine::spawn;
use keen_formats::{GamePaths, LevelFile, SymbolTable};

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn symbols() -> Result<SymbolTable> {
    let path = fixture("symbols.json");
    SymbolTable::from_json_file(&path).with_context(|| format!("loading {}", path.display()))
}

/// A frame action for every name the episode's spawners look up, with the
/// Keen 5 behaviours linked.
pub fn action_defs(id: EpisodeId) -> Vec<ActionDef> {
    let mut names = spawn::required_actions(id);
    if id == EpisodeId::Ck5 {
        names.extend([ck5::LIGHTNING_H, ck5::LIGHTNING_V, ck5::FUSE_EXPLOSION, ck5::LEVEL_END]);
    }
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut def = ActionDef::frame(name, 2000 + i as u16);
            if name == ck5::LEVEL_END {
                def.think = Some("CK5_LevelEnd".to_string());
            }
            def
        })
        .collect()
}

pub fn session(id: EpisodeId) -> Result<Session> {
    let paths = GamePaths::default();
    let session = Session::activate(episode::definition(id, &paths), &symbols()?, action_defs(id))
        .context("activating fixture session")?;
    Ok(session)
}

pub fn level(name: &str) -> Result<Level> {
    let file = LevelFile::from_json_file(&fixture(name))?;
    Level::try_from(file).context("building fixture level")
}
