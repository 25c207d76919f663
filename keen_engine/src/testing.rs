//! Shared fixtures for unit tests.

use keen_formats::{MapPlanes, Plane, SymbolTable, TileInfo};

use crate::actions::ActionDef;
use crate::episode::{self, ck5, EpisodeId};
use crate::session::{Level, Session};
use crate::spawn;

const PICTURES: [&str; 22] = [
    "PIC_MENUCARD",
    "PIC_NEWGAMECARD",
    "PIC_LOADCARD",
    "PIC_SAVECARD",
    "PIC_CONFIGURECARD",
    "PIC_SOUNDCARD",
    "PIC_MUSICCARD",
    "PIC_KEYBOARDCARD",
    "PIC_MOVEMENTCARD",
    "PIC_BUTTONSCARD",
    "PIC_JOYSTICKCARD",
    "PIC_OPTIONSCARD",
    "PIC_PADDLEWAR",
    "PIC_DEBUGCARD",
    "PIC_CREDIT1",
    "PIC_CREDIT2",
    "PIC_CREDIT3",
    "PIC_CREDIT4",
    "PIC_KEENTALK1",
    "PIC_KEENTALK2",
    "PIC_MILKYWAY",
    "PIC_GAMEOVER",
];

const SPRITES: [&str; 13] = [
    "SPR_GEM_A1",
    "SPR_GEM_B1",
    "SPR_GEM_C1",
    "SPR_GEM_D1",
    "SPR_100_PTS1",
    "SPR_200_PTS1",
    "SPR_500_PTS1",
    "SPR_1000_PTS1",
    "SPR_2000_PTS1",
    "SPR_5000_PTS1",
    "SPR_1UP1",
    "SPR_STUNNER1",
    "SPR_SECURITYCARD_1",
];

const TEXTS: [&str; 7] = [
    "TEXT_HELPMENU",
    "TEXT_CONTROLS",
    "TEXT_STORY",
    "TEXT_ABOUTID",
    "TEXT_END",
    "TEXT_SECRETEND",
    "TEXT_ORDER",
];

pub const SPRITE_BASE: i64 = 400;
pub const GALAXY_STARS: u16 = 90;
pub const SOUND_TELEPORT: u16 = 41;
pub const SOUND_FUSE: u16 = 52;
pub const SOUND_SWITCH: u16 = 33;

/// Symbols for both episodes with made-up chunk numbers.
pub fn symbols() -> SymbolTable {
    let mut symbols = SymbolTable::default();
    for (i, name) in PICTURES.iter().enumerate() {
        symbols.insert_int(*name, 10 + i as i64);
    }
    for (i, name) in SPRITES.iter().enumerate() {
        symbols.insert_int(*name, SPRITE_BASE + 4 * i as i64);
    }
    for (i, name) in TEXTS.iter().enumerate() {
        symbols.insert_int(*name, 60 + i as i64);
    }
    symbols.insert_int("EXTERN_GALAXY", GALAXY_STARS as i64);
    symbols.insert_int("SOUND_GALAXYEXPLODEPRE", 61);
    symbols.insert_int("SOUND_GALAXYEXPLODE", 62);
    symbols.insert_int("SOUND_UNKNOWN41", SOUND_TELEPORT as i64);
    symbols.insert_int("SOUND_UNKNOWN52", SOUND_FUSE as i64);
    symbols.insert_int("SOUND_KEENOUTOFAMMO", SOUND_SWITCH as i64);
    symbols.insert_string("ck5_str_fuseDestroyed", "One fuse down.");
    symbols.insert_string("ck5_str_fuseDestroyedKorath", "Korath is gone.");
    symbols.insert_string("ck6_str_getSandwich", "A sandwich!");
    symbols.insert_string("ck6_str_getRope", "A rope!");
    symbols.insert_string("ck6_str_getPasscard", "A passcard!");
    symbols
}

/// One frame action for every name the spawners of `id` use, with the
/// episode's behaviours wired where they exist.
pub fn action_defs(id: EpisodeId) -> Vec<ActionDef> {
    let mut names = spawn::required_actions(id);
    if id == EpisodeId::Ck5 {
        names.extend([
            ck5::LIGHTNING_H,
            ck5::LIGHTNING_V,
            ck5::FUSE_EXPLOSION,
            ck5::LEVEL_END,
            "CK5_ACT_PinkShot0",
        ]);
    }
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut def = ActionDef::frame(name, 1000 + i as u16);
            def.think = match name {
                "CK5_ACT_purpleAxisPlatform" => Some("CK5_PurpleAxisPlatform".to_string()),
                ck5::LEVEL_END => Some("CK5_LevelEnd".to_string()),
                _ => None,
            };
            def
        })
        .collect()
}

pub fn session(id: EpisodeId) -> Session {
    let dir = std::env::temp_dir();
    let paths = keen_formats::GamePaths::new(&dir, &dir, &dir);
    Session::activate(episode::definition(id, &paths), &symbols(), action_defs(id))
        .expect("fixture session activates")
}

/// A level whose info plane holds `codes` at the given tiles.
pub fn level(number: u16, width: u16, height: u16, codes: &[(i32, i32, u16)]) -> Level {
    let mut map = MapPlanes::new(width, height);
    for &(x, y, code) in codes {
        if let Some(tile) = map.tile_mut(x, y, Plane::Info) {
            *tile = code;
        }
    }
    Level::new(number, map, TileInfo::default())
}
