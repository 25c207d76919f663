//! Per-episode values bound once at activation: chunk numbers resolved
//! through the symbol table, palettes, item sounds and level music.

use keen_formats::{SymbolError, SymbolTable};
use serde::Serialize;
use thiserror::Error;

use crate::host::Palette;

#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuPictures {
    pub menu_card: u16,
    pub new_game_card: u16,
    pub load_card: u16,
    pub save_card: u16,
    pub configure_card: u16,
    pub sound_card: u16,
    pub music_card: u16,
    pub keyboard_card: u16,
    pub movement_card: u16,
    pub buttons_card: u16,
    pub joystick_card: u16,
    pub options_card: u16,
    pub paddle_war: u16,
    pub debug_card: u16,
}

impl MenuPictures {
    fn bind(symbols: &SymbolTable) -> Result<Self, BindError> {
        Ok(MenuPictures {
            menu_card: symbols.chunk("PIC_MENUCARD")?,
            new_game_card: symbols.chunk("PIC_NEWGAMECARD")?,
            load_card: symbols.chunk("PIC_LOADCARD")?,
            save_card: symbols.chunk("PIC_SAVECARD")?,
            configure_card: symbols.chunk("PIC_CONFIGURECARD")?,
            sound_card: symbols.chunk("PIC_SOUNDCARD")?,
            music_card: symbols.chunk("PIC_MUSICCARD")?,
            keyboard_card: symbols.chunk("PIC_KEYBOARDCARD")?,
            movement_card: symbols.chunk("PIC_MOVEMENTCARD")?,
            buttons_card: symbols.chunk("PIC_BUTTONSCARD")?,
            joystick_card: symbols.chunk("PIC_JOYSTICKCARD")?,
            options_card: symbols.chunk("PIC_OPTIONSCARD")?,
            paddle_war: symbols.chunk("PIC_PADDLEWAR")?,
            debug_card: symbols.chunk("PIC_DEBUGCARD")?,
        })
    }
}

/// First animation frame of every pickup sprite, indexed by item number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSprites {
    pub gems: [u16; 4],
    pub points: [u16; 6],
    pub one_up: u16,
    pub stunner: u16,
    /// Keen 5 security card; Keen 6 has no item 12.
    pub keycard: Option<u16>,
}

impl ItemSprites {
    fn bind(symbols: &SymbolTable, with_keycard: bool) -> Result<Self, BindError> {
        let keycard = if with_keycard {
            Some(symbols.chunk("SPR_SECURITYCARD_1")?)
        } else {
            None
        };
        Ok(ItemSprites {
            gems: [
                symbols.chunk("SPR_GEM_A1")?,
                symbols.chunk("SPR_GEM_B1")?,
                symbols.chunk("SPR_GEM_C1")?,
                symbols.chunk("SPR_GEM_D1")?,
            ],
            points: [
                symbols.chunk("SPR_100_PTS1")?,
                symbols.chunk("SPR_200_PTS1")?,
                symbols.chunk("SPR_500_PTS1")?,
                symbols.chunk("SPR_1000_PTS1")?,
                symbols.chunk("SPR_2000_PTS1")?,
                symbols.chunk("SPR_5000_PTS1")?,
            ],
            one_up: symbols.chunk("SPR_1UP1")?,
            stunner: symbols.chunk("SPR_STUNNER1")?,
            keycard,
        })
    }

    pub fn for_item(&self, item: u16) -> Option<u16> {
        match item {
            0..=3 => Some(self.gems[item as usize]),
            4..=9 => Some(self.points[item as usize - 4]),
            10 => Some(self.one_up),
            11 => Some(self.stunner),
            12 => self.keycard,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChunks {
    pub help_menu: Option<u16>,
    pub controls: Option<u16>,
    pub story: Option<u16>,
    pub about_id: Option<u16>,
    pub end: u16,
    pub secret_end: Option<u16>,
    pub order: Option<u16>,
}

/// Keen 5 music track numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MusicTracks {
    pub came_in: u16,
    pub little_ampton: u16,
    pub the_ice: u16,
    pub snoopin: u16,
    pub bagpipes: u16,
    pub wednesday: u16,
    pub rock_no_stone: u16,
    pub out_of_breath: u16,
    pub shikadi_aire: u16,
    pub diamonds: u16,
    pub tighter: u16,
    pub robo_red_rock: u16,
    pub fanfare: u16,
    pub bringer_of_war: u16,
    pub last_track: u16,
}

pub const CK5_MUSIC: MusicTracks = MusicTracks {
    came_in: 0,
    little_ampton: 1,
    the_ice: 2,
    snoopin: 3,
    bagpipes: 4,
    wednesday: 5,
    rock_no_stone: 6,
    out_of_breath: 7,
    shikadi_aire: 8,
    diamonds: 9,
    tighter: 10,
    robo_red_rock: 11,
    fanfare: 12,
    bringer_of_war: 13,
    last_track: 14,
};

/// Chunks, sounds and strings used by the Keen 5 ending and fuse dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ck5Assets {
    pub milky_way: u16,
    pub galaxy_stars: u16,
    pub game_over: u16,
    pub keen_talk1: u16,
    pub keen_talk2: u16,
    pub sound_explode_pre: u16,
    pub sound_explode: u16,
    pub sound_teleport: u16,
    pub sound_fuse: u16,
    pub fuse_destroyed: String,
    pub fuse_destroyed_korath: String,
}

impl Ck5Assets {
    pub fn bind(symbols: &SymbolTable) -> Result<Self, BindError> {
        Ok(Ck5Assets {
            milky_way: symbols.chunk("PIC_MILKYWAY")?,
            galaxy_stars: symbols.chunk("EXTERN_GALAXY")?,
            game_over: symbols.chunk("PIC_GAMEOVER")?,
            keen_talk1: symbols.chunk("PIC_KEENTALK1")?,
            keen_talk2: symbols.chunk("PIC_KEENTALK2")?,
            sound_explode_pre: symbols.chunk("SOUND_GALAXYEXPLODEPRE")?,
            sound_explode: symbols.chunk("SOUND_GALAXYEXPLODE")?,
            sound_teleport: symbols.chunk("SOUND_UNKNOWN41")?,
            sound_fuse: symbols.chunk("SOUND_UNKNOWN52")?,
            fuse_destroyed: symbols.string("ck5_str_fuseDestroyed")?.to_string(),
            fuse_destroyed_korath: symbols
                .string("ck5_str_fuseDestroyedKorath")?
                .to_string(),
        })
    }
}

pub const CK6_STORY_ITEM_SOUND: u16 = 0x2D;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ck6Assets {
    pub keen_talk1: u16,
    pub sound_story_item: u16,
    pub sound_switch: u16,
    pub get_sandwich: String,
    pub get_rope: String,
    pub get_passcard: String,
}

impl Ck6Assets {
    pub fn bind(symbols: &SymbolTable) -> Result<Self, BindError> {
        Ok(Ck6Assets {
            keen_talk1: symbols.chunk("PIC_KEENTALK1")?,
            sound_story_item: CK6_STORY_ITEM_SOUND,
            sound_switch: symbols.chunk("SOUND_KEENOUTOFAMMO")?,
            get_sandwich: symbols.string("ck6_str_getSandwich")?.to_string(),
            get_rope: symbols.string("ck6_str_getRope")?.to_string(),
            get_passcard: symbols.string("ck6_str_getPasscard")?.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "episode", rename_all = "snake_case")]
pub enum EpisodeAssets {
    Ck5(Ck5Assets),
    Ck6(Ck6Assets),
}

/// Values every shared subsystem reads after activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeConstants {
    pub pictures: MenuPictures,
    pub credits: [u16; 4],
    pub sprites: ItemSprites,
    pub texts: TextChunks,
    pub music: Option<MusicTracks>,
    pub star_wars_palette: Palette,
    pub terminator_palette1: Palette,
    pub terminator_palette2: Palette,
    pub item_sounds: Vec<u16>,
    pub level_music: Vec<i16>,
    pub assets: EpisodeAssets,
}

impl EpisodeConstants {
    pub fn ck5(&self) -> Option<&Ck5Assets> {
        match &self.assets {
            EpisodeAssets::Ck5(assets) => Some(assets),
            EpisodeAssets::Ck6(_) => None,
        }
    }

    pub fn ck6(&self) -> Option<&Ck6Assets> {
        match &self.assets {
            EpisodeAssets::Ck6(assets) => Some(assets),
            EpisodeAssets::Ck5(_) => None,
        }
    }

    pub fn level_music(&self, level: u16) -> Option<i16> {
        self.level_music.get(level as usize).copied()
    }
}

/// Episode-specific tables handed to [`bind_constants`].
pub struct EpisodeTables {
    pub with_keycard: bool,
    pub full_texts: bool,
    pub music: Option<MusicTracks>,
    pub star_wars_palette: Palette,
    pub terminator_palette1: Palette,
    pub terminator_palette2: Palette,
    pub item_sounds: &'static [u16],
    pub level_music: &'static [i16],
}

pub fn bind_constants(
    symbols: &SymbolTable,
    tables: &EpisodeTables,
    assets: EpisodeAssets,
) -> Result<EpisodeConstants, BindError> {
    let texts = if tables.full_texts {
        TextChunks {
            help_menu: Some(symbols.chunk("TEXT_HELPMENU")?),
            controls: Some(symbols.chunk("TEXT_CONTROLS")?),
            story: Some(symbols.chunk("TEXT_STORY")?),
            about_id: Some(symbols.chunk("TEXT_ABOUTID")?),
            end: symbols.chunk("TEXT_END")?,
            secret_end: Some(symbols.chunk("TEXT_SECRETEND")?),
            order: Some(symbols.chunk("TEXT_ORDER")?),
        }
    } else {
        TextChunks {
            help_menu: None,
            controls: None,
            story: None,
            about_id: None,
            end: symbols.chunk("TEXT_END")?,
            secret_end: None,
            order: None,
        }
    };

    Ok(EpisodeConstants {
        pictures: MenuPictures::bind(symbols)?,
        credits: [
            symbols.chunk("PIC_CREDIT1")?,
            symbols.chunk("PIC_CREDIT2")?,
            symbols.chunk("PIC_CREDIT3")?,
            symbols.chunk("PIC_CREDIT4")?,
        ],
        sprites: ItemSprites::bind(symbols, tables.with_keycard)?,
        texts,
        music: tables.music,
        star_wars_palette: tables.star_wars_palette,
        terminator_palette1: tables.terminator_palette1,
        terminator_palette2: tables.terminator_palette2,
        item_sounds: tables.item_sounds.to_vec(),
        level_music: tables.level_music.to_vec(),
        assets,
    })
}
