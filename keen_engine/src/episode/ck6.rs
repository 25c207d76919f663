//! Keen 6: Aliens Ate My Baby Sitter!

use keen_formats::{GamePaths, SymbolTable};
use log::{debug, info};
use serde::Serialize;

use super::{required_files_present, Episode, EpisodeId, PatchOffsets};
use crate::actions::BehaviorRegistry;
use crate::constants::{
    bind_constants, BindError, Ck6Assets, EpisodeAssets, EpisodeConstants, EpisodeTables,
};
use crate::host::Palette;
use crate::lumps::{LumpPolicy, LumpRange, LumpTracker};
use crate::scan::{
    find_cascade, standing_platform_allowed, walk_info_plane, Cascade, CascadeHit, ScanContext,
};
use crate::spawn::SpawnKind;

/// Size of `EGAGRAPH.CK6` in the 1.5 release.
const V15_EGAGRAPH_SIZE: u64 = 464_662;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Keen6Version {
    V14,
    V15,
}

impl Keen6Version {
    /// Tells the releases apart by the size of the graphics file.
    pub fn detect(paths: &GamePaths) -> Self {
        match paths.keen_file_size("EGAGRAPH.CK6") {
            Some(V15_EGAGRAPH_SIZE) => Keen6Version::V15,
            _ => Keen6Version::V14,
        }
    }

    pub fn patch_offsets(self) -> PatchOffsets {
        match self {
            Keen6Version::V14 => PatchOffsets {
                last_level_to_mark_as_done: 16,
                obj_array: 0xA995,
                temp_obj: 0xC761,
                sprite_array: 0xD7EC,
                print_x: 0xA6C5,
                anim_tiles: 0xDF78,
                anim_tile_size: 10,
                has_creature_question: true,
            },
            Keen6Version::V15 => PatchOffsets {
                last_level_to_mark_as_done: 16,
                obj_array: 0x75CE,
                temp_obj: 0x939E,
                sprite_array: 0xCEA2,
                print_x: 0xE81A,
                anim_tiles: 0xD62E,
                anim_tile_size: 10,
                has_creature_question: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Ck6Lump {
    Unused = 0,
    Keen,
    Points100,
    Points200,
    Points500,
    Points1000,
    Points2000,
    Points5000,
    OneUp,
    Gems,
    Stunner,
    MapKeen,
    Lump12,
    Bloog,
    BloogletR,
    BloogletY,
    BloogletB,
    BloogletG,
    Platform,
    Gik,
    Blorb,
    Bobba,
    Babobba,
    Bloogguard,
    Flect,
    Bip,
    PlatBip,
    Bipship,
    Nospike,
    Orbatrix,
    Ceilick,
    Fleex,
    Rope,
    Sandwich,
    Turret,
    Passcard,
    Molly,
}

impl From<Ck6Lump> for usize {
    fn from(lump: Ck6Lump) -> usize {
        lump as usize
    }
}

const LUMP_STARTS: [u16; 40] = [
    11, 52, 150, 152, 154, 156, 158, 160, 162, 164, 173, 184, 0, 342, 351, 360, 369, 378, 424, 387,
    399, 402, 285, 254, 317, 414, 423, 269, 298, 329, 246, 239, 183, 182, 176, 435, 433, 0, 0, 0,
];
const LUMP_ENDS: [u16; 40] = [
    26, 149, 151, 153, 155, 157, 159, 161, 163, 172, 174, 238, 0, 350, 359, 368, 377, 386, 432,
    398, 401, 413, 297, 268, 328, 422, 423, 284, 316, 341, 253, 245, 183, 182, 181, 435, 434, 0,
    0, 0,
];

const fn lump_table() -> [LumpRange; 40] {
    let mut table = [LumpRange::EMPTY; 40];
    let mut i = 0;
    while i < table.len() {
        table[i] = LumpRange::new(LUMP_STARTS[i], LUMP_ENDS[i]);
        i += 1;
    }
    table
}

/// Slot 0 spans chunks 11..=26 but no code ever requests it.
pub static LUMPS: [LumpRange; 40] = lump_table();

const ITEM_LUMPS: [Ck6Lump; 12] = [
    Ck6Lump::Gems,
    Ck6Lump::Gems,
    Ck6Lump::Gems,
    Ck6Lump::Gems,
    Ck6Lump::Points100,
    Ck6Lump::Points200,
    Ck6Lump::Points500,
    Ck6Lump::Points1000,
    Ck6Lump::Points2000,
    Ck6Lump::Points5000,
    Ck6Lump::OneUp,
    Ck6Lump::Stunner,
];

const SCORE_BOX_CHUNK: u16 = 175;

const STAR_WARS_PALETTE: Palette = [
    0x00, 0x01, 0x18, 0x19, 0x04, 0x1C, 0x06, 0x07, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F,
    0x1F, 0x00,
];
const TERMINATOR_PALETTE1: Palette = [
    0, 5, 5, 0x15, 1, 1, 1, 1, 0x11, 0x11, 0x11, 0x11, 0x13, 0x13, 0x13, 0x13, 0,
];
const TERMINATOR_PALETTE2: Palette = [
    0, 5, 5, 0x15, 1, 1, 1, 1, 0x11, 0x11, 0x11, 0x11, 0x13, 0x13, 0x13, 5, 0,
];
const ITEM_SOUNDS: [u16; 12] = [19, 19, 19, 19, 8, 8, 8, 8, 8, 8, 17, 9];
const LEVEL_MUSIC: [i16; 20] = [5, 3, 1, 8, 8, 8, 7, 2, 7, 1, 3, 2, 1, 4, 4, 6, 2, 0, 0, 0];

#[derive(Debug, Clone, Copy)]
struct Placement {
    kind: SpawnKind,
    lumps: &'static [Ck6Lump],
}

const fn place(kind: SpawnKind, lumps: &'static [Ck6Lump]) -> Placement {
    Placement { kind, lumps }
}

const CASCADES: [Cascade<Placement>; 12] = [
    Cascade::new(4, place(SpawnKind::Bloog, &[Ck6Lump::Bloog])),
    Cascade::new(18, place(SpawnKind::Fleex, &[Ck6Lump::Fleex])),
    Cascade::new(41, place(SpawnKind::Bobba, &[Ck6Lump::Bobba])),
    Cascade::new(47, place(SpawnKind::Nospike, &[Ck6Lump::Nospike])),
    Cascade::new(50, place(SpawnKind::Gik, &[Ck6Lump::Gik])),
    Cascade::new(70, place(SpawnKind::Orbatrix, &[Ck6Lump::Orbatrix])),
    Cascade::new(
        73,
        place(
            SpawnKind::Bipship,
            &[Ck6Lump::Bip, Ck6Lump::PlatBip, Ck6Lump::Bipship],
        ),
    ),
    Cascade::new(76, place(SpawnKind::Flect, &[Ck6Lump::Flect])),
    Cascade::new(79, place(SpawnKind::Blorb, &[Ck6Lump::Blorb])),
    Cascade::new(82, place(SpawnKind::Ceilick, &[Ck6Lump::Ceilick])),
    Cascade::new(85, place(SpawnKind::Bloogguard, &[Ck6Lump::Bloogguard])),
    Cascade::new(102, place(SpawnKind::Babobba, &[Ck6Lump::Babobba])),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keen6 {
    version: Keen6Version,
}

impl Keen6 {
    pub fn new(version: Keen6Version) -> Self {
        Keen6 { version }
    }
}

impl Episode for Keen6 {
    fn id(&self) -> EpisodeId {
        EpisodeId::Ck6
    }

    fn patch_offsets(&self) -> PatchOffsets {
        self.version.patch_offsets()
    }

    fn is_present(&self, paths: &GamePaths) -> bool {
        required_files_present(paths, EpisodeId::Ck6.ext())
    }

    fn setup_functions(&self, _registry: &mut BehaviorRegistry) {
        debug!("Keen 6 {:?} uses the shared behaviours only", self.version);
    }

    fn define_constants(&self, symbols: &SymbolTable) -> Result<EpisodeConstants, BindError> {
        let tables = EpisodeTables {
            with_keycard: false,
            full_texts: false,
            music: None,
            star_wars_palette: STAR_WARS_PALETTE,
            terminator_palette1: TERMINATOR_PALETTE1,
            terminator_palette2: TERMINATOR_PALETTE2,
            item_sounds: &ITEM_SOUNDS,
            level_music: &LEVEL_MUSIC,
        };
        let assets = EpisodeAssets::Ck6(Ck6Assets::bind(symbols)?);
        let constants = bind_constants(symbols, &tables, assets)?;
        info!("bound Keen 6 {:?} constants", self.version);
        Ok(constants)
    }

    fn scan_info_layer(&self, ctx: &mut ScanContext<'_>) {
        let mut lumps = LumpTracker::new(&LUMPS);
        walk_info_plane(ctx, |ctx, x, y, code| place_code(ctx, &mut lumps, x, y, code));

        ctx.deactivate_offscreen();
        ctx.resolve_lumps(&lumps, LumpPolicy::Cache);
    }
}

fn place_code(ctx: &mut ScanContext<'_>, lumps: &mut LumpTracker, x: i32, y: i32, code: u16) {
    if let Some(hit) = find_cascade(&CASCADES, code, ctx.difficulty()) {
        if let CascadeHit::Spawn(placement) = hit {
            ctx.spawn(code, placement.kind, x, y);
            for &lump in placement.lumps {
                lumps.mark(lump);
            }
        }
        return;
    }

    match code {
        1 | 2 => {
            let facing = if code == 1 { 1 } else { -1 };
            ctx.spawn(code, SpawnKind::Keen { facing }, x, y);
            ctx.spawn(code, SpawnKind::ScoreBox, x, y);
            ctx.mark_chunk(SCORE_BOX_CHUNK);
            lumps.mark(Ck6Lump::Keen);
        }
        3 => {
            ctx.spawn(code, SpawnKind::ScoreBox, x, y);
            ctx.mark_chunk(SCORE_BOX_CHUNK);
            ctx.spawn(code, SpawnKind::MapKeen, x, y);
            lumps.mark(Ck6Lump::MapKeen);
        }
        7..=14 => {
            let variant = code - 7;
            lumps.mark(Ck6Lump::BloogletR as usize + (variant % 4) as usize);
            ctx.spawn(code, SpawnKind::Blooglet { variant }, x, y);
        }
        15 | 16 => {
            ctx.spawn(code, SpawnKind::MapCliff { variant: code - 15 }, x, y);
        }
        24 => {
            lumps.mark(Ck6Lump::Molly);
            ctx.spawn(code, SpawnKind::Molly, x, y);
        }
        25 => ctx.set_scroll_block(x, y, true),
        26 => ctx.set_scroll_block(x, y, false),
        27..=30 => {
            let direction = code - 27;
            ctx.spawn(code, SpawnKind::AxisPlatform { direction, purple: false }, x, y);
            lumps.mark(Ck6Lump::Platform);
        }
        32 => {
            ctx.spawn(code, SpawnKind::FallPlatform, x, y);
            lumps.mark(Ck6Lump::Platform);
        }
        33..=35 => {
            if standing_platform_allowed(code - 33, ctx.difficulty()) {
                ctx.spawn(code, SpawnKind::StandPlatform, x, y);
                lumps.mark(Ck6Lump::Platform);
            }
        }
        36..=39 => {
            let direction = code - 36;
            ctx.spawn(code, SpawnKind::GoPlatform { direction, purple: false }, x, y);
            lumps.mark(Ck6Lump::Platform);
            lumps.mark(Ck6Lump::PlatBip);
        }
        40 => {
            ctx.spawn(code, SpawnKind::SneakPlatform, x, y);
            lumps.mark(Ck6Lump::Platform);
        }
        44 | 45 => {
            ctx.spawn(code, SpawnKind::SatelliteLoading { variant: code - 44 }, x, y);
        }
        53..=56 => {
            lumps.mark(Ck6Lump::Turret);
            ctx.spawn(code, SpawnKind::Turret { direction: code - 53 }, x, y);
        }
        57..=69 => {
            let item = if code == 69 {
                if ctx.game.num_shots >= 5 {
                    return;
                }
                68 - 57
            } else {
                code - 57
            };
            ctx.spawn(code, SpawnKind::Item { item }, x, y);
            lumps.mark(ITEM_LUMPS[item as usize]);
        }
        88 => {
            ctx.spawn(code, SpawnKind::Grabbiter, x, y);
        }
        89 => {
            ctx.spawn(code, SpawnKind::Satellite, x, y);
        }
        99 => {
            lumps.mark(Ck6Lump::Rope);
            ctx.spawn(code, SpawnKind::Rope, x, y);
        }
        100 => {
            lumps.mark(Ck6Lump::Sandwich);
            ctx.spawn(code, SpawnKind::Sandwich, x, y);
        }
        101 => {
            lumps.mark(Ck6Lump::Passcard);
            ctx.spawn(code, SpawnKind::Passcard, x, y);
        }
        105 => {
            ctx.spawn(code, SpawnKind::Rocket { variant: 0 }, x, y);
        }
        _ => {}
    }
}
