//! Keen 5: The Armageddon Machine.

use keen_formats::{GamePaths, Plane, SymbolTable};
use log::debug;

use super::{required_files_present, Episode, EpisodeId, PatchOffsets};
use crate::actions::{BehaviorRegistry, ThinkContext};
use crate::constants::{
    bind_constants, BindError, Ck5Assets, EpisodeAssets, EpisodeConstants, EpisodeTables,
    CK5_MUSIC,
};
use crate::host::Palette;
use crate::lumps::{LumpPolicy, LumpRange, LumpTracker};
use crate::map_state;
use crate::objects::{tile_to_unit, unit_to_tile, Activity, ClipRect, ObjectId};
use crate::scan::{
    find_cascade, standing_platform_allowed, walk_info_plane, Cascade, CascadeHit, ScanContext,
};
use crate::spawn::{class, DropReason, SliceHeading, SpawnKind, Spawner, Template};
use crate::state::LevelState;

pub const PATCH_OFFSETS: PatchOffsets = PatchOffsets {
    last_level_to_mark_as_done: 17,
    obj_array: 0x9E6F,
    temp_obj: 0xBC3B,
    sprite_array: 0xCD50,
    print_x: 0x9B9F,
    anim_tiles: 0xD4DC,
    anim_tile_size: 4,
    has_creature_question: false,
};

/// Graphics groups the scan can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Ck5Lump {
    Unused = 0,
    Keen,
    Candy,
    Marshmallow,
    Cola,
    Stix,
    SugarStoopies,
    BagOSugar,
    VitalinKeg,
    Gems,
    Stunner,
    PinkShot,
    MapKeen,
    ShikadiMaster,
    Shikadi,
    Shocksund,
    Sphereful,
    Sparky,
    Mine,
    Slicestar,
    RoboRed,
    Spirogrip,
    Ampton,
    VolteFace,
    PurplePlat,
    Spindred,
    Shelley,
    RedPlat,
    UnusedRedPlat,
    Keycard,
    Korath,
    QedFuse,
    QedExplosion,
    Teleporter,
}

impl From<Ck5Lump> for usize {
    fn from(lump: Ck5Lump) -> usize {
        lump as usize
    }
}

const fn lump(start: u16, end: u16) -> LumpRange {
    LumpRange::new(start, end)
}

pub static LUMPS: [LumpRange; 34] = [
    LumpRange::EMPTY,
    lump(0x6C, 0xCE),
    lump(0xD2, 0xD3),
    lump(0xD4, 0xD5),
    lump(0xD6, 0xD7),
    lump(0xD8, 0xD9),
    lump(0xDA, 0xDB),
    lump(0xDC, 0xDD),
    lump(0xDE, 0xDF),
    lump(0xE0, 0xE8),
    lump(0xE9, 0xEA),
    lump(0xEC, 0xF1),
    lump(0xF2, 0x11A),
    lump(0x130, 0x13F),
    lump(0x140, 0x150),
    lump(0x151, 0x165),
    lump(0x166, 0x16D),
    lump(0x16E, 0x179),
    lump(0x17A, 0x180),
    lump(0x181, 0x182),
    lump(0x183, 0x188),
    lump(0x189, 0x194),
    lump(0x195, 0x1A0),
    lump(0x1A1, 0x1A5),
    lump(0x1A6, 0x1A7),
    lump(0x1A8, 0x1AB),
    lump(0x1AC, 0x1BD),
    lump(0x1BE, 0x1BE),
    lump(0x1BF, 0x1BF),
    lump(0xCF, 0xD1),
    lump(0x126, 0x12F),
    lump(0x11B, 0x11D),
    lump(0x11E, 0x121),
    lump(0x122, 0x125),
];

/// Lump for each pickup, by item number.
const ITEM_LUMPS: [Ck5Lump; 12] = [
    Ck5Lump::Gems,
    Ck5Lump::Gems,
    Ck5Lump::Gems,
    Ck5Lump::Gems,
    Ck5Lump::Candy,
    Ck5Lump::Marshmallow,
    Ck5Lump::Cola,
    Ck5Lump::Stix,
    Ck5Lump::SugarStoopies,
    Ck5Lump::BagOSugar,
    Ck5Lump::VitalinKeg,
    Ck5Lump::Stunner,
];

/// Chunk marked directly whenever Keen or the score box is placed.
const SCORE_BOX_CHUNK: u16 = 0xEB;

const KEYCARD_ITEM: u16 = 12;
const QED_LEVEL: u16 = 12;
const QED_FUSES: u16 = 4;

const STAR_WARS_PALETTE: Palette = [
    0x00, 0x01, 0x18, 0x1E, 0x1F, 0x1C, 0x06, 0x07, 0x13, 0x13, 0x13, 0x13, 0x13, 0x13, 0x13,
    0x13, 0x00,
];
const TERMINATOR_PALETTE1: Palette = [
    0, 4, 4, 0x1c, 1, 1, 1, 1, 0x11, 0x11, 0x11, 0x11, 0x13, 0x13, 0x13, 0x13, 0,
];
const TERMINATOR_PALETTE2: Palette = [
    0, 4, 4, 0x1c, 1, 1, 1, 1, 0x11, 0x11, 0x11, 0x11, 0x13, 0x13, 0x13, 4, 0,
];
const ITEM_SOUNDS: [u16; 13] = [19, 19, 19, 19, 8, 8, 8, 8, 8, 8, 17, 9, 55];
const LEVEL_MUSIC: [i16; 20] = [11, 5, 7, 9, 10, 9, 10, 9, 10, 9, 10, 3, 13, 4, 12, 2, 6, 1, 0, 8];

#[derive(Debug, Clone, Copy)]
struct Placement {
    kind: SpawnKind,
    lump: Ck5Lump,
}

const fn place(kind: SpawnKind, lump: Ck5Lump) -> Placement {
    Placement { kind, lump }
}

const CASCADES: [Cascade<Placement>; 19] = [
    Cascade::new(4, place(SpawnKind::Sparky, Ck5Lump::Sparky)),
    Cascade::new(7, place(SpawnKind::Mine, Ck5Lump::Mine)),
    Cascade::new(
        10,
        place(SpawnKind::Slicestar { heading: SliceHeading::North }, Ck5Lump::Slicestar),
    ),
    Cascade::new(13, place(SpawnKind::RoboRed, Ck5Lump::RoboRed)),
    Cascade::new(16, place(SpawnKind::Spirogrip, Ck5Lump::Spirogrip)),
    Cascade::new(
        19,
        place(SpawnKind::Slicestar { heading: SliceHeading::Diagonal }, Ck5Lump::Slicestar),
    ),
    Cascade::new(
        22,
        place(SpawnKind::Slicestar { heading: SliceHeading::East }, Ck5Lump::Slicestar),
    ),
    Cascade::new(42, place(SpawnKind::Ampton, Ck5Lump::Ampton)),
    Cascade::strided(45, 4, place(SpawnKind::Turret { direction: 0 }, Ck5Lump::PinkShot)),
    Cascade::strided(46, 4, place(SpawnKind::Turret { direction: 1 }, Ck5Lump::PinkShot)),
    Cascade::strided(47, 4, place(SpawnKind::Turret { direction: 2 }, Ck5Lump::PinkShot)),
    Cascade::strided(48, 4, place(SpawnKind::Turret { direction: 3 }, Ck5Lump::PinkShot)),
    Cascade::new(71, place(SpawnKind::VolteFace, Ck5Lump::VolteFace)),
    Cascade::new(74, place(SpawnKind::Shelley, Ck5Lump::Shelley)),
    Cascade::new(77, place(SpawnKind::Spindred, Ck5Lump::Spindred)),
    Cascade::new(88, place(SpawnKind::ShikadiMaster, Ck5Lump::ShikadiMaster)),
    Cascade::new(99, place(SpawnKind::Shikadi, Ck5Lump::Shikadi)),
    Cascade::new(102, place(SpawnKind::Shocksund, Ck5Lump::Shocksund)),
    Cascade::new(105, place(SpawnKind::Sphereful, Ck5Lump::Sphereful)),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keen5;

impl Episode for Keen5 {
    fn id(&self) -> EpisodeId {
        EpisodeId::Ck5
    }

    fn patch_offsets(&self) -> PatchOffsets {
        PATCH_OFFSETS
    }

    fn is_present(&self, paths: &GamePaths) -> bool {
        required_files_present(paths, EpisodeId::Ck5.ext())
    }

    fn setup_functions(&self, registry: &mut BehaviorRegistry) {
        registry.add_think("CK5_PurpleAxisPlatform", purple_axis_platform);
        registry.add_think("CK5_LevelEnd", level_end);
    }

    fn define_constants(&self, symbols: &SymbolTable) -> Result<EpisodeConstants, BindError> {
        let tables = EpisodeTables {
            with_keycard: true,
            full_texts: true,
            music: Some(CK5_MUSIC),
            star_wars_palette: STAR_WARS_PALETTE,
            terminator_palette1: TERMINATOR_PALETTE1,
            terminator_palette2: TERMINATOR_PALETTE2,
            item_sounds: &ITEM_SOUNDS,
            level_music: &LEVEL_MUSIC,
        };
        let assets = EpisodeAssets::Ck5(Ck5Assets::bind(symbols)?);
        bind_constants(symbols, &tables, assets)
    }

    fn scan_info_layer(&self, ctx: &mut ScanContext<'_>) {
        if let Some(state) = ctx.game.ck5_mut() {
            state.fuses_remaining = 0;
        }
        let mut lumps = LumpTracker::new(&LUMPS);
        walk_info_plane(ctx, |ctx, x, y, code| place_code(ctx, &mut lumps, x, y, code));

        ctx.deactivate_offscreen();
        ctx.resolve_lumps(&lumps, LumpPolicy::Mark);
        if ctx.level.number == 0 {
            update_elevator_gates(ctx);
        }
    }
}

fn place_code(ctx: &mut ScanContext<'_>, lumps: &mut LumpTracker, x: i32, y: i32, code: u16) {
    if let Some(hit) = find_cascade(&CASCADES, code, ctx.difficulty()) {
        if let CascadeHit::Spawn(placement) = hit {
            ctx.spawn(code, placement.kind, x, y);
            lumps.mark(placement.lump);
        }
        return;
    }

    match code {
        1 | 2 => {
            let facing = if code == 1 { 1 } else { -1 };
            ctx.spawn(code, SpawnKind::Keen { facing }, x, y);
            ctx.spawn(code, SpawnKind::ScoreBox, x, y);
            ctx.mark_chunk(SCORE_BOX_CHUNK);
            lumps.mark(Ck5Lump::Keen);
        }
        3 => {
            ctx.spawn(code, SpawnKind::ScoreBox, x, y);
            ctx.mark_chunk(SCORE_BOX_CHUNK);
            lumps.mark(Ck5Lump::MapKeen);
            if ctx.game.level_state != LevelState::TeleportToKorath {
                ctx.spawn(code, SpawnKind::MapKeen, x, y);
            }
        }
        25 => ctx.set_scroll_block(x, y, true),
        26 => {
            if ctx.game.level_state == LevelState::TeleportToKorath {
                ctx.spawn(code, SpawnKind::MapKeenTeleport, x, y);
            }
        }
        27..=30 => {
            let direction = code - 27;
            ctx.spawn(code, SpawnKind::AxisPlatform { direction, purple: false }, x, y);
            lumps.mark(Ck5Lump::RedPlat);
        }
        32 => {
            ctx.spawn(code, SpawnKind::FallPlatform, x, y);
            lumps.mark(Ck5Lump::RedPlat);
        }
        33..=35 => {
            if standing_platform_allowed(code - 33, ctx.difficulty()) {
                ctx.spawn(code, SpawnKind::StandPlatform, x, y);
                lumps.mark(Ck5Lump::RedPlat);
            }
        }
        36..=39 => {
            let direction = code - 36;
            ctx.spawn(code, SpawnKind::GoPlatform { direction, purple: false }, x, y);
            lumps.mark(Ck5Lump::RedPlat);
        }
        40 => {
            ctx.spawn(code, SpawnKind::SneakPlatform, x, y);
            lumps.mark(Ck5Lump::RedPlat);
        }
        41 => {
            let on_qed = ctx.level.number == QED_LEVEL;
            if let Some(state) = ctx.game.ck5_mut() {
                if on_qed {
                    state.fuses_remaining = QED_FUSES;
                } else {
                    state.fuses_remaining += 1;
                }
            }
            if on_qed {
                ctx.spawn(code, SpawnKind::Qed, x, y);
            }
            lumps.mark(Ck5Lump::QedFuse);
        }
        57..=69 => {
            let item = if code == 69 {
                // Extra stunner only for a player running low.
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
        70 => {
            ctx.spawn(code, SpawnKind::Item { item: KEYCARD_ITEM }, x, y);
            lumps.mark(Ck5Lump::Keycard);
        }
        80..=83 => {
            let direction = code - 80;
            ctx.spawn(code, SpawnKind::GoPlatform { direction, purple: true }, x, y);
            lumps.mark(Ck5Lump::PurplePlat);
        }
        84..=87 => {
            let direction = code - 84;
            ctx.spawn(code, SpawnKind::AxisPlatform { direction, purple: true }, x, y);
            lumps.mark(Ck5Lump::PurplePlat);
        }
        124 => {
            ctx.spawn(code, SpawnKind::Korath, x, y);
            lumps.mark(Ck5Lump::Korath);
        }
        125 => lumps.mark(Ck5Lump::Teleporter),
        _ => {}
    }
}

/// Elevator shaft gates on the Keen 5 world map, chosen from where Keen
/// starts and which fuses are already broken.
fn update_elevator_gates(ctx: &mut ScanContext<'_>) {
    let Some(keen) = ctx.objects.keen().and_then(|id| ctx.objects.get(id)) else {
        return;
    };
    let keen_row = unit_to_tile(keen.pos_y);
    let fuses_broken = [4, 6, 8, 10].iter().all(|&level| ctx.game.level_done(level));
    debug!("world map gates: keen row {keen_row}, fuses broken {fuses_broken}");

    let mut gates: Vec<(i32, i32, bool)> = Vec::new();
    if !(75..=100).contains(&keen_row) {
        gates.push((24, 76, false));
        gates.push((22, 55, true));
    }
    if fuses_broken && keen_row > 39 {
        gates.push((26, 55, true));
    }
    if !(39..=100).contains(&keen_row) {
        gates.push((24, 30, true));
    }

    for (x, y, open) in gates {
        let result = if open {
            map_state::open_map_teleporter(ctx.level, &mut *ctx.host, x, y)
        } else {
            map_state::close_map_teleporter(ctx.level, &mut *ctx.host, x, y)
        };
        if let Err(err) = result {
            debug!("skipping elevator gate at ({x}, {y}): {err}");
        }
    }
}

/// Think of the level-end object: the QED ends the game, anywhere
/// else a fuse just blew.
pub fn level_end(ctx: &mut ThinkContext<'_>, _id: ObjectId) {
    ctx.game.level_state = if ctx.level.number == QED_LEVEL {
        LevelState::DestroyedQed
    } else {
        LevelState::KorathFuse
    };
}

const BLOCKER: u16 = 0x1F;
const PLATFORM_SPEED: i32 = 12;

/// Purple axis platforms bounce between info-plane blockers; a second
/// blocker two tiles past the first stops a vertical one.
pub fn purple_axis_platform(ctx: &mut ThinkContext<'_>, id: ObjectId) {
    if ctx.motion.next_x != 0 || ctx.motion.next_y != 0 {
        return;
    }
    let map = &ctx.level.map;
    let Some(obj) = ctx.objects.get_mut(id) else {
        return;
    };
    let clip = obj.clip_rects;
    ctx.motion.next_x = obj.x_direction * PLATFORM_SPEED * ctx.sprite_sync;
    ctx.motion.next_y = obj.y_direction * PLATFORM_SPEED * ctx.sprite_sync;

    let info = |x: i32, y: i32| map.tile(x, y, Plane::Info);
    if obj.x_direction == 1 {
        let next_unit = (clip.unit_x2 + ctx.motion.next_x) as u16;
        let next_tile = (next_unit >> 8) as i32;
        if clip.tile_x2 != next_tile && info(next_tile, clip.tile_y1) == BLOCKER {
            obj.x_direction = -1;
            ctx.motion.next_x -= (next_unit & 255) as i32;
        }
    } else if obj.x_direction == -1 {
        let next_unit = (clip.unit_x1 + ctx.motion.next_x) as u16;
        let next_tile = (next_unit >> 8) as i32;
        if clip.tile_x1 != next_tile && info(next_tile, clip.tile_y1) == BLOCKER {
            obj.x_direction = 1;
            ctx.motion.next_x += (256 - next_unit as i32) & 255;
        }
    } else if obj.y_direction == 1 {
        let next_unit = (clip.unit_y2 + ctx.motion.next_y) as u16;
        let next_tile = (next_unit >> 8) as i32;
        if clip.tile_y2 != next_tile && info(clip.tile_x1 + 1, next_tile) == BLOCKER {
            if info(clip.tile_x1, next_tile - 2) == BLOCKER {
                obj.visible = true;
                ctx.motion.next_y = 0;
            } else {
                obj.y_direction = -1;
                ctx.motion.next_y -= (next_unit & 255) as i32;
            }
        }
    } else if obj.y_direction == -1 {
        let next_unit = (clip.unit_y1 + ctx.motion.next_y) as u16;
        let next_tile = (next_unit >> 8) as i32;
        if clip.tile_y1 != next_tile && info(clip.tile_x1 + 1, next_tile) == BLOCKER {
            if info(clip.tile_x1, next_tile + 2) == BLOCKER {
                obj.visible = true;
                ctx.motion.next_y = 0;
            } else {
                obj.y_direction = 1;
                ctx.motion.next_y += 256 - (next_unit & 255) as i32;
            }
        }
    }
}

pub const LIGHTNING_H: &str = "CK5_ACT_LightningH0";
pub const LIGHTNING_V: &str = "CK5_ACT_LightningV0";
pub const FUSE_EXPLOSION: &str = "CK5_ACT_FuseExplosion0";
pub const LEVEL_END: &str = "CK5_ACT_LevelEnd";

fn effect(action: &'static str) -> Template {
    Template::actor(class::EFFECT, action)
        .activity(Activity::Inactive)
        .layer(3)
        .unclipped()
        .facing(0, 0)
}

/// Teleporter lightning: a horizontal bolt above Keen and a vertical one
/// covering him.
pub fn spawn_lightning(spawner: &mut Spawner<'_>, keen: ClipRect, sound: u16) -> Vec<ObjectId> {
    let bolts = [
        (
            LIGHTNING_H,
            tile_to_unit(keen.tile_x1) - 0x80,
            tile_to_unit(keen.tile_y2) - 0x500,
        ),
        (
            LIGHTNING_V,
            tile_to_unit(keen.tile_x1),
            tile_to_unit(keen.tile_y1) - 0x80,
        ),
    ];
    let mut spawned = Vec::new();
    for (action, x, y) in bolts {
        let Some(id) = spawner.objects.acquire(true) else {
            continue;
        };
        if spawner.apply(id, &effect(action), x, y).is_ok() {
            spawned.push(id);
        }
    }
    spawner.host.play_sound(sound);
    spawned
}

pub fn spawn_fuse_explosion(
    spawner: &mut Spawner<'_>,
    tile_x: i32,
    tile_y: i32,
    sound: u16,
) -> Option<ObjectId> {
    let spawned = spawner.objects.acquire(true).and_then(|id| {
        spawner
            .apply(
                id,
                &effect(FUSE_EXPLOSION),
                tile_to_unit(tile_x - 1),
                tile_to_unit(tile_y),
            )
            .ok()
            .map(|_| id)
    });
    spawner.host.play_sound(sound);
    spawned
}

pub fn spawn_level_end(spawner: &mut Spawner<'_>) -> Result<ObjectId, DropReason> {
    let id = spawner
        .objects
        .acquire(false)
        .ok_or(DropReason::PoolExhausted)?;
    let template = Template::actor(class::NOTHING, LEVEL_END)
        .activity(Activity::AlwaysActive)
        .unclipped()
        .facing(0, 0);
    spawner.apply(id, &template, 0, 0)?;
    Ok(id)
}

/// Spawns an enemy projectile unless it would start inside a wall.
pub fn spawn_enemy_shot(
    spawner: &mut Spawner<'_>,
    unit_x: i32,
    unit_y: i32,
    action: &'static str,
) -> Result<ObjectId, DropReason> {
    let id = spawner
        .objects
        .acquire(true)
        .ok_or(DropReason::PoolExhausted)?;
    let template = Template::actor(class::ENEMY_SHOT, action)
        .activity(Activity::ExistsOnlyOnscreen)
        .facing(0, 0);
    spawner.apply(id, &template, unit_x, unit_y)?;

    let clear = match spawner.objects.get(id) {
        Some(object) => spawner.host.not_stuck_in_wall(object),
        None => false,
    };
    if !clear {
        spawner.objects.release(id);
        return Err(DropReason::StuckInWall);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use keen_formats::Plane;

    use super::*;
    use crate::actions::Motion;
    use crate::recording::RecordingHost;
    use crate::state::Difficulty;
    use crate::testing;

    #[test]
    fn lump_table_never_reaches_chunk_zero() {
        assert!(LUMPS[0].is_empty());
        for range in &LUMPS[1..] {
            assert!(!range.is_empty());
            assert!(range.start > 0);
        }
        assert_eq!(LUMPS[usize::from(Ck5Lump::Keen)], lump(0x6C, 0xCE));
        assert_eq!(LUMPS[usize::from(Ck5Lump::Teleporter)], lump(0x122, 0x125));
    }

    #[test]
    fn sparky_cascade_follows_difficulty() {
        let mut session = testing::session(EpisodeId::Ck5);
        session.new_game(Difficulty::Normal);
        let mut host = RecordingHost::new();
        let level = testing::level(3, 8, 8, &[(1, 5, 1), (3, 5, 4), (4, 5, 5), (5, 5, 6)]);
        let report = session.start_level(level, &mut host);

        let sparkies = report
            .spawned
            .iter()
            .filter(|record| record.kind == SpawnKind::Sparky)
            .count();
        assert_eq!(sparkies, 2);
        assert_eq!(
            report.lumps,
            vec![usize::from(Ck5Lump::Keen), usize::from(Ck5Lump::Sparky)]
        );
        let marked = host.marked_chunks();
        assert!(marked.contains(&SCORE_BOX_CHUNK));
        assert!(marked.contains(&0x16E));
        assert!(!marked.contains(&0));
    }

    #[test]
    fn objects_sleep_after_the_scan() {
        let mut session = testing::session(EpisodeId::Ck5);
        session.new_game(Difficulty::Hard);
        let mut host = RecordingHost::new();
        let level = testing::level(3, 8, 8, &[(1, 5, 1), (3, 5, 4), (4, 4, 27)]);
        session.start_level(level, &mut host);

        for (_, object) in session.objects.iter() {
            assert!(matches!(
                object.activity,
                Activity::Inactive | Activity::AlwaysActive
            ));
        }
    }

    #[test]
    fn fuses_count_up_except_on_the_qed() {
        let mut session = testing::session(EpisodeId::Ck5);
        session.new_game(Difficulty::Easy);
        let mut host = RecordingHost::new();

        let level = testing::level(3, 8, 8, &[(1, 1, 41), (5, 1, 41)]);
        let report = session.start_level(level, &mut host);
        assert_eq!(session.game.ck5().map(|s| s.fuses_remaining), Some(2));
        assert!(report.spawned.iter().all(|r| r.kind != SpawnKind::Qed));

        let level = testing::level(QED_LEVEL, 8, 8, &[(1, 1, 41)]);
        let report = session.start_level(level, &mut host);
        assert_eq!(session.game.ck5().map(|s| s.fuses_remaining), Some(QED_FUSES));
        assert!(report.spawned.iter().any(|r| r.kind == SpawnKind::Qed));
    }

    #[test]
    fn spare_stunner_only_when_low_on_ammo() {
        let mut session = testing::session(EpisodeId::Ck5);
        session.new_game(Difficulty::Normal);
        let mut host = RecordingHost::new();

        let report = session.start_level(testing::level(2, 4, 4, &[(1, 1, 69)]), &mut host);
        assert!(report.spawned.is_empty());

        session.game.num_shots = 2;
        let report = session.start_level(testing::level(2, 4, 4, &[(1, 1, 69)]), &mut host);
        assert_eq!(report.spawned[0].kind, SpawnKind::Item { item: 11 });
    }

    #[test]
    fn world_map_gates_follow_keen_row() {
        let mut session = testing::session(EpisodeId::Ck5);
        session.new_game(Difficulty::Normal);
        let mut host = RecordingHost::new();
        let mut level = testing::level(0, 30, 80, &[(5, 10, 3)]);
        for (x, tile) in [(10, 77), (11, 78)] {
            if let Some(fg) = level.map.tile_mut(x, 0, Plane::Foreground) {
                *fg = tile;
            }
        }
        session.start_level(level, &mut host);

        let map = &session.level().expect("level loaded").map;
        assert_eq!(map.tile(22, 55, Plane::Foreground), 77);
        assert_eq!(map.tile(23, 55, Plane::Foreground), 78);
        assert_eq!(map.tile(24, 30, Plane::Foreground), 77);
        assert_eq!(map.tile(26, 55, Plane::Foreground), 0);
    }

    #[test]
    fn level_end_picks_the_outcome() {
        let mut session = testing::session(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        session.start_level(testing::level(QED_LEVEL, 4, 4, &[]), &mut host);
        let id = spawn_level_end(&mut session.spawner(&mut host)).unwrap();
        assert!(session.think(id, &mut Motion::default(), 1));
        assert_eq!(session.game.level_state, LevelState::DestroyedQed);

        session.start_level(testing::level(6, 4, 4, &[]), &mut host);
        let id = spawn_level_end(&mut session.spawner(&mut host)).unwrap();
        session.think(id, &mut Motion::default(), 1);
        assert_eq!(session.game.level_state, LevelState::KorathFuse);
    }

    #[test]
    fn purple_platform_bounces_off_blocker() {
        let mut session = testing::session(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        let level = testing::level(4, 8, 8, &[(2, 2, 85), (4, 2, u16::from(BLOCKER))]);
        let report = session.start_level(level, &mut host);
        assert_eq!(report.spawned.len(), 1);

        let (id, _) = session
            .objects
            .iter()
            .find(|(_, object)| object.class == class::PLATFORM)
            .expect("platform spawned");
        let object = session.objects.get_mut(id).unwrap();
        object.clip_rects = ClipRect::from_units(0x240, 0x240, 0x3F8, 0x2C0);

        let mut motion = Motion::default();
        assert!(session.think(id, &mut motion, 2));
        assert_eq!(session.objects.get(id).unwrap().x_direction, -1);
        assert_eq!(motion.next_x, 24 - 0x10);
    }

    #[test]
    fn pending_motion_skips_the_platform_think() {
        let mut session = testing::session(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        session.start_level(testing::level(4, 8, 8, &[(2, 2, 85)]), &mut host);
        let (id, _) = session
            .objects
            .iter()
            .find(|(_, object)| object.class == class::PLATFORM)
            .unwrap();

        let mut motion = Motion { next_x: 5, next_y: 0 };
        session.think(id, &mut motion, 2);
        assert_eq!(motion, Motion { next_x: 5, next_y: 0 });
    }

    #[test]
    fn enemy_shot_in_a_wall_is_released() {
        let mut session = testing::session(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        session.start_level(testing::level(4, 4, 4, &[]), &mut host);
        let before = session.objects.len();

        host.set_walls_stuck(true);
        let result = spawn_enemy_shot(&mut session.spawner(&mut host), 0x100, 0x100, "CK5_ACT_PinkShot0");
        assert_eq!(result, Err(DropReason::StuckInWall));
        assert_eq!(session.objects.len(), before);

        host.set_walls_stuck(false);
        let id = spawn_enemy_shot(&mut session.spawner(&mut host), 0x100, 0x100, "CK5_ACT_PinkShot0")
            .unwrap();
        let shot = session.objects.get(id).unwrap();
        assert_eq!(shot.activity, Activity::ExistsOnlyOnscreen);
        assert_eq!(shot.class, class::ENEMY_SHOT);
    }

    #[test]
    fn lightning_frames_keen() {
        let mut session = testing::session(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        session.start_level(testing::level(0, 4, 4, &[]), &mut host);

        let keen = ClipRect::from_units(0x800, 0xA00, 0x8FF, 0xBFF);
        let bolts = spawn_lightning(&mut session.spawner(&mut host), keen, testing::SOUND_TELEPORT);
        assert_eq!(bolts.len(), 2);

        let h = session.objects.get(bolts[0]).unwrap();
        assert_eq!((h.pos_x, h.pos_y), (0x780, 0xB00 - 0x500));
        assert_eq!(h.z_layer, 3);
        let v = session.objects.get(bolts[1]).unwrap();
        assert_eq!((v.pos_x, v.pos_y), (0x800, 0xA00 - 0x80));
        assert_eq!(host.sounds(), vec![testing::SOUND_TELEPORT]);
    }

    #[test]
    fn fuse_explosion_sits_left_of_the_fuse() {
        let mut session = testing::session(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        session.start_level(testing::level(3, 8, 8, &[]), &mut host);

        let id = spawn_fuse_explosion(&mut session.spawner(&mut host), 5, 3, testing::SOUND_FUSE)
            .unwrap();
        let blast = session.objects.get(id).unwrap();
        assert_eq!((blast.pos_x, blast.pos_y), (tile_to_unit(4), tile_to_unit(3)));
        assert_eq!(blast.class, class::EFFECT);
        assert_eq!(blast.z_layer, 3);
        assert_eq!(host.sounds(), vec![testing::SOUND_FUSE]);
    }

    #[test]
    fn fuse_explosion_still_sounds_with_a_full_pool() {
        let mut session = testing::session(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        session.start_level(testing::level(3, 8, 8, &[]), &mut host);
        while session.objects.acquire(true).is_some() {}
        let before = session.objects.len();

        let result = spawn_fuse_explosion(&mut session.spawner(&mut host), 5, 3, testing::SOUND_FUSE);
        assert_eq!(result, None);
        assert_eq!(session.objects.len(), before);
        assert_eq!(host.sounds(), vec![testing::SOUND_FUSE]);
    }
}
