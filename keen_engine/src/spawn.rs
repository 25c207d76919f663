//! Object spawners used by the info-plane scan and by runtime triggers.
//!
//! Most entities are described by a [`Template`]: class, starting action,
//! activity, draw layer and a position offset from the tile they were
//! placed on. Platforms, pickups, Keen and the score box keep dedicated
//! spawners because they carry extra per-object setup.

use log::warn;
use serde::Serialize;

use crate::actions::ActionTable;
use crate::constants::EpisodeConstants;
use crate::episode::EpisodeId;
use crate::host::Host;
use crate::objects::{tile_to_unit, Activity, ClipMode, ObjectId, ObjectPool};

/// Object class tags.
pub mod class {
    pub const NOTHING: u16 = 0;
    pub const FRIENDLY: u16 = 1;
    pub const PLAYER: u16 = 2;
    pub const STUNNER: u16 = 3;
    pub const ENEMY_SHOT: u16 = 4;
    pub const ITEM: u16 = 5;
    pub const PLATFORM: u16 = 6;
    pub const STUNNED: u16 = 7;
    pub const MAP_FLAG: u16 = 8;
    pub const WALKER: u16 = 9;
    pub const FLYER: u16 = 10;
    pub const HAZARD: u16 = 11;
    pub const TURRET: u16 = 12;
    pub const BOSS: u16 = 13;
    pub const STORY_ITEM: u16 = 14;
    pub const MAP_SCENERY: u16 = 15;
    /// Keen 5 teleport lightning and fuse explosions.
    pub const EFFECT: u16 = 24;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceHeading {
    North,
    East,
    Diagonal,
}

/// Everything the info plane can place in a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnKind {
    Keen { facing: i32 },
    ScoreBox,
    MapKeen,
    AxisPlatform { direction: u16, purple: bool },
    FallPlatform,
    StandPlatform,
    GoPlatform { direction: u16, purple: bool },
    SneakPlatform,
    Turret { direction: u16 },
    Item { item: u16 },
    // Keen 5
    Sparky,
    Mine,
    Slicestar { heading: SliceHeading },
    RoboRed,
    Spirogrip,
    MapKeenTeleport,
    Qed,
    Ampton,
    VolteFace,
    Shelley,
    Spindred,
    ShikadiMaster,
    Shikadi,
    Shocksund,
    Sphereful,
    Korath,
    // Keen 6
    Bloog,
    Blooglet { variant: u16 },
    MapCliff { variant: u16 },
    Fleex,
    Molly,
    Bobba,
    SatelliteLoading { variant: u16 },
    Nospike,
    Gik,
    Orbatrix,
    Bipship,
    Flect,
    Blorb,
    Ceilick,
    Bloogguard,
    Grabbiter,
    Satellite,
    Rope,
    Sandwich,
    Passcard,
    Babobba,
    Rocket { variant: u16 },
}

/// Why a spawn was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    PoolExhausted,
    /// Keen or score box slot not reserved for this level.
    NoReservedSlot,
    MissingAction { name: String },
    UnknownItem { item: u16 },
    StuckInWall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub class: u16,
    pub action: &'static str,
    pub activity: Activity,
    pub z_layer: u8,
    pub offset_x: i32,
    pub offset_y: i32,
    pub x_direction: i32,
    pub y_direction: i32,
    pub clipped: ClipMode,
}

impl Template {
    /// A plain enemy: active, layer 0, placed on its tile, facing right.
    pub const fn actor(class: u16, action: &'static str) -> Self {
        Template {
            class,
            action,
            activity: Activity::Active,
            z_layer: 0,
            offset_x: 0,
            offset_y: 0,
            x_direction: 1,
            y_direction: 1,
            clipped: ClipMode::Normal,
        }
    }

    pub const fn offset(mut self, x: i32, y: i32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    pub const fn facing(mut self, x: i32, y: i32) -> Self {
        self.x_direction = x;
        self.y_direction = y;
        self
    }

    pub const fn layer(mut self, z_layer: u8) -> Self {
        self.z_layer = z_layer;
        self
    }

    pub const fn activity(mut self, activity: Activity) -> Self {
        self.activity = activity;
        self
    }

    pub const fn unclipped(mut self) -> Self {
        self.clipped = ClipMode::Not;
        self
    }
}

/// Unit vector for platform and turret directions (0 up, 1 right, 2 down,
/// 3 left).
pub fn direction_vector(direction: u16) -> (i32, i32) {
    match direction {
        0 => (0, -1),
        1 => (1, 0),
        2 => (0, 1),
        3 => (-1, 0),
        _ => (0, 0),
    }
}

pub const KEEN_STANDING: &str = "CK_ACT_keenStanding";
pub const SCORE_BOX: &str = "CK_ACT_ScoreBox";
pub const DEMO_SIGN: &str = "CK_ACT_DemoSign";
pub const ITEM: &str = "CK_ACT_item";
pub const AXIS_PLATFORM: &str = "CK_ACT_AxisPlatform";

/// Keen's feet rest on the tile below the spawn marker.
const KEEN_SPAWN_LIFT: i32 = 241;

fn purple_axis_action(episode: EpisodeId) -> &'static str {
    match episode {
        EpisodeId::Ck5 => "CK5_ACT_purpleAxisPlatform",
        EpisodeId::Ck6 => "CK6_ACT_purpleAxisPlatform",
    }
}

fn stand_platform_action(episode: EpisodeId) -> &'static str {
    match episode {
        EpisodeId::Ck5 => "CK_ACT_standPlatform",
        EpisodeId::Ck6 => "CK6_ACT_redStandPlatform",
    }
}

/// Template for every kind without a dedicated spawner.
pub fn template(kind: SpawnKind) -> Option<Template> {
    use class::*;
    let template = match kind {
        SpawnKind::MapKeen => Template::actor(PLAYER, "CK_ACT_MapKeenStart")
            .activity(Activity::AlwaysActive)
            .layer(1),
        SpawnKind::FallPlatform => Template::actor(PLATFORM, "CK_ACT_fallPlatSit")
            .activity(Activity::AlwaysActive)
            .facing(0, 0),
        SpawnKind::GoPlatform { direction, purple } => {
            let (dx, dy) = direction_vector(direction);
            let template = if purple {
                Template::actor(PLATFORM, "CK5_ACT_purpleGoPlat").offset(0x40, 0x40)
            } else {
                Template::actor(PLATFORM, "CK_ACT_goPlat")
            };
            template.activity(Activity::AlwaysActive).facing(dx, dy)
        }
        SpawnKind::SneakPlatform => Template::actor(PLATFORM, "CK_ACT_sneakPlatWait")
            .activity(Activity::AlwaysActive)
            .facing(0, 0),
        SpawnKind::Turret { direction } => {
            let (dx, dy) = direction_vector(direction);
            Template::actor(TURRET, "CK_ACT_turretWait")
                .unclipped()
                .facing(dx, dy)
        }
        SpawnKind::Sparky => Template::actor(WALKER, "CK5_ACT_Sparky0").offset(0, -0x100),
        SpawnKind::Mine => Template::actor(HAZARD, "CK5_ACT_Mine").unclipped(),
        SpawnKind::Slicestar { heading } => {
            let (dx, dy, action) = match heading {
                SliceHeading::North => (0, -1, "CK5_ACT_SliceStar0"),
                SliceHeading::East => (1, 0, "CK5_ACT_SliceStar0"),
                SliceHeading::Diagonal => (1, 1, "CK5_ACT_SliceStar2"),
            };
            Template::actor(HAZARD, action).facing(dx, dy)
        }
        SpawnKind::RoboRed => Template::actor(WALKER, "CK5_ACT_Robo0").offset(0, -0x400),
        SpawnKind::Spirogrip => Template::actor(FLYER, "CK5_ACT_SpirogripSpin1").facing(0, -1),
        SpawnKind::MapKeenTeleport => Template::actor(PLAYER, "CK5_ACT_MapKeenTeleport0")
            .activity(Activity::AlwaysActive)
            .layer(3)
            .unclipped(),
        SpawnKind::Qed => Template::actor(BOSS, "CK5_ACT_QED").unclipped(),
        SpawnKind::Ampton => Template::actor(WALKER, "CK5_ACT_AmptonWalk0").offset(0, -0x80),
        SpawnKind::VolteFace => Template::actor(HAZARD, "CK5_ACT_Volte0").unclipped(),
        SpawnKind::Shelley => Template::actor(WALKER, "CK5_ACT_ShellyWalk0"),
        SpawnKind::Spindred => Template::actor(HAZARD, "CK5_ACT_Spindred0").offset(0, -0x80),
        SpawnKind::ShikadiMaster => {
            Template::actor(WALKER, "CK5_ACT_MasterStand0").offset(0, -0x100)
        }
        SpawnKind::Shikadi => Template::actor(WALKER, "CK5_ACT_ShikadiStand0").offset(0, -0x100),
        SpawnKind::Shocksund => Template::actor(WALKER, "CK5_ACT_ShocksundStand0").offset(0, -0x80),
        SpawnKind::Sphereful => Template::actor(FLYER, "CK5_ACT_Sphereful0").layer(1),
        SpawnKind::Korath => Template::actor(WALKER, "CK5_ACT_KorathWalk0").offset(0, -0x80),
        SpawnKind::Bloog => Template::actor(WALKER, "CK6_ACT_BloogWalk0").offset(0, -0x200),
        SpawnKind::Blooglet { .. } => Template::actor(WALKER, "CK6_ACT_BloogletR0").offset(0, -0x80),
        SpawnKind::MapCliff { .. } => Template::actor(MAP_SCENERY, "CK6_ACT_MapCliff0")
            .activity(Activity::AlwaysActive)
            .unclipped(),
        SpawnKind::Fleex => Template::actor(WALKER, "CK6_ACT_FleexWalk0").offset(0, -0x280),
        SpawnKind::Molly => Template::actor(FRIENDLY, "CK6_ACT_Molly0").offset(0, -0x100),
        SpawnKind::Bobba => Template::actor(WALKER, "CK6_ACT_BobbaJump0").offset(0, -0x200),
        SpawnKind::SatelliteLoading { .. } => {
            Template::actor(MAP_SCENERY, "CK6_ACT_SatelliteLoading0")
                .activity(Activity::AlwaysActive)
                .unclipped()
        }
        SpawnKind::Nospike => Template::actor(WALKER, "CK6_ACT_NospikeSit0").offset(0, -0x180),
        SpawnKind::Gik => Template::actor(WALKER, "CK6_ACT_GikWalk0").offset(0, -0x100),
        SpawnKind::Orbatrix => Template::actor(FLYER, "CK6_ACT_OrbatrixFloat0").offset(0, -0x180),
        SpawnKind::Bipship => Template::actor(FLYER, "CK6_ACT_BipshipFly0")
            .offset(0, -0x180)
            .layer(2),
        SpawnKind::Flect => Template::actor(WALKER, "CK6_ACT_FlectStand0").offset(0, -0x100),
        SpawnKind::Blorb => Template::actor(HAZARD, "CK6_ACT_Blorb0")
            .unclipped()
            .facing(1, 1),
        SpawnKind::Ceilick => Template::actor(HAZARD, "CK6_ACT_CeilickWait0"),
        SpawnKind::Bloogguard => Template::actor(WALKER, "CK6_ACT_BloogguardWalk0").offset(0, -0x280),
        SpawnKind::Grabbiter => Template::actor(FRIENDLY, "CK6_ACT_GrabbiterHungry0")
            .activity(Activity::AlwaysActive),
        SpawnKind::Satellite => Template::actor(MAP_SCENERY, "CK6_ACT_Satellite0")
            .activity(Activity::AlwaysActive)
            .unclipped(),
        SpawnKind::Rope => Template::actor(STORY_ITEM, "CK6_ACT_Rope0").layer(2),
        SpawnKind::Sandwich => Template::actor(STORY_ITEM, "CK6_ACT_Sandwich0").layer(2),
        SpawnKind::Passcard => Template::actor(STORY_ITEM, "CK6_ACT_Passcard0").layer(2),
        SpawnKind::Babobba => Template::actor(WALKER, "CK6_ACT_BabobbaSit0").offset(0, -0x100),
        SpawnKind::Rocket { .. } => Template::actor(MAP_SCENERY, "CK6_ACT_Rocket0")
            .activity(Activity::AlwaysActive)
            .unclipped(),
        SpawnKind::Keen { .. }
        | SpawnKind::ScoreBox
        | SpawnKind::AxisPlatform { .. }
        | SpawnKind::StandPlatform
        | SpawnKind::Item { .. } => return None,
    };
    Some(template)
}

/// Extra per-object state a template spawn carries in `user1`.
fn variant(kind: SpawnKind) -> i32 {
    match kind {
        SpawnKind::Turret { direction } => direction as i32,
        SpawnKind::Blooglet { variant }
        | SpawnKind::MapCliff { variant }
        | SpawnKind::SatelliteLoading { variant }
        | SpawnKind::Rocket { variant } => variant as i32,
        _ => 0,
    }
}

/// Every action name a level of `episode` can ask the spawners for.
pub fn required_actions(episode: EpisodeId) -> Vec<&'static str> {
    let mut names = vec![
        KEEN_STANDING,
        SCORE_BOX,
        DEMO_SIGN,
        ITEM,
        AXIS_PLATFORM,
        purple_axis_action(episode),
        stand_platform_action(episode),
    ];
    let kinds: &[SpawnKind] = match episode {
        EpisodeId::Ck5 => &CK5_TEMPLATED,
        EpisodeId::Ck6 => &CK6_TEMPLATED,
    };
    for &kind in kinds {
        if let Some(template) = template(kind) {
            if !names.contains(&template.action) {
                names.push(template.action);
            }
        }
    }
    names
}

const CK5_TEMPLATED: [SpawnKind; 25] = [
    SpawnKind::MapKeen,
    SpawnKind::FallPlatform,
    SpawnKind::GoPlatform { direction: 0, purple: false },
    SpawnKind::GoPlatform { direction: 0, purple: true },
    SpawnKind::SneakPlatform,
    SpawnKind::Turret { direction: 0 },
    SpawnKind::Sparky,
    SpawnKind::Mine,
    SpawnKind::Slicestar { heading: SliceHeading::North },
    SpawnKind::Slicestar { heading: SliceHeading::Diagonal },
    SpawnKind::RoboRed,
    SpawnKind::Spirogrip,
    SpawnKind::MapKeenTeleport,
    SpawnKind::Qed,
    SpawnKind::Ampton,
    SpawnKind::VolteFace,
    SpawnKind::Shelley,
    SpawnKind::Spindred,
    SpawnKind::ShikadiMaster,
    SpawnKind::Shikadi,
    SpawnKind::Shocksund,
    SpawnKind::Sphereful,
    SpawnKind::Korath,
    SpawnKind::Slicestar { heading: SliceHeading::East },
    SpawnKind::Turret { direction: 3 },
];

const CK6_TEMPLATED: [SpawnKind; 29] = [
    SpawnKind::MapKeen,
    SpawnKind::FallPlatform,
    SpawnKind::GoPlatform { direction: 0, purple: false },
    SpawnKind::SneakPlatform,
    SpawnKind::Turret { direction: 0 },
    SpawnKind::Bloog,
    SpawnKind::Blooglet { variant: 0 },
    SpawnKind::MapCliff { variant: 0 },
    SpawnKind::Fleex,
    SpawnKind::Molly,
    SpawnKind::Bobba,
    SpawnKind::SatelliteLoading { variant: 0 },
    SpawnKind::Nospike,
    SpawnKind::Gik,
    SpawnKind::Orbatrix,
    SpawnKind::Bipship,
    SpawnKind::Flect,
    SpawnKind::Blorb,
    SpawnKind::Ceilick,
    SpawnKind::Bloogguard,
    SpawnKind::Grabbiter,
    SpawnKind::Satellite,
    SpawnKind::Rope,
    SpawnKind::Sandwich,
    SpawnKind::Passcard,
    SpawnKind::Babobba,
    SpawnKind::Rocket { variant: 0 },
    SpawnKind::Blooglet { variant: 7 },
    SpawnKind::Turret { direction: 2 },
];

/// Borrowed view of the session that spawners write into.
pub struct Spawner<'a> {
    pub episode: EpisodeId,
    pub demo_playback: bool,
    pub constants: &'a EpisodeConstants,
    pub objects: &'a mut ObjectPool,
    pub actions: &'a ActionTable,
    pub host: &'a mut dyn Host,
}

impl Spawner<'_> {
    pub fn spawn(&mut self, kind: SpawnKind, tile_x: i32, tile_y: i32) -> Result<ObjectId, DropReason> {
        match kind {
            SpawnKind::Keen { facing } => self.spawn_keen(tile_x, tile_y, facing),
            SpawnKind::ScoreBox => self.spawn_score_box(),
            SpawnKind::AxisPlatform { direction, purple } => {
                self.spawn_axis_platform(tile_x, tile_y, direction, purple)
            }
            SpawnKind::StandPlatform => self.spawn_stand_platform(tile_x, tile_y),
            SpawnKind::Item { item } => self.spawn_item(tile_x, tile_y, item),
            SpawnKind::MapKeen | SpawnKind::MapKeenTeleport => {
                self.spawn_map_keen(kind, tile_x, tile_y)
            }
            other => {
                let Some(template) = template(other) else {
                    return Err(DropReason::MissingAction {
                        name: format!("{other:?}"),
                    });
                };
                let id = self.spawn_template(&template, tile_x, tile_y)?;
                if let Some(object) = self.objects.get_mut(id) {
                    object.user1 = variant(other);
                }
                Ok(id)
            }
        }
    }

    /// Acquires an object and applies `template` at the tile position.
    pub fn spawn_template(
        &mut self,
        template: &Template,
        tile_x: i32,
        tile_y: i32,
    ) -> Result<ObjectId, DropReason> {
        let id = self.objects.acquire(false).ok_or(DropReason::PoolExhausted)?;
        self.apply(id, template, tile_to_unit(tile_x), tile_to_unit(tile_y))?;
        Ok(id)
    }

    /// Fills `id` from `template` with its origin at `(unit_x, unit_y)`. On
    /// a missing action the object is released again.
    pub fn apply(
        &mut self,
        id: ObjectId,
        template: &Template,
        unit_x: i32,
        unit_y: i32,
    ) -> Result<(), DropReason> {
        let Some((action_id, action)) = self.actions.find(template.action) else {
            warn!("no action named {}; dropping spawn", template.action);
            self.objects.release(id);
            return Err(DropReason::MissingAction {
                name: template.action.to_string(),
            });
        };
        let hitbox = self.host.sprite_hitbox(action.chunk_left).unwrap_or_default();
        let Some(object) = self.objects.get_mut(id) else {
            self.objects.release(id);
            return Err(DropReason::NoReservedSlot);
        };
        object.class = template.class;
        object.activity = template.activity;
        object.clipped = template.clipped;
        object.z_layer = template.z_layer;
        object.pos_x = unit_x + template.offset_x;
        object.pos_y = unit_y + template.offset_y;
        object.x_direction = template.x_direction;
        object.y_direction = template.y_direction;
        object.set_action(action_id, action);
        object.reset_clip_rects(hitbox);
        Ok(())
    }

    fn spawn_keen(&mut self, tile_x: i32, tile_y: i32, facing: i32) -> Result<ObjectId, DropReason> {
        let id = self.objects.keen().ok_or(DropReason::NoReservedSlot)?;
        let template = Template::actor(class::PLAYER, KEEN_STANDING)
            .activity(Activity::AlwaysActive)
            .layer(1)
            .offset(0, -KEEN_SPAWN_LIFT)
            .facing(facing, 1);
        self.apply(id, &template, tile_to_unit(tile_x), tile_to_unit(tile_y))?;
        Ok(id)
    }

    /// World-map Keen lives in the player slot too.
    fn spawn_map_keen(&mut self, kind: SpawnKind, tile_x: i32, tile_y: i32) -> Result<ObjectId, DropReason> {
        let id = self.objects.keen().ok_or(DropReason::NoReservedSlot)?;
        let template = template(kind).ok_or(DropReason::NoReservedSlot)?;
        self.apply(id, &template, tile_to_unit(tile_x), tile_to_unit(tile_y))?;
        Ok(id)
    }

    fn spawn_score_box(&mut self) -> Result<ObjectId, DropReason> {
        let id = self.objects.score_box().ok_or(DropReason::NoReservedSlot)?;
        let action = if self.demo_playback { DEMO_SIGN } else { SCORE_BOX };
        let template = Template::actor(class::NOTHING, action)
            .activity(Activity::AlwaysActive)
            .layer(3)
            .unclipped()
            .facing(0, 0);
        self.apply(id, &template, 0, 0)?;
        Ok(id)
    }

    fn spawn_axis_platform(
        &mut self,
        tile_x: i32,
        tile_y: i32,
        direction: u16,
        purple: bool,
    ) -> Result<ObjectId, DropReason> {
        let (dx, dy) = direction_vector(direction);
        let mut template = Template::actor(class::PLATFORM, AXIS_PLATFORM)
            .activity(Activity::AlwaysActive)
            .facing(dx, dy);
        if purple {
            template.action = purple_axis_action(self.episode);
            template = template.offset(0x40, 0x40);
        }
        let id = self.spawn_template(&template, tile_x, tile_y)?;
        self.cache_left_frame(id);
        Ok(id)
    }

    fn spawn_stand_platform(&mut self, tile_x: i32, tile_y: i32) -> Result<ObjectId, DropReason> {
        let template = Template::actor(class::PLATFORM, stand_platform_action(self.episode))
            .unclipped()
            .facing(0, 1);
        let id = self.spawn_template(&template, tile_x, tile_y)?;
        if let Some(object) = self.objects.get_mut(id) {
            object.user1 = object.pos_y;
        }
        self.cache_left_frame(id);
        Ok(id)
    }

    /// Platforms always draw their left-facing frame; load it up front.
    fn cache_left_frame(&mut self, id: ObjectId) {
        let chunk = self
            .objects
            .get(id)
            .and_then(|object| object.action)
            .and_then(|action| self.actions.get(action))
            .map(|action| action.chunk_left);
        if let (Some(chunk), Some(object)) = (chunk, self.objects.get_mut(id)) {
            object.gfx_chunk = chunk;
            self.host.cache_graphic_chunk(chunk);
        }
    }

    fn spawn_item(&mut self, tile_x: i32, tile_y: i32, item: u16) -> Result<ObjectId, DropReason> {
        let sprite = self
            .constants
            .sprites
            .for_item(item)
            .ok_or(DropReason::UnknownItem { item })?;
        let template = Template::actor(class::ITEM, ITEM)
            .unclipped()
            .layer(2)
            .facing(0, -1);
        let id = self.spawn_template(&template, tile_x, tile_y)?;
        if let Some(object) = self.objects.get_mut(id) {
            object.user1 = item as i32;
            object.user2 = sprite as i32;
            object.user3 = sprite as i32 + 2;
            object.gfx_chunk = sprite;
        }
        self.host.cache_graphic_chunk(sprite);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingHost;
    use crate::testing;

    #[test]
    fn templated_kinds_have_templates() {
        for kind in CK5_TEMPLATED.iter().chain(CK6_TEMPLATED.iter()) {
            assert!(template(*kind).is_some(), "{kind:?}");
        }
        assert!(template(SpawnKind::Keen { facing: 1 }).is_none());
        assert!(template(SpawnKind::Item { item: 0 }).is_none());
    }

    #[test]
    fn required_actions_are_unique_per_episode() {
        let names = required_actions(EpisodeId::Ck6);
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
        assert!(names.contains(&"CK6_ACT_redStandPlatform"));
        assert!(!names.contains(&"CK5_ACT_QED"));
    }

    #[test]
    fn failed_apply_leaves_the_pool_as_it_was() {
        let mut session = testing::session(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        session.start_level(testing::level(1, 4, 4, &[]), &mut host);
        let template = Template::actor(class::EFFECT, "CK5_ACT_FuseExplosion0");

        let stale = session.objects.acquire(true).unwrap();
        session.objects.release(stale);
        let before = session.objects.len();
        let result = session.spawner(&mut host).apply(stale, &template, 0, 0);
        assert_eq!(result, Err(DropReason::NoReservedSlot));
        assert_eq!(session.objects.len(), before);

        let id = session.objects.acquire(true).unwrap();
        let missing = Template::actor(class::EFFECT, "CK5_ACT_Nowhere");
        let result = session.spawner(&mut host).apply(id, &missing, 0, 0);
        assert!(matches!(result, Err(DropReason::MissingAction { .. })));
        assert_eq!(session.objects.len(), before);
        assert!(session.objects.get(id).is_none());
    }

    #[test]
    fn directions_match_platform_table() {
        assert_eq!(direction_vector(0), (0, -1));
        assert_eq!(direction_vector(1), (1, 0));
        assert_eq!(direction_vector(2), (0, 1));
        assert_eq!(direction_vector(3), (-1, 0));
    }
}
