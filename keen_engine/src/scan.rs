//! Info-plane scan driver shared by the episode tables.

use log::{debug, info, warn};
use serde::Serialize;

use crate::actions::ActionTable;
use crate::constants::EpisodeConstants;
use crate::episode::EpisodeId;
use crate::host::Host;
use crate::lumps::{LumpPolicy, LumpTracker};
use crate::objects::{Activity, ObjectId, ObjectPool};
use crate::session::Level;
use crate::spawn::{DropReason, SpawnKind, Spawner};
use crate::state::{Difficulty, GameState};
use keen_formats::Plane;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpawnRecord {
    pub x: i32,
    pub y: i32,
    pub code: u16,
    #[serde(flatten)]
    pub kind: SpawnKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedSpawn {
    #[serde(flatten)]
    pub record: SpawnRecord,
    #[serde(flatten)]
    pub reason: DropReason,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub level: u16,
    /// Music track the level plays, when the episode has one for it.
    pub music: Option<i16>,
    pub spawned: Vec<SpawnRecord>,
    pub dropped: Vec<DroppedSpawn>,
    pub lumps: Vec<usize>,
    pub chunk_requests: usize,
    pub scroll_blocks: usize,
}

/// Mutable view of the session for one scan.
pub struct ScanContext<'a> {
    pub episode: EpisodeId,
    pub game: &'a mut GameState,
    pub constants: &'a EpisodeConstants,
    pub objects: &'a mut ObjectPool,
    pub actions: &'a ActionTable,
    pub level: &'a mut Level,
    pub host: &'a mut dyn Host,
    pub report: ScanReport,
}

impl<'a> ScanContext<'a> {
    pub fn difficulty(&self) -> Difficulty {
        self.game.difficulty
    }

    pub fn spawner(&mut self) -> Spawner<'_> {
        Spawner {
            episode: self.episode,
            demo_playback: self.game.demo_playback,
            constants: self.constants,
            objects: &mut *self.objects,
            actions: self.actions,
            host: &mut *self.host,
        }
    }

    /// Spawns `kind` at the tile and records the outcome.
    pub fn spawn(&mut self, code: u16, kind: SpawnKind, x: i32, y: i32) -> Option<ObjectId> {
        let record = SpawnRecord { x, y, code, kind };
        match self.spawner().spawn(kind, x, y) {
            Ok(id) => {
                self.report.spawned.push(record);
                Some(id)
            }
            Err(reason) => {
                warn!("dropped {kind:?} at ({x}, {y}): {reason:?}");
                self.report.dropped.push(DroppedSpawn { record, reason });
                None
            }
        }
    }

    pub fn set_scroll_block(&mut self, x: i32, y: i32, vertical: bool) {
        self.host.set_scroll_block(x, y, vertical);
        self.report.scroll_blocks += 1;
    }

    /// Flags a single chunk for the next batch load.
    pub fn mark_chunk(&mut self, chunk: u16) {
        self.host.mark_graphic_chunk(chunk);
    }

    /// Every object that is not always active sleeps until it scrolls into
    /// view.
    pub fn deactivate_offscreen(&mut self) {
        for id in self.objects.ids() {
            if let Some(object) = self.objects.get_mut(id) {
                if object.activity != Activity::AlwaysActive {
                    object.activity = Activity::Inactive;
                }
            }
        }
    }

    pub fn resolve_lumps(&mut self, lumps: &LumpTracker, policy: LumpPolicy) {
        self.report.lumps = lumps.marked();
        self.report.chunk_requests = lumps.resolve(&mut *self.host, policy);
    }

    pub fn finish(&self) {
        info!(
            "level {}: spawned {} objects, dropped {}, {} lumps",
            self.report.level,
            self.report.spawned.len(),
            self.report.dropped.len(),
            self.report.lumps.len()
        );
    }
}

/// Calls `visit` for every non-zero info value in row-major order.
pub fn walk_info_plane<F>(ctx: &mut ScanContext<'_>, mut visit: F)
where
    F: FnMut(&mut ScanContext<'_>, i32, i32, u16),
{
    let width = ctx.level.map.width() as i32;
    let height = ctx.level.map.height() as i32;
    for y in 0..height {
        for x in 0..width {
            let code = ctx.level.map.tile(x, y, Plane::Info);
            if code != 0 {
                visit(ctx, x, y, code);
            }
        }
    }
    debug!("walked {width}x{height} info plane");
}

/// A run of info codes placing one entity at rising difficulty: the base
/// code always spawns, `base + stride` needs Normal and `base + 2 * stride`
/// needs Hard.
#[derive(Debug, Clone, Copy)]
pub struct Cascade<E> {
    pub base: u16,
    pub stride: u16,
    pub effect: E,
}

/// Outcome of looking a code up in a cascade table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeHit<E> {
    Spawn(E),
    Gated,
}

const TIER_GATES: [Difficulty; 3] = [Difficulty::NotPlaying, Difficulty::Normal, Difficulty::Hard];

impl<E: Copy> Cascade<E> {
    pub const fn new(base: u16, effect: E) -> Self {
        Cascade {
            base,
            stride: 1,
            effect,
        }
    }

    pub const fn strided(base: u16, stride: u16, effect: E) -> Self {
        Cascade {
            base,
            stride,
            effect,
        }
    }

    fn tier(&self, code: u16) -> Option<usize> {
        let offset = code.checked_sub(self.base)?;
        if offset % self.stride != 0 {
            return None;
        }
        let tier = (offset / self.stride) as usize;
        (tier < TIER_GATES.len()).then_some(tier)
    }

    /// Walks from the tier of `code` down to the base; every gate on the
    /// way has to pass. `None` when `code` is not part of this cascade.
    ///
    /// A failed gate ends the walk with nothing spawned. It does not fall
    /// into the lower code's handler. The DOS level loader reads:
    ///
    /// ```text
    /// case 6:
    ///     if (ck_gameState.difficulty < D_Hard)
    ///         break;
    /// case 5:
    ///     if (ck_gameState.difficulty < D_Normal)
    ///         break;
    /// case 4:
    ///     CK5_SpawnSparky(x, y);
    ///     break;
    /// ```
    ///
    /// so code 6 on Normal places no Sparky at all.
    pub fn resolve(&self, code: u16, difficulty: Difficulty) -> Option<CascadeHit<E>> {
        let tier = self.tier(code)?;
        let blocked = (1..=tier)
            .rev()
            .any(|step| difficulty < TIER_GATES[step]);
        Some(if blocked {
            CascadeHit::Gated
        } else {
            CascadeHit::Spawn(self.effect)
        })
    }
}

pub fn find_cascade<E: Copy>(
    table: &[Cascade<E>],
    code: u16,
    difficulty: Difficulty,
) -> Option<CascadeHit<E>> {
    table.iter().find_map(|cascade| cascade.resolve(code, difficulty))
}

/// Standing platforms gate the other way round: `offset` 0 (the lowest
/// code) only spawns on Easy, 1 up to Normal, 2 always.
pub fn standing_platform_allowed(offset: u16, difficulty: Difficulty) -> bool {
    const CEILINGS: [Difficulty; 2] = [Difficulty::Easy, Difficulty::Normal];
    CEILINGS
        .iter()
        .skip(offset as usize)
        .all(|&ceiling| difficulty <= ceiling)
}
