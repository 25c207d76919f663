use log::{debug, warn};
use serde::Serialize;

use crate::actions::{Action, ActionId};

/// Size of the object pool, Keen and the score box included.
pub const MAX_OBJECTS: usize = 100;

/// World units per tile.
pub const TILE_UNITS: i32 = 256;

pub const fn tile_to_unit(tile: i32) -> i32 {
    tile << 8
}

pub const fn unit_to_tile(unit: i32) -> i32 {
    unit >> 8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId(u16);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Inactive,
    Active,
    AlwaysActive,
    ExistsOnlyOnscreen,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipMode {
    #[default]
    Normal,
    Not,
    Simple,
}

/// Sprite hit box, relative to the object's position, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hitbox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Default for Hitbox {
    fn default() -> Self {
        Hitbox {
            x1: 0,
            y1: 0,
            x2: TILE_UNITS - 1,
            y2: TILE_UNITS - 1,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClipRect {
    pub unit_x1: i32,
    pub unit_y1: i32,
    pub unit_x2: i32,
    pub unit_y2: i32,
    pub unit_x_mid: i32,
    pub tile_x1: i32,
    pub tile_y1: i32,
    pub tile_x2: i32,
    pub tile_y2: i32,
    pub tile_x_mid: i32,
}

impl ClipRect {
    pub fn from_units(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let x_mid = (x1 + x2) / 2;
        ClipRect {
            unit_x1: x1,
            unit_y1: y1,
            unit_x2: x2,
            unit_y2: y2,
            unit_x_mid: x_mid,
            tile_x1: unit_to_tile(x1),
            tile_y1: unit_to_tile(y1),
            tile_x2: unit_to_tile(x2),
            tile_y2: unit_to_tile(y2),
            tile_x_mid: unit_to_tile(x_mid),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct GameObject {
    pub class: u16,
    pub activity: Activity,
    pub visible: bool,
    pub clipped: ClipMode,
    pub pos_x: i32,
    pub pos_y: i32,
    pub x_direction: i32,
    pub y_direction: i32,
    pub vel_x: i32,
    pub vel_y: i32,
    pub action: Option<ActionId>,
    pub action_timer: i32,
    pub gfx_chunk: u16,
    pub z_layer: u8,
    pub clip_rects: ClipRect,
    pub old_rects: ClipRect,
    pub user1: i32,
    pub user2: i32,
    pub user3: i32,
    pub user4: i32,
    #[serde(skip)]
    prev: Option<ObjectId>,
    #[serde(skip)]
    next: Option<ObjectId>,
}

impl GameObject {
    /// Switches to `action`, picking the sprite that matches the facing.
    pub fn set_action(&mut self, id: ActionId, action: &Action) {
        self.action = Some(id);
        self.action_timer = 0;
        if action.chunk_right != 0 && self.x_direction > 0 {
            self.gfx_chunk = action.chunk_right;
        } else if action.chunk_left != 0 {
            self.gfx_chunk = action.chunk_left;
        }
        self.visible = true;
    }

    pub fn reset_clip_rects(&mut self, hitbox: Hitbox) {
        self.clip_rects = ClipRect::from_units(
            self.pos_x + hitbox.x1,
            self.pos_y + hitbox.y1,
            self.pos_x + hitbox.x2,
            self.pos_y + hitbox.y2,
        );
        self.old_rects = self.clip_rects;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Free,
    Live,
}

/// Fixed-capacity object pool with a live list in spawn order.
///
/// Slots are handed out from a free stack, so a released slot is the next
/// one reused. Keen always heads the live list once a level has been set
/// up; the score box follows it.
#[derive(Debug, Clone)]
pub struct ObjectPool {
    objects: Vec<GameObject>,
    slots: Vec<Slot>,
    free: Vec<ObjectId>,
    first: Option<ObjectId>,
    last: Option<ObjectId>,
    keen: Option<ObjectId>,
    score_box: Option<ObjectId>,
}

impl Default for ObjectPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectPool {
    pub fn new() -> Self {
        ObjectPool {
            objects: vec![GameObject::default(); MAX_OBJECTS],
            slots: vec![Slot::Free; MAX_OBJECTS],
            free: (0..MAX_OBJECTS as u16).rev().map(ObjectId).collect(),
            first: None,
            last: None,
            keen: None,
            score_box: None,
        }
    }

    /// Empties the pool and reserves the Keen and score box slots.
    pub fn reset_for_level(&mut self) {
        *self = ObjectPool::new();
        self.keen = self.acquire(false);
        self.score_box = self.acquire(false);
    }

    pub fn keen(&self) -> Option<ObjectId> {
        self.keen
    }

    pub fn score_box(&self) -> Option<ObjectId> {
        self.score_box
    }

    /// Takes a zeroed object from the free stack and links it at the end of
    /// the live list. Returns `None` when the pool is exhausted.
    pub fn acquire(&mut self, non_critical: bool) -> Option<ObjectId> {
        let Some(id) = self.free.pop() else {
            if non_critical {
                debug!("object pool exhausted; skipping non-critical object");
            } else {
                warn!("object pool exhausted ({MAX_OBJECTS} objects)");
            }
            return None;
        };

        self.objects[id.index()] = GameObject {
            prev: self.last,
            ..GameObject::default()
        };
        self.slots[id.index()] = Slot::Live;
        match self.last {
            Some(last) => self.objects[last.index()].next = Some(id),
            None => self.first = Some(id),
        }
        self.last = Some(id);
        Some(id)
    }

    /// Unlinks `id` and returns its slot to the free stack. Keen cannot be
    /// released.
    pub fn release(&mut self, id: ObjectId) -> bool {
        if Some(id) == self.keen {
            warn!("refusing to release the player object");
            return false;
        }
        if self.slots.get(id.index()) != Some(&Slot::Live) {
            return false;
        }

        let (prev, next) = {
            let object = &self.objects[id.index()];
            (object.prev, object.next)
        };
        match prev {
            Some(prev) => self.objects[prev.index()].next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => self.objects[next.index()].prev = prev,
            None => self.last = prev,
        }
        if Some(id) == self.score_box {
            self.score_box = None;
        }
        self.slots[id.index()] = Slot::Free;
        self.free.push(id);
        true
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        match self.slots.get(id.index()) {
            Some(Slot::Live) => Some(&self.objects[id.index()]),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        match self.slots.get(id.index()) {
            Some(Slot::Live) => Some(&mut self.objects[id.index()]),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        MAX_OBJECTS - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live object ids in list order.
    pub fn ids(&self) -> Vec<ObjectId> {
        let mut ids = Vec::with_capacity(self.len());
        let mut cursor = self.first;
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.objects[id.index()].next;
        }
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> + '_ {
        self.ids()
            .into_iter()
            .map(move |id| (id, &self.objects[id.index()]))
    }
}
