//! Tile-level effects of switches and world-map gates.

use keen_formats::map::misc;
use keen_formats::{MapError, Plane};
use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::host::Host;
use crate::objects::ClipRect;
use crate::session::Level;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwitchError {
    #[error("no routing value after switch at ({x}, {y})")]
    MissingRoute { x: i32, y: i32 },
    #[error("zapper at ({x}, {y}) runs off the map")]
    UnterminatedZapper { x: i32, y: i32 },
    #[error(transparent)]
    Map(#[from] MapError),
}

/// What a big switch did at its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SwitchEffect {
    Arrow { x: i32, y: i32, from: u16, to: u16 },
    /// A zapper beam was rewritten over `rows` rows; `was_active` tells
    /// which template set was used.
    Zapper { x: i32, y: i32, rows: i32, was_active: bool },
    Bridge { x: i32, y: i32, tiles: usize },
    Block { x: i32, y: i32, value: u16 },
}

const ARROW_BASE: u16 = 0x5B;
const ARROW_INVERSE: [u16; 8] = [2, 3, 0, 1, 6, 7, 4, 5];
const B_BLOCK_MASK: u16 = 0x1F;

fn replace(
    level: &mut Level,
    host: &mut dyn Host,
    tiles: &[u16],
    x: i32,
    y: i32,
    width: u16,
    height: u16,
) -> Result<(), MapError> {
    level
        .map
        .replace_tiles(tiles, Plane::Foreground, x, y, width, height)?;
    host.tiles_replaced(x, y, width, height);
    Ok(())
}

/// Finds the routing value to the right of a switch: the first non-zero
/// info value at or after `(x + 1, y + 1)`, in plane order. Returns the
/// top-left tile of the switch block and the value.
fn find_route(level: &Level, x: i32, y: i32) -> Result<(i32, i32, u16), SwitchError> {
    let map = &level.map;
    let width = map.width() as usize;
    let start = map
        .offset(x + 1, y + 1)
        .ok_or(SwitchError::MissingRoute { x, y })?;
    let info = map.plane(Plane::Info);
    let (index, value) = info[start..]
        .iter()
        .enumerate()
        .find(|(_, &value)| value != 0)
        .map(|(i, &value)| (start + i, value))
        .ok_or(SwitchError::MissingRoute { x, y })?;
    let origin = index
        .checked_sub(width + 1)
        .ok_or(SwitchError::MissingRoute { x, y })?;
    Ok(((origin % width) as i32, (origin / width) as i32, value))
}

/// Flips a big switch next to `switch` and applies its effect at the tile
/// the switch routes to. `down` picks the block below the rectangle rather
/// than above it.
pub fn toggle_big_switch(
    level: &mut Level,
    host: &mut dyn Host,
    switch: &ClipRect,
    down: bool,
    switch_sound: u16,
) -> Result<SwitchEffect, SwitchError> {
    let ty = if down { switch.tile_y2 } else { switch.tile_y1 - 2 };
    let tx = switch.tile_x1 - 1;
    let (tx, ty, route) = find_route(level, tx, ty)?;

    let mut block = [0u16; 6];
    for y in 0..3 {
        for x in 0..2 {
            let tile = level.map.tile(tx + x, ty + y, Plane::Foreground);
            block[(2 * y + x) as usize] = level.tileinfo.next_frame(tile);
        }
    }
    replace(level, host, &block, tx, ty, 2, 3)?;
    host.play_sound(switch_sound);

    let dest_x = (route >> 8) as i32;
    let dest_y = (route & 0xFF) as i32;
    debug!("switch at ({tx}, {ty}) routes to ({dest_x}, {dest_y})");

    let info = level.map.tile(dest_x, dest_y, Plane::Info);
    if (ARROW_BASE..ARROW_BASE + 8).contains(&info) {
        let to = ARROW_INVERSE[(info - ARROW_BASE) as usize] + ARROW_BASE;
        if let Some(tile) = level.map.tile_mut(dest_x, dest_y, Plane::Info) {
            *tile = to;
        }
        return Ok(SwitchEffect::Arrow {
            x: dest_x,
            y: dest_y,
            from: info,
            to,
        });
    }

    let fore = level.map.tile(dest_x, dest_y, Plane::Foreground);
    match level.tileinfo.fore_misc(fore) & 0x7F {
        misc::ACTIVE_ZAPPER => rewrite_zapper(level, host, dest_x, dest_y, true),
        misc::INACTIVE_ZAPPER => rewrite_zapper(level, host, dest_x, dest_y, false),
        misc::BRIDGE => toggle_bridge(level, host, dest_x, dest_y),
        _ => {
            let tile = level
                .map
                .tile_mut(dest_x, dest_y, Plane::Info)
                .ok_or(SwitchError::MissingRoute { x: dest_x, y: dest_y })?;
            *tile ^= B_BLOCK_MASK;
            Ok(SwitchEffect::Block {
                x: dest_x,
                y: dest_y,
                value: *tile,
            })
        }
    }
}

/// Rewrites a vertical zapper beam from its head down, using the template
/// tiles stored in the top row of the map.
fn rewrite_zapper(
    level: &mut Level,
    host: &mut dyn Host,
    x: i32,
    y: i32,
    active: bool,
) -> Result<SwitchEffect, SwitchError> {
    let first = if active { 0 } else { 3 };
    let [start, mid, end] =
        [first, first + 1, first + 2].map(|tx| level.map.tile(tx, 0, Plane::Foreground));

    replace(level, host, &[start], x, y, 1, 1)?;
    let mut row = y + 1;
    loop {
        if row >= level.map.height() as i32 {
            return Err(SwitchError::UnterminatedZapper { x, y });
        }
        let misc_value = level
            .tileinfo
            .fore_misc(level.map.tile(x, row, Plane::Foreground));
        let continues = if active {
            misc_value == misc::DEADLY
        } else {
            misc_value != misc::INACTIVE_ZAPPER
        };
        if !continues {
            break;
        }
        replace(level, host, &[mid], x, row, 1, 1)?;
        row += 1;
    }
    replace(level, host, &[end], x, row, 1, 1)?;

    Ok(SwitchEffect::Zapper {
        x,
        y,
        rows: row - y + 1,
        was_active: active,
    })
}

/// Advances every animated tile of a two-row bridge to its next frame.
fn toggle_bridge(
    level: &mut Level,
    host: &mut dyn Host,
    x: i32,
    y: i32,
) -> Result<SwitchEffect, SwitchError> {
    let width = level.map.width() as i32;
    let mut tiles = 0;
    for (row, first) in [(y, x), (y + 1, x - 1)] {
        for column in first..width {
            let Some(tile) = level.map.get(column, row, Plane::Foreground) else {
                break;
            };
            if level.tileinfo.fore_anim(tile) == 0 {
                break;
            }
            let next = level.tileinfo.next_frame(tile);
            replace(level, host, &[next], column, row, 1, 1)?;
            tiles += 1;
        }
    }
    Ok(SwitchEffect::Bridge { x, y, tiles })
}

fn copy_gate(
    level: &mut Level,
    host: &mut dyn Host,
    source_x: i32,
    x: i32,
    y: i32,
) -> Result<(), MapError> {
    let mut block = [0u16; 4];
    for row in 0..2 {
        for column in 0..2 {
            block[(row * 2 + column) as usize] =
                level.map.tile(source_x + column, row, Plane::Foreground);
        }
    }
    replace(level, host, &block, x, y, 2, 2)
}

/// Opens a Keen 5 world-map elevator gate at `(x, y)`.
pub fn open_map_teleporter(
    level: &mut Level,
    host: &mut dyn Host,
    x: i32,
    y: i32,
) -> Result<(), MapError> {
    copy_gate(level, host, 10, x, y)
}

pub fn close_map_teleporter(
    level: &mut Level,
    host: &mut dyn Host,
    x: i32,
    y: i32,
) -> Result<(), MapError> {
    copy_gate(level, host, 0, x, y)
}

#[cfg(test)]
mod tests {
    use keen_formats::{MapPlanes, TileInfo};

    use super::*;
    use crate::objects::tile_to_unit;
    use crate::recording::{HostEvent, RecordingHost};

    const SOUND: u16 = 33;
    const WIDTH: u16 = 16;
    const HEIGHT: u16 = 12;

    /// Tiles 100..=105 animate to 110..=115 and back. Tiles 200 and 201 are
    /// the two frames of a bridge, 40..=42 carry zapper misc values.
    fn tileinfo() -> TileInfo {
        let mut info = TileInfo {
            fore_anim: vec![0; 256],
            fore_misc: vec![0; 256],
        };
        for tile in 100..=105 {
            info.fore_anim[tile] = 10;
            info.fore_anim[tile + 10] = -10;
        }
        info.fore_anim[200] = 1;
        info.fore_anim[201] = -1;
        info.fore_misc[200] = misc::BRIDGE;
        info.fore_misc[201] = misc::BRIDGE;
        info.fore_misc[40] = misc::ACTIVE_ZAPPER;
        info.fore_misc[41] = misc::DEADLY;
        info.fore_misc[42] = misc::INACTIVE_ZAPPER;
        info
    }

    /// A switch block at (4, 3) routing to `dest`, flipped by an object
    /// standing below it and one column to the left.
    fn level_with_switch(dest: (u16, u16)) -> (Level, ClipRect) {
        let mut map = MapPlanes::new(WIDTH, HEIGHT);
        for (i, y) in (3..6).enumerate() {
            for x in 0..2 {
                *map.tile_mut(4 + x, y, Plane::Foreground).unwrap() = 100 + 2 * i as u16 + x as u16;
            }
        }
        *map.tile_mut(5, 4, Plane::Info).unwrap() = (dest.0 << 8) | dest.1;
        let level = Level::new(1, map, tileinfo());
        let switch = ClipRect::from_units(
            tile_to_unit(3),
            tile_to_unit(5),
            tile_to_unit(3) + 0xFF,
            tile_to_unit(5) + 0xFF,
        );
        (level, switch)
    }

    #[test]
    fn switch_block_animates_and_plays_sound() {
        let (mut level, switch) = level_with_switch((10, 8));
        let mut host = RecordingHost::new();
        toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap();

        assert_eq!(level.map.tile(4, 3, Plane::Foreground), 110);
        assert_eq!(level.map.tile(5, 5, Plane::Foreground), 115);
        assert_eq!(host.sounds(), vec![SOUND]);
        assert_eq!(
            host.count(&HostEvent::TilesReplaced { x: 4, y: 3, width: 2, height: 3 }),
            1
        );
    }

    #[test]
    fn arrow_turns_around() {
        let (mut level, switch) = level_with_switch((10, 8));
        *level.map.tile_mut(10, 8, Plane::Info).unwrap() = ARROW_BASE + 4;
        let mut host = RecordingHost::new();

        let effect = toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap();
        assert_eq!(
            effect,
            SwitchEffect::Arrow { x: 10, y: 8, from: ARROW_BASE + 4, to: ARROW_BASE + 6 }
        );
        assert_eq!(level.map.tile(10, 8, Plane::Info), ARROW_BASE + 6);
    }

    #[test]
    fn plain_destination_toggles_a_b_block() {
        let (mut level, switch) = level_with_switch((10, 8));
        let mut host = RecordingHost::new();
        toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap();
        assert_eq!(level.map.tile(10, 8, Plane::Info), 0x1F);
        toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap();
        assert_eq!(level.map.tile(10, 8, Plane::Info), 0);
    }

    #[test]
    fn bridge_toggled_twice_is_restored() {
        let (mut level, switch) = level_with_switch((8, 8));
        for x in 8..12 {
            *level.map.tile_mut(x, 8, Plane::Foreground).unwrap() = 200;
        }
        for x in 7..10 {
            *level.map.tile_mut(x, 9, Plane::Foreground).unwrap() = 200;
        }
        let before = level.map.clone();
        let mut host = RecordingHost::new();

        let effect = toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap();
        assert_eq!(effect, SwitchEffect::Bridge { x: 8, y: 8, tiles: 7 });
        assert_eq!(level.map.tile(11, 8, Plane::Foreground), 201);
        assert_eq!(level.map.tile(7, 9, Plane::Foreground), 201);

        let effect = toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap();
        assert_eq!(effect, SwitchEffect::Bridge { x: 8, y: 8, tiles: 7 });
        assert_eq!(
            level.map.plane(Plane::Foreground)[8 * WIDTH as usize..],
            before.plane(Plane::Foreground)[8 * WIDTH as usize..]
        );
    }

    #[test]
    fn active_zapper_is_rewritten_down_the_beam() {
        let (mut level, switch) = level_with_switch((12, 6));
        for (x, tile) in [(0, 50), (1, 51), (2, 52)] {
            *level.map.tile_mut(x, 0, Plane::Foreground).unwrap() = tile;
        }
        *level.map.tile_mut(12, 6, Plane::Foreground).unwrap() = 40;
        for y in 7..10 {
            *level.map.tile_mut(12, y, Plane::Foreground).unwrap() = 41;
        }
        let mut host = RecordingHost::new();

        let effect = toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap();
        assert_eq!(effect, SwitchEffect::Zapper { x: 12, y: 6, rows: 5, was_active: true });
        let column: Vec<u16> = (6..11)
            .map(|y| level.map.tile(12, y, Plane::Foreground))
            .collect();
        assert_eq!(column, vec![50, 51, 51, 51, 52]);
    }

    #[test]
    fn inactive_zapper_without_a_foot_is_an_error() {
        let (mut level, switch) = level_with_switch((12, 6));
        *level.map.tile_mut(12, 6, Plane::Foreground).unwrap() = 42;
        let mut host = RecordingHost::new();

        let err = toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap_err();
        assert_eq!(err, SwitchError::UnterminatedZapper { x: 12, y: 6 });
    }

    #[test]
    fn missing_route_is_reported() {
        let (mut level, switch) = level_with_switch((10, 8));
        *level.map.tile_mut(5, 4, Plane::Info).unwrap() = 0;
        let mut host = RecordingHost::new();

        let err = toggle_big_switch(&mut level, &mut host, &switch, false, SOUND).unwrap_err();
        assert_eq!(err, SwitchError::MissingRoute { x: 2, y: 3 });
        assert!(host.sounds().is_empty());
    }

    #[test]
    fn gates_copy_their_templates() {
        let mut level = Level::new(0, MapPlanes::new(WIDTH, HEIGHT), TileInfo::default());
        for (x, tile) in [(0, 1), (1, 2), (10, 7), (11, 8)] {
            *level.map.tile_mut(x, 0, Plane::Foreground).unwrap() = tile;
        }
        let mut host = RecordingHost::new();

        open_map_teleporter(&mut level, &mut host, 4, 6).unwrap();
        assert_eq!(level.map.tile(4, 6, Plane::Foreground), 7);
        assert_eq!(level.map.tile(5, 6, Plane::Foreground), 8);
        close_map_teleporter(&mut level, &mut host, 4, 6).unwrap();
        assert_eq!(level.map.tile(4, 6, Plane::Foreground), 1);
        assert!(open_map_teleporter(&mut level, &mut host, WIDTH as i32 - 1, 0).is_err());
    }
}
