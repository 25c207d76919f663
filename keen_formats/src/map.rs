use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three tile layers of a Galaxy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plane {
    Background = 0,
    Foreground = 1,
    Info = 2,
}

/// Foreground "misc" values the map-state code cares about. The full set is
/// owned by the collision code; only the values switches react to live here.
pub mod misc {
    pub const DEADLY: u8 = 3;
    pub const INACTIVE_ZAPPER: u8 = 17;
    pub const BRIDGE: u8 = 18;
    pub const ACTIVE_ZAPPER: u8 = 19;
    pub const TELEPORT: u8 = 20;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("{plane:?} plane holds {actual} tiles but a {width}x{height} map needs {expected}")]
    PlaneSize {
        plane: Plane,
        width: u16,
        height: u16,
        expected: usize,
        actual: usize,
    },
    #[error("{width}x{height} block at ({x}, {y}) leaves the {map_width}x{map_height} map")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u16,
        height: u16,
        map_width: u16,
        map_height: u16,
    },
    #[error("replacement block holds {actual} tiles, expected {expected}")]
    BlockSize { expected: usize, actual: usize },
}

/// In-memory tile planes of the current level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPlanes {
    width: u16,
    height: u16,
    planes: [Vec<u16>; 3],
}

impl MapPlanes {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        MapPlanes {
            width,
            height,
            planes: [vec![0; len], vec![0; len], vec![0; len]],
        }
    }

    pub fn from_planes(
        width: u16,
        height: u16,
        background: Vec<u16>,
        foreground: Vec<u16>,
        info: Vec<u16>,
    ) -> Result<Self, MapError> {
        let expected = width as usize * height as usize;
        for (plane, data) in [
            (Plane::Background, &background),
            (Plane::Foreground, &foreground),
            (Plane::Info, &info),
        ] {
            if data.len() != expected {
                return Err(MapError::PlaneSize {
                    plane,
                    width,
                    height,
                    expected,
                    actual: data.len(),
                });
            }
        }
        Ok(MapPlanes {
            width,
            height,
            planes: [background, foreground, info],
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Row-major offset of `(x, y)` within a plane.
    pub fn offset(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Tile at `(x, y)`, or 0 outside the map.
    pub fn tile(&self, x: i32, y: i32, plane: Plane) -> u16 {
        self.get(x, y, plane).unwrap_or(0)
    }

    pub fn get(&self, x: i32, y: i32, plane: Plane) -> Option<u16> {
        let offset = self.offset(x, y)?;
        Some(self.planes[plane as usize][offset])
    }

    pub fn tile_mut(&mut self, x: i32, y: i32, plane: Plane) -> Option<&mut u16> {
        let offset = self.offset(x, y)?;
        Some(&mut self.planes[plane as usize][offset])
    }

    pub fn plane(&self, plane: Plane) -> &[u16] {
        &self.planes[plane as usize]
    }

    pub fn plane_mut(&mut self, plane: Plane) -> &mut [u16] {
        &mut self.planes[plane as usize]
    }

    /// Writes a `width` x `height` block of tiles, row by row, with its top
    /// left corner at `(x, y)`.
    pub fn replace_tiles(
        &mut self,
        tiles: &[u16],
        plane: Plane,
        x: i32,
        y: i32,
        width: u16,
        height: u16,
    ) -> Result<(), MapError> {
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(MapError::BlockSize {
                expected,
                actual: tiles.len(),
            });
        }
        let fits = self.contains(x, y)
            && (width == 0 || self.contains(x + width as i32 - 1, y))
            && (height == 0 || self.contains(x, y + height as i32 - 1));
        if !fits {
            return Err(MapError::OutOfBounds {
                x,
                y,
                width,
                height,
                map_width: self.width,
                map_height: self.height,
            });
        }

        let map_width = self.width as usize;
        let target = &mut self.planes[plane as usize];
        for (row, chunk) in tiles.chunks(width.max(1) as usize).enumerate() {
            let start = (y as usize + row) * map_width + x as usize;
            target[start..start + chunk.len()].copy_from_slice(chunk);
        }
        Ok(())
    }
}

/// Per-tile attribute tables for foreground tiles.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileInfo {
    #[serde(default)]
    pub fore_anim: Vec<i8>,
    #[serde(default)]
    pub fore_misc: Vec<u8>,
}

impl TileInfo {
    /// Signed distance to the next frame of an animated tile; 0 for static
    /// tiles.
    pub fn fore_anim(&self, tile: u16) -> i8 {
        self.fore_anim.get(tile as usize).copied().unwrap_or(0)
    }

    pub fn fore_misc(&self, tile: u16) -> u8 {
        self.fore_misc.get(tile as usize).copied().unwrap_or(0)
    }

    /// The tile that follows `tile` in its animation cycle.
    pub fn next_frame(&self, tile: u16) -> u16 {
        tile.wrapping_add_signed(self.fore_anim(tile) as i16)
    }
}

/// Plain-JSON level dump used by the command line host and the fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelFile {
    pub number: u16,
    pub width: u16,
    pub height: u16,
    pub background: Vec<u16>,
    pub foreground: Vec<u16>,
    pub info: Vec<u16>,
    #[serde(default)]
    pub tileinfo: TileInfo,
}

impl LevelFile {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading level file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing level file {}", path.display()))
    }

    pub fn into_parts(self) -> Result<(u16, MapPlanes, TileInfo), MapError> {
        let planes = MapPlanes::from_planes(
            self.width,
            self.height,
            self.background,
            self.foreground,
            self.info,
        )?;
        Ok((self.number, planes, self.tileinfo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_tiles_writes_rows() {
        let mut map = MapPlanes::new(4, 3);
        map.replace_tiles(&[1, 2, 3, 4], Plane::Foreground, 1, 1, 2, 2)
            .unwrap();

        assert_eq!(map.tile(1, 1, Plane::Foreground), 1);
        assert_eq!(map.tile(2, 1, Plane::Foreground), 2);
        assert_eq!(map.tile(1, 2, Plane::Foreground), 3);
        assert_eq!(map.tile(2, 2, Plane::Foreground), 4);
        assert_eq!(map.tile(0, 0, Plane::Foreground), 0);
        assert!(map.plane(Plane::Info).iter().all(|&tile| tile == 0));
    }

    #[test]
    fn replace_tiles_rejects_blocks_past_the_edge() {
        let mut map = MapPlanes::new(4, 3);
        let err = map
            .replace_tiles(&[1, 2, 3, 4], Plane::Foreground, 3, 0, 2, 2)
            .unwrap_err();
        assert!(matches!(err, MapError::OutOfBounds { x: 3, y: 0, .. }));
    }

    #[test]
    fn from_planes_checks_dimensions() {
        let err = MapPlanes::from_planes(2, 2, vec![0; 4], vec![0; 3], vec![0; 4]).unwrap_err();
        assert_eq!(
            err,
            MapError::PlaneSize {
                plane: Plane::Foreground,
                width: 2,
                height: 2,
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn reads_outside_the_map_are_zero() {
        let map = MapPlanes::new(2, 2);
        assert_eq!(map.tile(-1, 0, Plane::Info), 0);
        assert_eq!(map.get(2, 0, Plane::Info), None);
    }

    #[test]
    fn next_frame_applies_signed_offset() {
        let info = TileInfo {
            fore_anim: vec![0, 1, -1],
            fore_misc: Vec::new(),
        };
        assert_eq!(info.next_frame(1), 2);
        assert_eq!(info.next_frame(2), 1);
        assert_eq!(info.next_frame(0), 0);
        assert_eq!(info.next_frame(40), 40);
    }
}
