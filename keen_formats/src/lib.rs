pub mod fs;
pub mod map;
pub mod starfield;
pub mod symbols;

pub use fs::{GamePaths, adjust_extension, find_case_insensitive};
pub use map::{LevelFile, MapError, MapPlanes, Plane, TileInfo};
pub use starfield::{Star, StarField, StarfieldError};
pub use symbols::{SymbolError, SymbolTable, SymbolValue};
