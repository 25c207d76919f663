//! Collaborator traits for the subsystems the engine drives but does not
//! own: the graphics cache, the tile refresh manager, video, input, audio
//! and the physics helpers.
//!
//! Default methods are no-ops so headless hosts only implement what they
//! observe.

use serde::Serialize;

use crate::objects::{GameObject, Hitbox};

pub const SCREEN_WIDTH: i32 = 320;
pub const SCREEN_HEIGHT: i32 = 200;

/// Sixteen EGA colours plus the border colour.
pub type Palette = [u8; 17];

/// Text window handed out by [`Video::center_window`]. Callers adjust the
/// fields before printing into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextWindow {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub print_y: i32,
}

pub trait ChunkCache {
    /// Loads a graphics chunk now.
    fn cache_graphic_chunk(&mut self, chunk: u16);

    /// Flags a graphics chunk for the next [`ChunkCache::cache_marks`].
    fn mark_graphic_chunk(&mut self, chunk: u16);

    fn cache_marks(&mut self) {}

    fn up_level(&mut self) {}

    fn down_level(&mut self) {}

    /// Raw bytes of a loaded chunk.
    fn graphic_chunk(&self, _chunk: u16) -> Option<&[u8]> {
        None
    }

    fn sprite_hitbox(&self, _chunk: u16) -> Option<Hitbox> {
        None
    }
}

pub trait Refresh {
    fn set_scroll_block(&mut self, x: i32, y: i32, vertical: bool);

    /// Tiles changed under the refresh manager's feet.
    fn tiles_replaced(&mut self, _x: i32, _y: i32, _width: u16, _height: u16) {}
}

pub trait Video {
    fn present(&mut self);
    fn delay_tics(&mut self, tics: u32);
    fn clear_screen(&mut self, color: u8);
    fn bar(&mut self, x: i32, y: i32, width: i32, height: i32, color: u8);
    /// Plots one pixel; off-screen coordinates are clipped.
    fn plot(&mut self, x: i32, y: i32, color: u8);
    fn draw_bitmap(&mut self, x: i32, y: i32, chunk: u16);
    fn set_palette(&mut self, palette: &Palette);
    fn set_default_palette(&mut self);
    fn fade_to_black(&mut self) {}
    fn fade_from_black(&mut self) {}
    fn set_scroll_coords(&mut self, _x: i32, _y: i32) {}
    fn center_window(&mut self, width: i32, height: i32) -> TextWindow;
    fn print_centered(&mut self, window: &TextWindow, text: &str);
}

pub trait Input {
    fn pump_events(&mut self);
    fn clear_keys_down(&mut self);
    /// Scan code of the last key pressed since the keys were cleared.
    fn last_scan(&self) -> Option<u8>;
    fn wait_button(&mut self);
    /// Waits up to `tics` for any input. Returns whether input arrived.
    fn user_input(&mut self, tics: u32) -> bool;
}

pub trait Audio {
    fn play_sound(&mut self, sound: u16);
    fn wait_sound_done(&mut self) {}
    fn start_music(&mut self, track: u16);
    fn stop_music(&mut self);
    /// Tic counter running at 70 Hz.
    fn time_count(&self) -> u32;
    /// Called while busy-waiting on the tic counter.
    fn idle(&mut self) {}
}

pub trait Physics {
    fn not_stuck_in_wall(&mut self, _object: &GameObject) -> bool {
        true
    }
}

/// Everything the engine reaches outward for.
pub trait Host: ChunkCache + Refresh + Video + Input + Audio + Physics {}

impl<T> Host for T where T: ChunkCache + Refresh + Video + Input + Audio + Physics {}
