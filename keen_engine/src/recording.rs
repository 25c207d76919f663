use std::collections::HashMap;

use serde::Serialize;

use crate::host::{
    Audio, ChunkCache, Input, Palette, Physics, Refresh, TextWindow, Video, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};
use crate::objects::{GameObject, Hitbox};

const ANY_KEY_SCAN: u8 = 0x39;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    CacheChunk { chunk: u16 },
    MarkChunk { chunk: u16 },
    CacheMarks,
    UpLevel,
    DownLevel,
    ScrollBlock { x: i32, y: i32, vertical: bool },
    TilesReplaced { x: i32, y: i32, width: u16, height: u16 },
    Present,
    Delay { tics: u32 },
    ClearScreen { color: u8 },
    DrawBitmap { x: i32, y: i32, chunk: u16 },
    SetPalette { palette: Vec<u8> },
    DefaultPalette,
    FadeToBlack,
    FadeFromBlack,
    ScrollCoords { x: i32, y: i32 },
    Window { width: i32, height: i32 },
    Print { text: String, print_y: i32 },
    ClearKeys,
    WaitButton,
    UserInput { tics: u32 },
    PlaySound { sound: u16 },
    WaitSoundDone,
    StartMusic { track: u16 },
    StopMusic,
}

/// Headless host that records every outward call and renders plots into
/// an in-memory 320x200 framebuffer. Bars and plots are not recorded as
/// events.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    events: Vec<HostEvent>,
    pixels: Vec<u8>,
    chunks: HashMap<u16, Vec<u8>>,
    hitboxes: HashMap<u16, Hitbox>,
    walls_stuck: bool,
    clock: u32,
    pumps: usize,
    key_after_pumps: Option<usize>,
    key_down: bool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        RecordingHost {
            events: Vec::new(),
            pixels: vec![0; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
            chunks: HashMap::new(),
            hitboxes: HashMap::new(),
            walls_stuck: false,
            clock: 0,
            pumps: 0,
            key_after_pumps: None,
            key_down: false,
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn insert_chunk(&mut self, chunk: u16, data: Vec<u8>) {
        self.chunks.insert(chunk, data);
    }

    pub fn insert_hitbox(&mut self, chunk: u16, hitbox: Hitbox) {
        self.hitboxes.insert(chunk, hitbox);
    }

    /// Makes every stuck-in-wall probe fail.
    pub fn set_walls_stuck(&mut self, stuck: bool) {
        self.walls_stuck = stuck;
    }

    /// Reports a key press once `pumps` input pumps have happened since the
    /// keys were last cleared.
    pub fn press_key_after(&mut self, pumps: usize) {
        self.key_after_pumps = Some(pumps);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        Some(self.pixels[(y * SCREEN_WIDTH + x) as usize])
    }

    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&color| color != 0).count()
    }

    pub fn cached_chunks(&self) -> Vec<u16> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::CacheChunk { chunk } => Some(*chunk),
                _ => None,
            })
            .collect()
    }

    pub fn marked_chunks(&self) -> Vec<u16> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::MarkChunk { chunk } => Some(*chunk),
                _ => None,
            })
            .collect()
    }

    pub fn sounds(&self) -> Vec<u16> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::PlaySound { sound } => Some(*sound),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &HostEvent) -> usize {
        self.events.iter().filter(|event| *event == wanted).count()
    }
}

impl ChunkCache for RecordingHost {
    fn cache_graphic_chunk(&mut self, chunk: u16) {
        self.events.push(HostEvent::CacheChunk { chunk });
    }

    fn mark_graphic_chunk(&mut self, chunk: u16) {
        self.events.push(HostEvent::MarkChunk { chunk });
    }

    fn cache_marks(&mut self) {
        self.events.push(HostEvent::CacheMarks);
    }

    fn up_level(&mut self) {
        self.events.push(HostEvent::UpLevel);
    }

    fn down_level(&mut self) {
        self.events.push(HostEvent::DownLevel);
    }

    fn graphic_chunk(&self, chunk: u16) -> Option<&[u8]> {
        self.chunks.get(&chunk).map(Vec::as_slice)
    }

    fn sprite_hitbox(&self, chunk: u16) -> Option<Hitbox> {
        self.hitboxes.get(&chunk).copied()
    }
}

impl Refresh for RecordingHost {
    fn set_scroll_block(&mut self, x: i32, y: i32, vertical: bool) {
        self.events.push(HostEvent::ScrollBlock { x, y, vertical });
    }

    fn tiles_replaced(&mut self, x: i32, y: i32, width: u16, height: u16) {
        self.events.push(HostEvent::TilesReplaced {
            x,
            y,
            width,
            height,
        });
    }
}

impl Video for RecordingHost {
    fn present(&mut self) {
        self.events.push(HostEvent::Present);
    }

    fn delay_tics(&mut self, tics: u32) {
        self.clock = self.clock.wrapping_add(tics);
        self.events.push(HostEvent::Delay { tics });
    }

    fn clear_screen(&mut self, color: u8) {
        self.pixels.iter_mut().for_each(|pixel| *pixel = color);
        self.events.push(HostEvent::ClearScreen { color });
    }

    fn bar(&mut self, x: i32, y: i32, width: i32, height: i32, color: u8) {
        for py in y.max(0)..(y + height).min(SCREEN_HEIGHT) {
            for px in x.max(0)..(x + width).min(SCREEN_WIDTH) {
                self.pixels[(py * SCREEN_WIDTH + px) as usize] = color;
            }
        }
    }

    fn plot(&mut self, x: i32, y: i32, color: u8) {
        if x < 0 || y < 0 || x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return;
        }
        self.pixels[(y * SCREEN_WIDTH + x) as usize] = color;
    }

    fn draw_bitmap(&mut self, x: i32, y: i32, chunk: u16) {
        self.events.push(HostEvent::DrawBitmap { x, y, chunk });
    }

    fn set_palette(&mut self, palette: &Palette) {
        self.events.push(HostEvent::SetPalette {
            palette: palette.to_vec(),
        });
    }

    fn set_default_palette(&mut self) {
        self.events.push(HostEvent::DefaultPalette);
    }

    fn fade_to_black(&mut self) {
        self.events.push(HostEvent::FadeToBlack);
    }

    fn fade_from_black(&mut self) {
        self.events.push(HostEvent::FadeFromBlack);
    }

    fn set_scroll_coords(&mut self, x: i32, y: i32) {
        self.events.push(HostEvent::ScrollCoords { x, y });
    }

    fn center_window(&mut self, width: i32, height: i32) -> TextWindow {
        self.events.push(HostEvent::Window { width, height });
        // 8x8 text cells centred on a 40x25 cell screen.
        let x = ((40 - width) / 2) * 8;
        let y = ((25 - height) / 2) * 8;
        TextWindow {
            x: x + 8,
            y: y + 8,
            width: (width - 2) * 8,
            height: (height - 2) * 8,
            print_y: y + 8,
        }
    }

    fn print_centered(&mut self, window: &TextWindow, text: &str) {
        self.events.push(HostEvent::Print {
            text: text.to_string(),
            print_y: window.print_y,
        });
    }
}

impl Input for RecordingHost {
    fn pump_events(&mut self) {
        self.pumps += 1;
        if let Some(after) = self.key_after_pumps {
            if self.pumps >= after {
                self.key_down = true;
            }
        }
    }

    fn clear_keys_down(&mut self) {
        self.pumps = 0;
        self.key_down = false;
        self.events.push(HostEvent::ClearKeys);
    }

    fn last_scan(&self) -> Option<u8> {
        self.key_down.then_some(ANY_KEY_SCAN)
    }

    fn wait_button(&mut self) {
        self.events.push(HostEvent::WaitButton);
    }

    fn user_input(&mut self, tics: u32) -> bool {
        self.events.push(HostEvent::UserInput { tics });
        self.clock = self.clock.wrapping_add(tics);
        false
    }
}

impl Audio for RecordingHost {
    fn play_sound(&mut self, sound: u16) {
        self.events.push(HostEvent::PlaySound { sound });
    }

    fn wait_sound_done(&mut self) {
        self.events.push(HostEvent::WaitSoundDone);
    }

    fn start_music(&mut self, track: u16) {
        self.events.push(HostEvent::StartMusic { track });
    }

    fn stop_music(&mut self) {
        self.events.push(HostEvent::StopMusic);
    }

    fn time_count(&self) -> u32 {
        self.clock
    }

    fn idle(&mut self) {
        self.clock = self.clock.wrapping_add(1);
    }
}

impl Physics for RecordingHost {
    fn not_stuck_in_wall(&mut self, _object: &GameObject) -> bool {
        !self.walls_stuck
    }
}
