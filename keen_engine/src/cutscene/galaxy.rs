//! The Keen 5 ending: the galaxy flashes, explodes into a starfield and
//! gives way to the game-over picture.

use keen_formats::{Star, StarField};
use log::{debug, info, warn};
use serde::Serialize;

use crate::constants::Ck5Assets;
use crate::host::{Host, Palette, Video, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Star coordinates are stored in 1/128th of a pixel.
pub const UNITS_PER_PIXEL: u16 = 0x80;

const FLASH: [u8; 18] = [
    0x8, 0x8, 0x7, 0xF, 0x7, 0x8, 0x0, 0x8, 0x7, 0xF, 0x7, 0x8, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0,
];
const BASE_PALETTE: Palette = [
    0x0, 0x1, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F, 0x3,
];
const FLASH_DELAY: u32 = 10;
const EXPLODE_FRAMES: usize = 30;
const HALF_STEP_TICS: u32 = 4;
const STAR_COLOR: u8 = 0xF;
const FINALE_MUSIC: u16 = 18;
const GAME_OVER_X: i32 = 32;
const GAME_OVER_Y: i32 = 80;
const GAME_OVER_WAIT: u32 = 24 * 70;

const MAX_X: u16 = SCREEN_WIDTH as u16 * UNITS_PER_PIXEL;
const MAX_Y: u16 = SCREEN_HEIGHT as u16 * UNITS_PER_PIXEL;

/// Moves `star` by its velocity unless that would leave the screen on
/// either axis, in which case it stays where it is. Returns whether it
/// moved.
pub fn step_star(star: &mut Star) -> bool {
    let x = star.x.wrapping_add_signed(star.dx);
    let y = star.y.wrapping_add_signed(star.dy);
    if x > MAX_X || y > MAX_Y {
        return false;
    }
    star.x = x;
    star.y = y;
    true
}

/// Clears the screen and redraws every star after one step, last star
/// first.
pub fn advance_stars<V: Video + ?Sized>(stars: &mut [Star], video: &mut V) {
    video.bar(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT, 0);
    for star in stars.iter_mut().rev() {
        step_star(star);
        video.plot(
            (star.x / UNITS_PER_PIXEL) as i32,
            (star.y / UNITS_PER_PIXEL) as i32,
            STAR_COLOR,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Intro,
    Flash { frame: usize },
    Detonate,
    Explode { frame: usize },
    Finale,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExplosionOutcome {
    /// A key press cut the animation short.
    pub skipped: bool,
    pub flash_frames: usize,
    pub explode_frames: usize,
}

pub struct GalaxyExplosion<'a> {
    assets: &'a Ck5Assets,
    phase: Phase,
    palette: Palette,
    stars: StarField,
    outcome: ExplosionOutcome,
}

impl<'a> GalaxyExplosion<'a> {
    pub fn new(assets: &'a Ck5Assets) -> Self {
        GalaxyExplosion {
            assets,
            phase: Phase::Intro,
            palette: BASE_PALETTE,
            stars: StarField::from_stars(Vec::new()),
            outcome: ExplosionOutcome {
                skipped: false,
                flash_frames: 0,
                explode_frames: 0,
            },
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    /// Plays the whole sequence.
    pub fn run(mut self, host: &mut dyn Host) -> ExplosionOutcome {
        info!("galaxy explosion starting");
        while self.phase != Phase::Done {
            self.step(host);
        }
        info!(
            "galaxy explosion done after {} flash and {} explosion frames{}",
            self.outcome.flash_frames,
            self.outcome.explode_frames,
            if self.outcome.skipped { " (skipped)" } else { "" }
        );
        self.outcome
    }

    /// Runs the current phase or frame and moves to the next one.
    pub fn step(&mut self, host: &mut dyn Host) -> Phase {
        self.phase = match self.phase {
            Phase::Intro => {
                self.intro(host);
                Phase::Flash { frame: 0 }
            }
            Phase::Flash { frame } if frame >= FLASH.len() => Phase::Detonate,
            Phase::Flash { frame } => self.flash(host, frame),
            Phase::Detonate => {
                host.play_sound(self.assets.sound_explode);
                host.clear_screen(0);
                Phase::Explode { frame: 0 }
            }
            Phase::Explode { frame } if frame >= EXPLODE_FRAMES => Phase::Finale,
            Phase::Explode { frame } => self.explode(host, frame),
            Phase::Finale => {
                self.finale(host);
                Phase::Done
            }
            Phase::Done => Phase::Done,
        };
        self.phase
    }

    fn intro(&mut self, host: &mut dyn Host) {
        host.set_scroll_coords(0, 0);
        host.fade_to_black();
        for chunk in [
            self.assets.milky_way,
            self.assets.galaxy_stars,
            self.assets.game_over,
        ] {
            host.cache_graphic_chunk(chunk);
        }
        self.stars = match host.graphic_chunk(self.assets.galaxy_stars) {
            Some(bytes) => StarField::from_bytes(bytes).unwrap_or_else(|err| {
                warn!("unusable starfield chunk: {err}");
                StarField::from_stars(Vec::new())
            }),
            None => {
                warn!("starfield chunk {} not loaded", self.assets.galaxy_stars);
                StarField::from_stars(Vec::new())
            }
        };
        debug!("loaded {} stars", self.stars.len());

        host.clear_screen(0);
        host.draw_bitmap(0, 0, self.assets.milky_way);
        host.fade_from_black();
        host.clear_keys_down();
        host.play_sound(self.assets.sound_explode_pre);
    }

    fn flash(&mut self, host: &mut dyn Host, frame: usize) -> Phase {
        host.pump_events();
        self.palette[7] = FLASH[frame];
        self.palette[8] = FLASH[frame];
        host.set_palette(&self.palette);
        host.delay_tics(FLASH_DELAY);
        if host.last_scan().is_some() {
            self.outcome.skipped = true;
            return Phase::Finale;
        }
        host.present();
        self.outcome.flash_frames += 1;
        Phase::Flash { frame: frame + 1 }
    }

    fn explode(&mut self, host: &mut dyn Host, frame: usize) -> Phase {
        host.pump_events();
        for _ in 0..2 {
            let last = host.time_count();
            advance_stars(self.stars.stars_mut(), host);
            host.present();
            while host.time_count().wrapping_sub(last) < HALF_STEP_TICS {
                host.idle();
            }
        }
        self.outcome.explode_frames += 1;
        if host.last_scan().is_some() {
            self.outcome.skipped = true;
            return Phase::Finale;
        }
        Phase::Explode { frame: frame + 1 }
    }

    fn finale(&mut self, host: &mut dyn Host) {
        host.clear_screen(0);
        host.set_default_palette();
        host.start_music(FINALE_MUSIC);
        host.draw_bitmap(GAME_OVER_X, GAME_OVER_Y, self.assets.game_over);
        host.present();
        host.user_input(GAME_OVER_WAIT);
        host.stop_music();
    }
}
