//! Keen talking-head dialogs shown when a story event happens.

use log::info;
use serde::{Deserialize, Serialize};

use crate::constants::{Ck5Assets, Ck6Assets};
use crate::host::Host;
use crate::state::GameState;

/// Level whose fuse is Korath's.
const KORATH_LEVEL: u16 = 13;

const WINDOW_WIDTH: i32 = 26;
const WINDOW_HEIGHT: i32 = 8;
/// Width of the Keen picture at the right edge of the window.
const PORTRAIT_WIDTH: i32 = 0x30;
const STORY_DELAY: u32 = 30;

/// "Fuse destroyed" message, with Keen giving a thumbs up once the player
/// has read it.
pub fn fuse_message(host: &mut dyn Host, assets: &Ck5Assets, level: u16) {
    host.wait_sound_done();
    host.up_level();
    host.mark_graphic_chunk(assets.keen_talk1);
    host.mark_graphic_chunk(assets.keen_talk2);
    host.cache_marks();

    let mut window = host.center_window(WINDOW_WIDTH, WINDOW_HEIGHT);
    window.width -= PORTRAIT_WIDTH;
    let portrait_x = window.x + window.width;
    host.draw_bitmap(portrait_x, window.y, assets.keen_talk1);
    window.print_y += 0xC;
    let text = if level == KORATH_LEVEL {
        &assets.fuse_destroyed_korath
    } else {
        &assets.fuse_destroyed
    };
    host.print_centered(&window, text);
    host.present();
    host.clear_keys_down();
    host.wait_button();

    host.draw_bitmap(portrait_x, window.y, assets.keen_talk2);
    host.present();
    host.clear_keys_down();
    host.wait_button();
    host.down_level();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryItem {
    Sandwich,
    Rope,
    Passcard,
}

/// Announces a Keen 6 story item and records that Keen has it.
pub fn story_item_dialog(
    host: &mut dyn Host,
    assets: &Ck6Assets,
    game: &mut GameState,
    item: StoryItem,
) {
    host.wait_sound_done();
    host.play_sound(assets.sound_story_item);
    host.up_level();
    host.cache_graphic_chunk(assets.keen_talk1);

    let mut window = host.center_window(WINDOW_WIDTH, WINDOW_HEIGHT);
    host.draw_bitmap(
        window.x + window.width - PORTRAIT_WIDTH,
        window.y,
        assets.keen_talk1,
    );
    window.width -= PORTRAIT_WIDTH;
    let (text, drop) = match item {
        StoryItem::Sandwich => (&assets.get_sandwich, 12),
        StoryItem::Rope => (&assets.get_rope, 12),
        StoryItem::Passcard => (&assets.get_passcard, 4),
    };
    window.print_y += drop;
    host.print_centered(&window, text);
    host.present();

    host.delay_tics(STORY_DELAY);
    host.clear_keys_down();
    host.wait_button();
    host.down_level();

    if let Some(state) = game.ck6_mut() {
        match item {
            StoryItem::Sandwich => state.sandwich = true,
            StoryItem::Rope => state.rope = true,
            StoryItem::Passcard => state.passcard = true,
        }
    }
    info!("picked up {item:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::EpisodeId;
    use crate::recording::{HostEvent, RecordingHost};

    fn ck5_assets() -> Ck5Assets {
        Ck5Assets {
            milky_way: 30,
            galaxy_stars: 31,
            game_over: 32,
            keen_talk1: 33,
            keen_talk2: 34,
            sound_explode_pre: 61,
            sound_explode: 62,
            sound_teleport: 41,
            sound_fuse: 52,
            fuse_destroyed: "Fuse gone.".to_string(),
            fuse_destroyed_korath: "Korath gone.".to_string(),
        }
    }

    fn ck6_assets() -> Ck6Assets {
        Ck6Assets {
            keen_talk1: 33,
            sound_story_item: 0x2D,
            sound_switch: 20,
            get_sandwich: "Sandwich!".to_string(),
            get_rope: "Rope!".to_string(),
            get_passcard: "Passcard!".to_string(),
        }
    }

    #[test]
    fn fuse_message_shows_both_portraits() {
        let mut host = RecordingHost::new();
        fuse_message(&mut host, &ck5_assets(), 4);

        // 26x8 window at (64, 72), 192 wide before the portrait is cut off.
        assert_eq!(
            host.events(),
            &[
                HostEvent::WaitSoundDone,
                HostEvent::UpLevel,
                HostEvent::MarkChunk { chunk: 33 },
                HostEvent::MarkChunk { chunk: 34 },
                HostEvent::CacheMarks,
                HostEvent::Window { width: 26, height: 8 },
                HostEvent::DrawBitmap { x: 208, y: 72, chunk: 33 },
                HostEvent::Print {
                    text: "Fuse gone.".to_string(),
                    print_y: 84
                },
                HostEvent::Present,
                HostEvent::ClearKeys,
                HostEvent::WaitButton,
                HostEvent::DrawBitmap { x: 208, y: 72, chunk: 34 },
                HostEvent::Present,
                HostEvent::ClearKeys,
                HostEvent::WaitButton,
                HostEvent::DownLevel,
            ]
        );
    }

    #[test]
    fn korath_level_has_its_own_text() {
        let mut host = RecordingHost::new();
        fuse_message(&mut host, &ck5_assets(), KORATH_LEVEL);
        let printed = host.events().iter().any(|event| {
            matches!(event, HostEvent::Print { text, .. } if text == "Korath gone.")
        });
        assert!(printed);
    }

    #[test]
    fn story_items_set_their_flags() {
        let assets = ck6_assets();
        let mut game = GameState::new(EpisodeId::Ck6);
        let mut host = RecordingHost::new();

        story_item_dialog(&mut host, &assets, &mut game, StoryItem::Rope);
        let state = game.ck6().unwrap();
        assert!(state.rope);
        assert!(!state.sandwich && !state.passcard);
        assert_eq!(host.sounds(), vec![0x2D]);
        assert_eq!(host.count(&HostEvent::Delay { tics: STORY_DELAY }), 1);

        story_item_dialog(&mut host, &assets, &mut game, StoryItem::Passcard);
        assert!(game.ck6().unwrap().passcard);
        assert_eq!(
            host.count(&HostEvent::Print {
                text: "Passcard!".to_string(),
                print_y: 76
            }),
            1
        );
    }

    #[test]
    fn story_item_on_keen5_state_is_ignored() {
        let mut game = GameState::new(EpisodeId::Ck5);
        let mut host = RecordingHost::new();
        story_item_dialog(&mut host, &ck6_assets(), &mut game, StoryItem::Sandwich);
        assert!(game.ck6().is_none());
        assert_eq!(host.count(&HostEvent::WaitButton), 1);
    }
}
