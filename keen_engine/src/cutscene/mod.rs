//! Scripted sequences that take over the screen: the Keen 5 ending and
//! the story dialogs of both episodes.
//!
//! Each sequence drives the host directly and blocks until it is done,
//! pumping input once per frame.

pub mod dialog;
pub mod galaxy;

pub use dialog::{fuse_message, story_item_dialog, StoryItem};
pub use galaxy::{advance_stars, step_star, ExplosionOutcome, GalaxyExplosion, Phase};
