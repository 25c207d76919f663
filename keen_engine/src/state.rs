use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::episode::EpisodeId;

pub const MAX_LEVELS: usize = 25;

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    NotPlaying,
    Easy,
    Normal,
    Hard,
}

/// Why the play loop stopped (or that it hasn't).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum LevelState {
    #[default]
    Playing = 0,
    Died = 1,
    LevelComplete = 2,
    CouncilRescued = 3,
    AboutToRecordDemo = 4,
    ResetGame = 5,
    LoadedGame = 6,
    Foot = 7,
    AbortGame = 8,
    Sandwich = 9,
    Hook = 10,
    Passcard = 11,
    Molly = 12,
    TeleportToKorath = 13,
    KorathFuse = 14,
    DestroyedQed = 15,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ck5State {
    pub fuses_remaining: u16,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ck6State {
    pub sandwich: bool,
    pub rope: bool,
    pub passcard: bool,
    pub in_rocket: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "episode", rename_all = "snake_case")]
pub enum EpisodeState {
    Ck5(Ck5State),
    Ck6(Ck6State),
}

impl EpisodeState {
    fn for_episode(episode: EpisodeId) -> Self {
        match episode {
            EpisodeId::Ck5 => EpisodeState::Ck5(Ck5State::default()),
            EpisodeId::Ck6 => EpisodeState::Ck6(Ck6State::default()),
        }
    }
}

/// Everything that survives from one level to the next within a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub difficulty: Difficulty,
    pub level_state: LevelState,
    pub current_level: u16,
    pub num_shots: u16,
    pub jump_cheat: bool,
    pub demo_playback: bool,
    pub levels_done: [bool; MAX_LEVELS],
    pub episode: EpisodeState,
}

impl GameState {
    pub fn new(episode: EpisodeId) -> Self {
        GameState {
            difficulty: Difficulty::NotPlaying,
            level_state: LevelState::Playing,
            current_level: 0,
            num_shots: 0,
            jump_cheat: false,
            demo_playback: false,
            levels_done: [false; MAX_LEVELS],
            episode: EpisodeState::for_episode(episode),
        }
    }

    /// Starts a fresh game on the world map.
    pub fn new_game(&mut self, difficulty: Difficulty) {
        let episode = match self.episode {
            EpisodeState::Ck5(_) => EpisodeId::Ck5,
            EpisodeState::Ck6(_) => EpisodeId::Ck6,
        };
        *self = GameState::new(episode);
        self.difficulty = difficulty;
        self.num_shots = 5;
    }

    pub fn ck5(&self) -> Option<&Ck5State> {
        match &self.episode {
            EpisodeState::Ck5(state) => Some(state),
            EpisodeState::Ck6(_) => None,
        }
    }

    pub fn ck5_mut(&mut self) -> Option<&mut Ck5State> {
        match &mut self.episode {
            EpisodeState::Ck5(state) => Some(state),
            EpisodeState::Ck6(_) => None,
        }
    }

    pub fn ck6(&self) -> Option<&Ck6State> {
        match &self.episode {
            EpisodeState::Ck6(state) => Some(state),
            EpisodeState::Ck5(_) => None,
        }
    }

    pub fn ck6_mut(&mut self) -> Option<&mut Ck6State> {
        match &mut self.episode {
            EpisodeState::Ck6(state) => Some(state),
            EpisodeState::Ck5(_) => None,
        }
    }

    pub fn level_done(&self, level: usize) -> bool {
        self.levels_done.get(level).copied().unwrap_or(false)
    }
}
