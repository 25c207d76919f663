use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use keen_formats::GamePaths;

use crate::episode::EpisodeId;
use crate::state::Difficulty;

#[derive(Parser, Debug)]
#[command(
    about = "Headless Galaxy episode host that scans a level and reports what it spawned",
    version
)]
pub struct Args {
    /// Directory holding the episode data (EGAGRAPH, GAMEMAPS, AUDIO)
    #[arg(long, default_value = ".")]
    pub game_path: PathBuf,

    /// Directory holding the engine files (ACTION, headers); defaults to --game-path
    #[arg(long)]
    pub omni_path: Option<PathBuf>,

    /// Directory for user files; defaults to --game-path
    #[arg(long)]
    pub user_path: Option<PathBuf>,

    /// Episode to activate; detected from the data files when omitted
    #[arg(long, value_enum)]
    pub episode: Option<EpisodeId>,

    /// Activate --episode even when its data files are missing
    #[arg(long)]
    pub skip_presence: bool,

    /// Difficulty for the new game
    #[arg(long, value_enum, default_value = "normal")]
    pub difficulty: Difficulty,

    /// Level JSON fixture to scan
    #[arg(long)]
    pub level_json: Option<PathBuf>,

    /// Override the level number stored in --level-json
    #[arg(long)]
    pub level: Option<u16>,

    /// JSON symbol table with chunk numbers and strings
    #[arg(long)]
    pub symbols: PathBuf,

    /// JSON action table
    #[arg(long)]
    pub actions: PathBuf,

    /// Stunner shots Keen starts the level with
    #[arg(long)]
    pub ammo: Option<u16>,

    /// Play the galaxy explosion ending (Keen 5 only)
    #[arg(long)]
    pub ending: bool,

    /// Raw starfield chunk for --ending
    #[arg(long)]
    pub starfield: Option<PathBuf>,

    /// Path to write the run report as JSON
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Log debug output
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub struct RunArgs {
    pub paths: GamePaths,
    pub episode: Option<EpisodeId>,
    pub skip_presence: bool,
    pub difficulty: Difficulty,
    pub level_json: Option<PathBuf>,
    pub level: Option<u16>,
    pub symbols: PathBuf,
    pub actions: PathBuf,
    pub ammo: Option<u16>,
    pub ending: Option<EndingArgs>,
    pub report_json: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug)]
pub struct EndingArgs {
    pub starfield: Option<PathBuf>,
}

pub fn parse() -> Result<RunArgs> {
    let args = Args::parse();
    args.into_run()
}

impl Args {
    pub fn into_run(self) -> Result<RunArgs> {
        if self.skip_presence && self.episode.is_none() {
            bail!("--skip-presence requires --episode");
        }
        if !self.ending && self.starfield.is_some() {
            bail!("--starfield requires --ending");
        }
        if self.level_json.is_none() && !self.ending {
            bail!("nothing to do: pass --level-json and/or --ending");
        }
        if self.level.is_some() && self.level_json.is_none() {
            bail!("--level requires --level-json");
        }
        if self.difficulty == Difficulty::NotPlaying {
            bail!("--difficulty must be easy, normal or hard");
        }

        let omni = self.omni_path.unwrap_or_else(|| self.game_path.clone());
        let user = self.user_path.unwrap_or_else(|| self.game_path.clone());
        let paths = GamePaths::new(self.game_path, omni, user);

        Ok(RunArgs {
            paths,
            episode: self.episode,
            skip_presence: self.skip_presence,
            difficulty: self.difficulty,
            level_json: self.level_json,
            level: self.level,
            symbols: self.symbols,
            actions: self.actions,
            ammo: self.ammo,
            ending: self.ending.then_some(EndingArgs {
                starfield: self.starfield,
            }),
            report_json: self.report_json,
            verbose: self.verbose,
        })
    }
}
