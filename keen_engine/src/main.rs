use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use keen_formats::{GamePaths, LevelFile, SymbolTable};
use log::info;
use serde::Serialize;

use keen_engine::cli::{self, EndingArgs, RunArgs};
use keen_engine::constants::EpisodeConstants;
use keen_engine::cutscene::{ExplosionOutcome, GalaxyExplosion};
use keen_engine::episode::{self, Episode, EpisodeId, PatchOffsets};
use keen_engine::objects::GameObject;
use keen_engine::recording::{HostEvent, RecordingHost};
use keen_engine::scan::ScanReport;
use keen_engine::session::{Level, Session};
use keen_engine::state::GameState;
use keen_engine::load_action_defs;

#[derive(Serialize)]
struct RunReport<'a> {
    episode: EpisodeId,
    patch_offsets: PatchOffsets,
    constants: &'a EpisodeConstants,
    game: &'a GameState,
    scan: Option<ScanReport>,
    objects: Vec<&'a GameObject>,
    ending: Option<ExplosionOutcome>,
    events: &'a [HostEvent],
}

fn main() -> Result<()> {
    let run = cli::parse()?;
    init_logging(run.verbose);

    let symbols = SymbolTable::from_json_file(&run.symbols)
        .with_context(|| format!("loading symbol table {}", run.symbols.display()))?;
    let action_defs = load_action_defs(&run.actions)
        .with_context(|| format!("loading action table {}", run.actions.display()))?;

    let episode = select_episode(&run)?;
    let mut session =
        Session::activate(episode, &symbols, action_defs).context("activating episode")?;
    session.new_game(run.difficulty);
    if let Some(ammo) = run.ammo {
        session.game.num_shots = ammo;
    }

    let mut host = RecordingHost::new();
    let scan = match &run.level_json {
        Some(path) => Some(scan_level(&mut session, &mut host, path, run.level)?),
        None => None,
    };
    let ending = match &run.ending {
        Some(args) => Some(play_ending(&session, &mut host, args)?),
        None => None,
    };

    if let Some(scan) = &scan {
        println!(
            "level {}: {} spawned, {} dropped, {} lumps, {} chunk requests",
            scan.level,
            scan.spawned.len(),
            scan.dropped.len(),
            scan.lumps.len(),
            scan.chunk_requests
        );
    }
    if let Some(outcome) = &ending {
        println!(
            "ending: {} flash frames, {} explosion frames{}",
            outcome.flash_frames,
            outcome.explode_frames,
            if outcome.skipped { " (skipped)" } else { "" }
        );
    }

    if let Some(path) = &run.report_json {
        let report = RunReport {
            episode: session.episode_id(),
            patch_offsets: session.episode().patch_offsets(),
            constants: session.constants(),
            game: &session.game,
            scan,
            objects: session.objects.iter().map(|(_, object)| object).collect(),
            ending,
            events: host.events(),
        };
        write_report(path, &report)?;
        println!("Saved run report to {}", path.display());
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn select_episode(run: &RunArgs) -> Result<Box<dyn Episode>> {
    let paths = match run.episode {
        Some(id) => run
            .paths
            .clone()
            .with_engine_fallback(&format!("ACTION.{}", id.ext())),
        None => run.paths.clone(),
    };
    let episode = match run.episode {
        Some(id) if run.skip_presence => episode::definition(id, &paths),
        Some(id) => episode::detect(id, &paths)
            .with_context(|| missing_data(&format!("no {id} data"), &paths))?,
        None => episode::detect_any(&paths)
            .with_context(|| missing_data("no Galaxy episode data", &paths))?,
    };
    info!("using {}", episode.id());
    Ok(episode)
}

fn missing_data(what: &str, paths: &GamePaths) -> String {
    format!(
        "{what} found in {} (engine files in {})",
        paths.keen_path().display(),
        paths.omni_path().display()
    )
}

fn scan_level(
    session: &mut Session,
    host: &mut RecordingHost,
    path: &Path,
    number: Option<u16>,
) -> Result<ScanReport> {
    let file = LevelFile::from_json_file(path)?;
    let mut level =
        Level::try_from(file).with_context(|| format!("building level from {}", path.display()))?;
    if let Some(number) = number {
        level.number = number;
    }
    Ok(session.start_level(level, host))
}

fn play_ending(
    session: &Session,
    host: &mut RecordingHost,
    args: &EndingArgs,
) -> Result<ExplosionOutcome> {
    let assets = session
        .constants()
        .ck5()
        .context("the galaxy explosion ending is Keen 5 only")?;
    if let Some(path) = &args.starfield {
        let bytes = fs::read(path)
            .with_context(|| format!("reading starfield chunk {}", path.display()))?;
        host.insert_chunk(assets.galaxy_stars, bytes);
    }
    Ok(GalaxyExplosion::new(assets).run(host))
}

fn write_report(path: &Path, report: &RunReport<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(report).context("serializing run report")?;
    fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;
    Ok(())
}
