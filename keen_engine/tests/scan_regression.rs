mod common;

use anyhow::Result;
use keen_engine::episode::ck5::Ck5Lump;
use keen_engine::episode::ck6::Ck6Lump;
use keen_engine::episode::EpisodeId;
use keen_engine::objects::{Activity, MAX_OBJECTS};
use keen_engine::recording::RecordingHost;
use keen_engine::session::Level;
use keen_engine::spawn::{DropReason, SpawnKind};
use keen_engine::state::Difficulty;
use keen_formats::{MapPlanes, Plane, TileInfo};

fn count(report: &keen_engine::ScanReport, kind: SpawnKind) -> usize {
    report.spawned.iter().filter(|record| record.kind == kind).count()
}

#[test]
fn qed_level_resets_fuses_and_spawns_the_qed() -> Result<()> {
    let mut session = common::session(EpisodeId::Ck5)?;
    session.new_game(Difficulty::Normal);
    let mut host = RecordingHost::new();

    let report = session.start_level(common::level("ck5_qed.json")?, &mut host);

    assert_eq!(report.level, 12);
    assert_eq!(report.music, Some(13));
    assert_eq!(count(&report, SpawnKind::Qed), 1);
    assert_eq!(session.game.ck5().map(|state| state.fuses_remaining), Some(4));
    assert_eq!(count(&report, SpawnKind::Sparky), 2, "hard-only sparky gated");
    assert!(report.dropped.is_empty());
    Ok(())
}

#[test]
fn ordinary_level_counts_its_fuses() -> Result<()> {
    let mut session = common::session(EpisodeId::Ck5)?;
    session.new_game(Difficulty::Easy);
    let mut host = RecordingHost::new();

    let report = session.start_level(common::level("ck5_fuses.json")?, &mut host);

    assert_eq!(count(&report, SpawnKind::Qed), 0);
    assert_eq!(session.game.ck5().map(|state| state.fuses_remaining), Some(2));
    assert_eq!(count(&report, SpawnKind::Turret { direction: 0 }), 1);
    Ok(())
}

#[test]
fn harder_difficulty_never_spawns_less() -> Result<()> {
    let mut totals = Vec::new();
    for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
        let mut session = common::session(EpisodeId::Ck5)?;
        session.new_game(difficulty);
        let mut host = RecordingHost::new();
        let report = session.start_level(common::level("ck5_fuses.json")?, &mut host);
        totals.push(count(&report, SpawnKind::Turret { direction: 0 }));
    }
    assert_eq!(totals, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn rescanning_requests_the_same_lumps() -> Result<()> {
    let mut session = common::session(EpisodeId::Ck5)?;
    session.new_game(Difficulty::Hard);

    let mut first_host = RecordingHost::new();
    let first = session.start_level(common::level("ck5_qed.json")?, &mut first_host);
    let mut second_host = RecordingHost::new();
    let second = session.start_level(common::level("ck5_qed.json")?, &mut second_host);

    assert_eq!(first.lumps, second.lumps);
    assert_eq!(first.chunk_requests, second.chunk_requests);
    assert_eq!(first_host.marked_chunks(), second_host.marked_chunks());
    assert!(first.lumps.contains(&usize::from(Ck5Lump::Keen)));
    assert!(first.lumps.contains(&usize::from(Ck5Lump::Sparky)));
    assert!(!first_host.marked_chunks().contains(&0));
    Ok(())
}

#[test]
fn every_object_sleeps_after_the_scan() -> Result<()> {
    let mut session = common::session(EpisodeId::Ck5)?;
    session.new_game(Difficulty::Hard);
    let mut host = RecordingHost::new();
    session.start_level(common::level("ck5_fuses.json")?, &mut host);

    assert!(!session.objects.is_empty());
    for (_, object) in session.objects.iter() {
        assert!(
            matches!(object.activity, Activity::Inactive | Activity::AlwaysActive),
            "{:?} left active",
            object.class
        );
    }
    Ok(())
}

#[test]
fn spawns_follow_plane_order() -> Result<()> {
    let mut session = common::session(EpisodeId::Ck5)?;
    session.new_game(Difficulty::Hard);
    let mut host = RecordingHost::new();
    let level = common::level("ck5_fuses.json")?;
    let width = level.map.width() as i32;
    let report = session.start_level(level, &mut host);

    let offsets: Vec<i32> = report
        .spawned
        .iter()
        .map(|record| record.y * width + record.x)
        .collect();
    let mut sorted = offsets.clone();
    sorted.sort_unstable();
    assert_eq!(offsets, sorted);
    Ok(())
}

#[test]
fn full_pool_drops_the_remaining_spawns() -> Result<()> {
    let mut session = common::session(EpisodeId::Ck5)?;
    session.new_game(Difficulty::Easy);
    let mut host = RecordingHost::new();

    let mut map = MapPlanes::new(20, 8);
    for y in 1..7 {
        for x in 0..20 {
            if let Some(tile) = map.tile_mut(x, y, Plane::Info) {
                *tile = 4;
            }
        }
    }
    if let Some(tile) = map.tile_mut(0, 7, Plane::Info) {
        *tile = 1;
    }
    let report = session.start_level(Level::new(3, map, TileInfo::default()), &mut host);

    // Keen and the score box hold reserved slots.
    let room = MAX_OBJECTS - 2;
    assert_eq!(count(&report, SpawnKind::Sparky), room);
    assert_eq!(report.dropped.len(), 120 - room);
    assert!(report
        .dropped
        .iter()
        .all(|dropped| dropped.reason == DropReason::PoolExhausted));
    assert_eq!(count(&report, SpawnKind::Keen { facing: 1 }), 1);
    assert_eq!(session.objects.len(), MAX_OBJECTS);
    Ok(())
}

#[test]
fn keen6_caches_its_lumps_and_sets_scroll_blocks() -> Result<()> {
    let mut session = common::session(EpisodeId::Ck6)?;
    session.new_game(Difficulty::Normal);
    let mut host = RecordingHost::new();

    let report = session.start_level(common::level("ck6_bloogs.json")?, &mut host);

    assert_eq!(count(&report, SpawnKind::Bloog), 2);
    assert_eq!(report.scroll_blocks, 2);
    assert!(report.lumps.contains(&usize::from(Ck6Lump::Bloog)));
    let cached = host.cached_chunks();
    assert!(!cached.is_empty());
    assert!(!cached.contains(&0));
    assert!(host.marked_chunks().iter().all(|&chunk| chunk != 0));
    Ok(())
}
