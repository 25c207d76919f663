//! Game data directory handling.
//!
//! Three roots are tracked: the user's copy of the game data, the
//! engine-provided support files (headers, dictionaries, action tables) and
//! a writable user directory for saves and config. DOS-era data is usually
//! shipped in upper case but frequently copied around in lower case, so every
//! lookup matches file names case-insensitively.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePaths {
    keen: PathBuf,
    omni: PathBuf,
    user: PathBuf,
}

impl Default for GamePaths {
    fn default() -> Self {
        GamePaths {
            keen: PathBuf::from("."),
            omni: PathBuf::from("."),
            user: PathBuf::from("."),
        }
    }
}

impl GamePaths {
    pub fn new(
        keen: impl Into<PathBuf>,
        omni: impl Into<PathBuf>,
        user: impl Into<PathBuf>,
    ) -> Self {
        GamePaths {
            keen: keen.into(),
            omni: omni.into(),
            user: user.into(),
        }
    }

    pub fn keen_path(&self) -> &Path {
        &self.keen
    }

    pub fn omni_path(&self) -> &Path {
        &self.omni
    }

    pub fn user_path(&self) -> &Path {
        &self.user
    }

    /// Points the engine root at the executable's directory when `probe`
    /// cannot be found in the configured one.
    pub fn with_engine_fallback(mut self, probe: &str) -> Self {
        if find_case_insensitive(&self.omni, probe).is_some() {
            return self;
        }
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        if let Some(dir) = exe_dir {
            debug!(
                "{} missing from {}; using {} for engine files",
                probe,
                self.omni.display(),
                dir.display()
            );
            self.omni = dir;
        }
        self
    }

    pub fn open_keen_file(&self, file_name: &str) -> Option<File> {
        open_in_dir(&self.keen, file_name)
    }

    /// Engine files are looked up in the game directory first so that mods
    /// can ship their own headers and action tables.
    pub fn open_omni_file(&self, file_name: &str) -> Option<File> {
        open_in_dir(&self.keen, file_name).or_else(|| open_in_dir(&self.omni, file_name))
    }

    pub fn open_user_file(&self, file_name: &str) -> Option<File> {
        open_in_dir(&self.user, file_name)
    }

    /// Truncates an existing file matching `file_name` in any case, or creates
    /// a new one with the name as given.
    pub fn create_user_file(&self, file_name: &str) -> Result<File> {
        let path = find_case_insensitive(&self.user, file_name)
            .unwrap_or_else(|| self.user.join(file_name));
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("creating user file {}", path.display()))
    }

    pub fn is_keen_file_present(&self, file_name: &str) -> bool {
        self.open_keen_file(file_name).is_some()
    }

    pub fn is_omni_file_present(&self, file_name: &str) -> bool {
        self.open_omni_file(file_name).is_some()
    }

    pub fn is_user_file_present(&self, file_name: &str) -> bool {
        self.open_user_file(file_name).is_some()
    }

    pub fn keen_file_size(&self, file_name: &str) -> Option<u64> {
        let file = self.open_keen_file(file_name)?;
        file.metadata().ok().map(|meta| meta.len())
    }

    /// Resolves an engine file to the path that `open_omni_file` would use.
    pub fn resolve_omni_file(&self, file_name: &str) -> Option<PathBuf> {
        find_case_insensitive(&self.keen, file_name)
            .or_else(|| find_case_insensitive(&self.omni, file_name))
    }
}

/// Finds a direct child of `dir` whose name matches `file_name` ignoring
/// ASCII case.
pub fn find_case_insensitive(dir: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.eq_ignore_ascii_case(file_name))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
}

fn open_in_dir(dir: &Path, file_name: &str) -> Option<File> {
    let path = find_case_insensitive(dir, file_name)?;
    File::open(path).ok()
}

/// Swaps the three-character extension of `file_name` for the episode's.
pub fn adjust_extension(file_name: &str, ext: &str) -> String {
    let cut = file_name.len().saturating_sub(3);
    let stem = file_name.get(..cut).unwrap_or(file_name);
    format!("{stem}{ext}")
}
