use std::ops::RangeInclusive;

use log::debug;
use serde::Serialize;

use crate::host::ChunkCache;

/// Inclusive run of graphics chunks belonging to one entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LumpRange {
    pub start: u16,
    pub end: u16,
}

impl LumpRange {
    pub const EMPTY: LumpRange = LumpRange { start: 0, end: 0 };

    pub const fn new(start: u16, end: u16) -> Self {
        LumpRange { start, end }
    }

    /// `(0, 0)` marks an unused slot; it never stands for chunk 0.
    pub fn is_empty(&self) -> bool {
        (self.start == 0 && self.end == 0) || self.end < self.start
    }

    pub fn chunks(&self) -> RangeInclusive<u16> {
        if self.is_empty() {
            // An exhausted inclusive range: yields nothing.
            1..=0
        } else {
            self.start..=self.end
        }
    }
}

/// How needed lumps reach the chunk cache once a scan is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LumpPolicy {
    /// Mark every chunk and let the caller load marks in one batch.
    Mark,
    /// Load every chunk immediately.
    Cache,
}

/// Per-level "needed" flags over an episode's lump table.
#[derive(Debug, Clone)]
pub struct LumpTracker {
    table: &'static [LumpRange],
    needed: Vec<bool>,
}

impl LumpTracker {
    pub fn new(table: &'static [LumpRange]) -> Self {
        LumpTracker {
            table,
            needed: vec![false; table.len()],
        }
    }

    pub fn mark(&mut self, lump: impl Into<usize>) {
        let index = lump.into();
        match self.needed.get_mut(index) {
            Some(flag) => *flag = true,
            None => debug!("ignoring lump {index} outside a table of {}", self.table.len()),
        }
    }

    pub fn is_marked(&self, lump: impl Into<usize>) -> bool {
        self.needed.get(lump.into()).copied().unwrap_or(false)
    }

    /// Indices of every needed lump, in table order.
    pub fn marked(&self) -> Vec<usize> {
        self.needed
            .iter()
            .enumerate()
            .filter_map(|(index, &needed)| needed.then_some(index))
            .collect()
    }

    /// Every chunk covered by a needed lump, each lump's range once.
    pub fn needed_chunks(&self) -> Vec<u16> {
        self.marked()
            .into_iter()
            .flat_map(|index| self.table[index].chunks())
            .collect()
    }

    /// Hands every needed chunk to the cache. Returns the number of chunk
    /// requests issued.
    pub fn resolve<C>(&self, cache: &mut C, policy: LumpPolicy) -> usize
    where
        C: ChunkCache + ?Sized,
    {
        let chunks = self.needed_chunks();
        for &chunk in &chunks {
            match policy {
                LumpPolicy::Mark => cache.mark_graphic_chunk(chunk),
                LumpPolicy::Cache => cache.cache_graphic_chunk(chunk),
            }
        }
        debug!(
            "resolved {} lumps into {} chunk requests ({policy:?})",
            self.marked().len(),
            chunks.len()
        );
        chunks.len()
    }
}
