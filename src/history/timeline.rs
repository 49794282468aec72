//! The timeline engine — interval reasoning over the recorded stays.
//!
//! All queries are pure functions of the stay list plus the time parameters;
//! the [`Timeline`] wrapper re-fetches the full list from the store for every
//! operation and holds no state of its own. Selection uses a deterministic
//! total order: start instant first, then id, so ties on start resolve to the
//! highest id.
//!
//! Boundary semantics are deliberate and uneven:
//!
//! - a stay covers the half-open interval `[start, end)`, so [`current_in`]
//!   excludes a stay whose end equals `now`;
//! - [`at_time_in`] keeps the end boundary *inclusive* (`end >= target`),
//!   matching the recorded behavior for historical lookups;
//! - [`next_in`] uses a strict `start > now`, so a stay starting exactly now
//!   is neither current nor next.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::history::store::HistoryStore;
use crate::history::types::{BlogPost, NewStay, NewTrip, Stay, StayPatch};

/// Fallback for group and country when there is no previous stay to inherit from.
const UNKNOWN: &str = "unknown";

// ── Pure selection over a stay list ──────────────────────────────────────────

/// The stay active right now: started strictly before `now` and not yet ended
/// (`end` is `None` or after `now`). Latest start wins.
pub fn current_in(stays: &[Stay], now: DateTime<Utc>) -> Option<&Stay> {
    stays
        .iter()
        .filter(|s| s.start < now)
        .filter(|s| s.end.is_none_or(|end| now < end))
        .max_by_key(|s| (s.start, s.id))
}

/// The first stay that starts strictly after `now`.
pub fn next_in(stays: &[Stay], now: DateTime<Utc>) -> Option<&Stay> {
    stays
        .iter()
        .filter(|s| s.start > now)
        .min_by_key(|s| (s.start, s.id))
}

/// The stay covering a historical instant. Unlike [`current_in`], a stay whose
/// end equals `target` still counts.
pub fn at_time_in(stays: &[Stay], target: DateTime<Utc>) -> Option<&Stay> {
    stays
        .iter()
        .filter(|s| s.start < target)
        .filter(|s| s.end.is_none_or(|end| end >= target))
        .max_by_key(|s| (s.start, s.id))
}

/// Every stay overlapping the half-open window `[from, to)`, ascending by
/// start. A stay ending exactly at `from` or starting exactly at `to` is out;
/// an open stay is in whenever it starts before `to`. An inverted window
/// (`to <= from`) simply yields nothing.
pub fn period_in(stays: &[Stay], from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Stay> {
    let mut matches: Vec<&Stay> = stays
        .iter()
        .filter(|s| s.start < to)
        .filter(|s| s.end.is_none_or(|end| from < end))
        .collect();
    matches.sort_by_key(|s| (s.start, s.id));
    matches
}

/// The last stay started before `target`, whether or not it has ended.
/// This is the stay a new trip inherits its defaults from.
pub fn previous_in(stays: &[Stay], target: DateTime<Utc>) -> Option<&Stay> {
    stays
        .iter()
        .filter(|s| s.start < target)
        .max_by_key(|s| (s.start, s.id))
}

/// The blog post of the latest-starting stay that has one.
pub fn latest_blog_post_in(stays: &[Stay]) -> Option<&BlogPost> {
    stays
        .iter()
        .filter(|s| s.blog_post.is_some())
        .max_by_key(|s| (s.start, s.id))
        .and_then(|s| s.blog_post.as_ref())
}

// ── Engine over a store ──────────────────────────────────────────────────────

/// Timeline operations over a [`HistoryStore`].
///
/// Each call fetches a fresh snapshot of the stay list; nothing is cached
/// across calls. Concurrent insertions can therefore read overlapping
/// snapshots and compute inconsistent inherited defaults — the engine makes
/// no isolation guarantee across requests.
pub struct Timeline<S> {
    store: S,
}

impl<S: HistoryStore> Timeline<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Every recorded stay, as stored.
    pub fn complete_history(&self) -> Result<Vec<Stay>> {
        self.store.fetch_all()
    }

    /// Where the person is right now, if recorded.
    pub fn current(&self, now: DateTime<Utc>) -> Result<Option<Stay>> {
        let stays = self.store.fetch_all()?;
        Ok(current_in(&stays, now).cloned())
    }

    /// Where the person plans to be next, if they've planned that far ahead.
    pub fn next(&self, now: DateTime<Utc>) -> Result<Option<Stay>> {
        let stays = self.store.fetch_all()?;
        Ok(next_in(&stays, now).cloned())
    }

    /// Where the person was at a particular instant.
    pub fn at_time(&self, target: DateTime<Utc>) -> Result<Option<Stay>> {
        let stays = self.store.fetch_all()?;
        Ok(at_time_in(&stays, target).cloned())
    }

    /// Everywhere the person was during `[from, to)`, in chronological order.
    pub fn period(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Stay>> {
        let stays = self.store.fetch_all()?;
        Ok(period_in(&stays, from, to).into_iter().cloned().collect())
    }

    /// The stay most recently started before `target`, ended or not.
    pub fn previous(&self, target: DateTime<Utc>) -> Result<Option<Stay>> {
        let stays = self.store.fetch_all()?;
        Ok(previous_in(&stays, target).cloned())
    }

    /// The most recent blog post across all stays.
    pub fn latest_blog_post(&self) -> Result<Option<BlogPost>> {
        let stays = self.store.fetch_all()?;
        Ok(latest_blog_post_in(&stays).cloned())
    }

    /// Record a new trip.
    ///
    /// Every open stay that started before the new trip is closed at the new
    /// start — all of them, in case inconsistent data left more than one open.
    /// Inherited defaults come from the previous stay as it looked *before*
    /// the closes, so an inherited country is unaffected by the auto-close.
    /// The close and the insert are separate store writes with no atomicity
    /// across them.
    pub fn add_trip(&self, trip: NewTrip) -> Result<()> {
        let existing = self.store.fetch_all()?;

        for stay in existing
            .iter()
            .filter(|s| s.end.is_none() && s.start < trip.start)
        {
            tracing::debug!(id = stay.id, name = %stay.name, "closing open stay");
            self.store.update_end(stay.id, trip.start)?;
        }

        let previous = previous_in(&existing, trip.start);

        let resolved = NewStay {
            start: trip.start,
            end: trip.end,
            group: trip
                .group
                .or_else(|| previous.map(|p| p.group.clone()))
                .unwrap_or_else(|| UNKNOWN.into()),
            name: trip.name,
            country: trip
                .country
                .or_else(|| previous.map(|p| p.country.clone()))
                .unwrap_or_else(|| UNKNOWN.into()),
            timezone_offset: trip
                .timezone_offset
                .or(previous.map(|p| p.timezone_offset))
                .unwrap_or(0),
        };

        tracing::info!(name = %resolved.name, group = %resolved.group, "adding trip");
        self.store.insert(&resolved)
    }

    /// Apply a partial update to one stay. Returns `Ok(false)` without
    /// touching the store when the id is unknown. Each supplied field is its
    /// own independent write; supplying no fields is a valid no-op that still
    /// reports `Ok(true)`.
    pub fn update_stay(&self, id: i64, patch: StayPatch) -> Result<bool> {
        if self.store.fetch_by_id(id)?.is_none() {
            return Ok(false);
        }

        if let Some(value) = patch.start {
            self.store.update_start(id, value)?;
        }
        if let Some(value) = patch.end {
            self.store.update_end(id, value)?;
        }
        if let Some(value) = &patch.group {
            self.store.update_group(id, value)?;
        }
        if let Some(value) = &patch.name {
            self.store.update_name(id, value)?;
        }
        if let Some(value) = &patch.country {
            self.store.update_country(id, value)?;
        }
        if let Some(value) = patch.timezone_offset {
            self.store.update_timezone(id, value)?;
        }

        Ok(true)
    }

    /// Attach a blog post to a stay. `Ok(false)` when the id is unknown.
    pub fn attach_blog_post(&self, id: i64, url: &str, name: &str) -> Result<bool> {
        if self.store.fetch_by_id(id)?.is_none() {
            return Ok(false);
        }
        self.store.set_blog_post(id, url, name)?;
        Ok(true)
    }

    /// Attach a map image URL to a stay. `Ok(false)` when the id is unknown.
    pub fn attach_map(&self, id: i64, url: &str) -> Result<bool> {
        if self.store.fetch_by_id(id)?.is_none() {
            return Ok(false);
        }
        self.store.set_map_url(id, url)?;
        Ok(true)
    }

    /// Remove the blog post from a stay. `Ok(false)` when the id is unknown.
    pub fn remove_blog_post(&self, id: i64) -> Result<bool> {
        if self.store.fetch_by_id(id)?.is_none() {
            return Ok(false);
        }
        self.store.clear_blog_post(id)?;
        Ok(true)
    }
}
