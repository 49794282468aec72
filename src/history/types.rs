//! Core history type definitions.
//!
//! Defines [`Stay`] (one recorded visit to a location), [`BlogPost`],
//! [`NewTrip`] (an insertion request with inheritable fields), and
//! [`StayPatch`] (a partial field-level update).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded visit to a location.
///
/// A stay covers the half-open interval `[start, end)`. A `None` end means
/// the stay is still open — either ongoing or with an unknown departure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    /// Store-assigned unique id, immutable after insertion.
    pub id: i64,
    /// When the visit began.
    pub start: DateTime<Utc>,
    /// When the visit ended, or `None` while it is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Label for the larger trip this stay belongs to (e.g. "honeymoon").
    pub group: String,
    /// Place name, typically a city.
    pub name: String,
    /// Country the place is in.
    pub country: String,
    /// Offset from UTC in whole hours.
    pub timezone_offset: i32,
    /// Blog post written about this stay, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_post: Option<BlogPost>,
    /// URL for a map image of the stay, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
}

/// Pointer to the blog post about a stay. Both fields are always present
/// together — the store never persists one without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Where the post is hosted.
    pub url: String,
    /// Display name for the post in the front end.
    pub name: String,
}

/// Request to record a new trip.
///
/// `group`, `country`, and `timezone_offset` inherit from the previous stay
/// when absent; absent is distinct from an explicit value throughout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub group: Option<String>,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone_offset: Option<i32>,
}

/// A fully resolved stay ready for insertion; id assignment is the store's job.
#[derive(Debug, Clone)]
pub struct NewStay {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub group: String,
    pub name: String,
    pub country: String,
    pub timezone_offset: i32,
}

/// Partial update for one stay. Only the supplied fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayPatch {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone_offset: Option<i32>,
}
