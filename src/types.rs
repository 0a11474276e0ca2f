//! Core data types for the glint engine.
//!
//! Tiles come in from the dashboard configuration and are read-only to the
//! engine; the engine derives per-render icon paths and gradient colors and
//! persists attempt/gradient records in its own stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A dashboard tile as supplied by the tile-configuration collaborator.
///
/// The engine never mutates tiles; resolved icon paths and gradient colors
/// are handed back separately as [`TileResources`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    /// Unique tile identifier, also the artifact file stem.
    pub id: String,

    /// Primary link target of the tile.
    pub href: String,

    /// Alternate URL used only for icon discovery, when the page behind
    /// `href` has no usable metadata (for example an SPA behind auth).
    #[serde(default)]
    pub icon_alt_url: Option<String>,

    /// Groups allowed to see this tile. Absent means visible to everyone.
    #[serde(default)]
    pub groups: Option<BTreeSet<String>>,

    /// Ordered category tags for grouping on the dashboard.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Explicit CSS background. When set, gradient computation is disabled
    /// for this tile.
    #[serde(default)]
    pub background: Option<String>,
}

impl Tile {
    /// The URL actually used for icon discovery: the alternate icon URL when
    /// configured, otherwise the tile's href. Attempt records are keyed by
    /// this value.
    pub fn effective_href(&self) -> &str {
        self.icon_alt_url.as_deref().unwrap_or(&self.href)
    }

    /// Whether a user holding `groups` may see this tile. A tile without a
    /// group restriction is visible to everyone.
    pub fn visible_to(&self, groups: &BTreeSet<String>) -> bool {
        match &self.groups {
            None => true,
            Some(required) => required.iter().any(|g| groups.contains(g)),
        }
    }
}

/// Parse a forwarded-auth groups header value of the form
/// `group1,group2,role:role1,...`, dropping `role:` entries.
pub fn parse_auth_groups(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty() && !entry.contains("role:"))
        .map(str::to_string)
        .collect()
}

/// Where a resolved icon came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// An Open-Graph `og:image` meta tag.
    Og,
    /// A `<link rel="icon">` / `<link rel="shortcut icon">` tag.
    RelIcon,
    /// The attempt found no image at all.
    None,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Og => "og",
            SourceKind::RelIcon => "rel-icon",
            SourceKind::None => "none",
        }
    }
}

/// Outcome of the last fetch attempt against a source href.
///
/// One record per href; every new attempt replaces the previous record.
/// A record with `filepath: None` means the attempt failed to find any image
/// and gates the retry-suppression window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub href: String,
    pub last_try: DateTime<Utc>,
    pub filepath: Option<PathBuf>,
    pub source: SourceKind,
}

impl AttemptRecord {
    /// Whole days elapsed since this attempt. The single definition of
    /// attempt age; both the store API and the suppression check use it.
    pub fn age_in_days(&self) -> i64 {
        (Utc::now() - self.last_try).num_days()
    }
}

/// Persisted gradient colors for a tile.
///
/// Once `fixed` is set (or the tile configuration supplies an explicit
/// background) the record is immutable until cleared out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientRecord {
    pub tile_id: String,
    pub left: String,
    pub right: String,
    pub fixed: bool,
}

/// A left/right color pair in `rgba(r,g,b,a)` textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientPair {
    pub left: String,
    pub right: String,
}

/// Everything the engine hands to the rendering collaborator for one tile.
#[derive(Debug, Clone)]
pub struct TileResources {
    pub icon: Option<PathBuf>,
    pub gradient: Option<GradientPair>,
}
