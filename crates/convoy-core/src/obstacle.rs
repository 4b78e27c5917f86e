//! Obstacle records: the entries a convoy crew logs along a route.
//!
//! Records are written once and never edited. The only lifecycle events are
//! append (on save), removal by id, and clearing the whole collection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Coordinates ─────────────────────────────────────────────────────────────

/// A WGS 84 position as returned by the geolocation and geocoding providers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Coordinates {
  pub fn new(latitude: f64, longitude: f64) -> Self { Self { latitude, longitude } }
}

impl fmt::Display for Coordinates {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
  }
}

// ─── Obstacle ────────────────────────────────────────────────────────────────

/// A persisted obstacle. The JSON layout of this struct is the on-disk
/// format of the obstacle collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
  /// Caller-generated; the store never checks uniqueness.
  pub id:                 String,
  pub title:              String,
  pub description:        String,
  /// Local file URI of an attached image. The record holds the reference
  /// only, never the bytes.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo:              Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub latitude:           Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub longitude:          Option<f64>,
  /// Set once when the record is created.
  pub creation_timestamp: DateTime<Utc>,
}

impl Obstacle {
  /// The position of the obstacle, when both halves of the pair are set.
  pub fn coordinates(&self) -> Option<Coordinates> {
    match (self.latitude, self.longitude) {
      (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
      _ => None,
    }
  }
}

// ─── ObstacleDraft ───────────────────────────────────────────────────────────

/// Uncommitted form state. Dropping a draft discards it; nothing touches the
/// store until [`ObstacleDraft::into_obstacle`] is saved.
#[derive(Debug, Clone, Default)]
pub struct ObstacleDraft {
  pub title:       String,
  pub description: String,
  pub photo:       Option<String>,
  pub coordinates: Option<Coordinates>,
}

impl ObstacleDraft {
  pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      description: description.into(),
      ..Self::default()
    }
  }

  /// Finalise the draft as of `now`. The id is the creation instant in
  /// milliseconds since the Unix epoch; title and description are trimmed.
  pub fn into_obstacle(self, now: DateTime<Utc>) -> Obstacle {
    Obstacle {
      id:                 now.timestamp_millis().to_string(),
      title:              self.title.trim().to_owned(),
      description:        self.description.trim().to_owned(),
      photo:              self.photo,
      latitude:           self.coordinates.map(|c| c.latitude),
      longitude:          self.coordinates.map(|c| c.longitude),
      creation_timestamp: now,
    }
  }
}
