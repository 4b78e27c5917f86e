//! Input validation for the obstacle form.
//!
//! Every rule is a pure function of its input. [`validate_obstacle`] runs all
//! of them and reports every violation at once so a form can show the whole
//! list instead of one problem per attempt.

use std::{fmt, ops::RangeInclusive};

pub const TITLE_LEN: RangeInclusive<usize> = 3..=100;
pub const DESCRIPTION_LEN: RangeInclusive<usize> = 10..=500;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

// ─── Violations ──────────────────────────────────────────────────────────────

/// A single broken rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
  TitleMissing,
  TitleTooShort,
  TitleTooLong,
  DescriptionMissing,
  DescriptionTooShort,
  DescriptionTooLong,
  LatitudeOutOfRange,
  LongitudeOutOfRange,
}

impl Violation {
  pub fn message(self) -> &'static str {
    match self {
      Self::TitleMissing => "title is required",
      Self::TitleTooShort => "title must be at least 3 characters",
      Self::TitleTooLong => "title must be at most 100 characters",
      Self::DescriptionMissing => "description is required",
      Self::DescriptionTooShort => "description must be at least 10 characters",
      Self::DescriptionTooLong => "description must be at most 500 characters",
      Self::LatitudeOutOfRange => "latitude must be between -90 and 90",
      Self::LongitudeOutOfRange => "longitude must be between -180 and 180",
    }
  }
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.message()) }
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// Raw form input, before any trimming or parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObstacleInput<'a> {
  pub title:       &'a str,
  pub description: &'a str,
  pub latitude:    Option<&'a str>,
  pub longitude:   Option<&'a str>,
}

/// Outcome of [`validate_obstacle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
  pub violations: Vec<Violation>,
}

impl Validation {
  pub fn is_valid(&self) -> bool { self.violations.is_empty() }

  pub fn messages(&self) -> Vec<&'static str> {
    self.violations.iter().map(|v| v.message()).collect()
  }
}

/// Run every applicable rule against `input`.
///
/// Coordinate rules only run when the corresponding string is present and
/// non-empty. The title and description rules are independent, so an empty
/// title reports both [`Violation::TitleMissing`] and
/// [`Violation::TitleTooShort`].
pub fn validate_obstacle(input: &ObstacleInput<'_>) -> Validation {
  let mut violations = Vec::new();

  let title = input.title.trim();
  let title_len = title.chars().count();
  if title.is_empty() {
    violations.push(Violation::TitleMissing);
  }
  if title_len < *TITLE_LEN.start() {
    violations.push(Violation::TitleTooShort);
  }
  if title_len > *TITLE_LEN.end() {
    violations.push(Violation::TitleTooLong);
  }

  let description = input.description.trim();
  let description_len = description.chars().count();
  if description.is_empty() {
    violations.push(Violation::DescriptionMissing);
  }
  if description_len < *DESCRIPTION_LEN.start() {
    violations.push(Violation::DescriptionTooShort);
  }
  if description_len > *DESCRIPTION_LEN.end() {
    violations.push(Violation::DescriptionTooLong);
  }

  if let Some(lat) = supplied(input.latitude)
    && !is_valid_latitude(lat)
  {
    violations.push(Violation::LatitudeOutOfRange);
  }
  if let Some(lng) = supplied(input.longitude)
    && !is_valid_longitude(lng)
  {
    violations.push(Violation::LongitudeOutOfRange);
  }

  Validation { violations }
}

// ─── Individual rules ────────────────────────────────────────────────────────

pub fn is_valid_title(title: &str) -> bool {
  let title = title.trim();
  !title.is_empty() && TITLE_LEN.contains(&title.chars().count())
}

pub fn is_valid_description(description: &str) -> bool {
  let description = description.trim();
  !description.is_empty() && DESCRIPTION_LEN.contains(&description.chars().count())
}

pub fn is_valid_latitude(lat: &str) -> bool {
  parse_coordinate(lat).is_some_and(|v| LATITUDE_RANGE.contains(&v))
}

pub fn is_valid_longitude(lng: &str) -> bool {
  parse_coordinate(lng).is_some_and(|v| LONGITUDE_RANGE.contains(&v))
}

/// Pair check used by the location picker. Coordinates are optional, so the
/// pair passes whenever either half is missing; a lone coordinate is not
/// flagged here.
pub fn is_valid_coordinates(latitude: Option<&str>, longitude: Option<&str>) -> bool {
  match (supplied(latitude), supplied(longitude)) {
    (Some(lat), Some(lng)) => is_valid_latitude(lat) && is_valid_longitude(lng),
    _ => true,
  }
}

/// Parse a coordinate string. Surrounding whitespace is ignored; NaN is
/// rejected here so range checks never see it.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
  raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Trim and collapse every internal whitespace run to a single space.
pub fn sanitize_text(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn supplied(value: Option<&str>) -> Option<&str> { value.filter(|v| !v.is_empty()) }
