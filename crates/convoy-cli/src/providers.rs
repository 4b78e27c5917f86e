//! Concrete device capabilities for a terminal host.

use std::{
  path::PathBuf,
  process::Stdio,
  time::Duration,
};

use convoy_core::{
  Error, Result,
  contact::tel_uri,
  obstacle::Coordinates,
  provider::{Dialer, Geocoder, Geolocator, ImageKind, ImageSource, Permission},
};
use serde::Deserialize;
use tracing::{debug, info};

// ─── Geolocation ──────────────────────────────────────────────────────────────

/// Reports the position configured in settings. Without one, location
/// permission is denied.
#[derive(Debug, Clone)]
pub struct ConfiguredGeolocator {
  pub position: Option<Coordinates>,
}

impl Geolocator for ConfiguredGeolocator {
  async fn request_permission(&self) -> Permission {
    if self.position.is_some() {
      Permission::Granted
    } else {
      Permission::Denied
    }
  }

  async fn current_position(&self) -> Result<Coordinates> {
    self
      .position
      .ok_or_else(|| Error::Provider("no position configured".into()))
  }
}

// ─── Geocoding ────────────────────────────────────────────────────────────────

/// Address lookup against a Nominatim-compatible `/search` endpoint.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
  client: reqwest::Client,
  url:    String,
}

/// One entry of a Nominatim JSON response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
  lat: String,
  lon: String,
}

impl NominatimGeocoder {
  pub fn new(url: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .user_agent(concat!("convoy/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| Error::Provider(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, url: url.into() })
  }
}

impl Geocoder for NominatimGeocoder {
  async fn resolve(&self, address: &str) -> Result<Vec<Coordinates>> {
    let resp = self
      .client
      .get(&self.url)
      .query(&[("q", address), ("format", "json"), ("limit", "5")])
      .send()
      .await
      .map_err(|e| Error::Provider(format!("geocoding request failed: {e}")))?;

    if !resp.status().is_success() {
      return Err(Error::Provider(format!("geocoder returned {}", resp.status())));
    }

    let places: Vec<Place> = resp
      .json()
      .await
      .map_err(|e| Error::Provider(format!("unreadable geocoder response: {e}")))?;

    let found = parse_places(places);
    debug!(address, matches = found.len(), "geocoded");
    Ok(found)
  }
}

fn parse_places(places: Vec<Place>) -> Vec<Coordinates> {
  places
    .into_iter()
    .filter_map(|p| Some(Coordinates::new(p.lat.parse().ok()?, p.lon.parse().ok()?)))
    .collect()
}

// ─── Images ───────────────────────────────────────────────────────────────────

/// "Gallery" is a file named on the command line. There is no capture
/// device, so camera permission is always denied.
#[derive(Debug, Clone, Default)]
pub struct FileImageSource {
  pub path: Option<PathBuf>,
}

impl ImageSource for FileImageSource {
  async fn request_permission(&self, kind: ImageKind) -> Permission {
    match kind {
      ImageKind::Camera => Permission::Denied,
      ImageKind::Gallery => Permission::Granted,
    }
  }

  async fn acquire(&self, kind: ImageKind) -> Result<Option<String>> {
    let (ImageKind::Gallery, Some(path)) = (kind, &self.path) else {
      return Ok(None);
    };

    let canonical = tokio::fs::canonicalize(path)
      .await
      .map_err(|e| Error::Provider(format!("{}: {e}", path.display())))?;
    let meta = tokio::fs::metadata(&canonical)
      .await
      .map_err(|e| Error::Provider(format!("{}: {e}", canonical.display())))?;
    if !meta.is_file() {
      return Err(Error::Provider(format!("{} is not a file", canonical.display())));
    }

    Ok(Some(format!("file://{}", canonical.display())))
  }
}

// ─── Telephony ────────────────────────────────────────────────────────────────

/// Hands a `tel:` URI to the platform opener and returns immediately.
#[derive(Debug, Clone)]
pub struct SystemDialer {
  pub command: String,
}

impl Dialer for SystemDialer {
  fn place_call(&self, phone_number: &str) -> Result<()> {
    let uri = tel_uri(phone_number);
    tokio::process::Command::new(&self.command)
      .arg(&uri)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .spawn()
      .map_err(|e| Error::Provider(format!("cannot place calls with {:?}: {e}", self.command)))?;
    info!(%uri, "call launched");
    Ok(())
  }
}
