//! Interfaces to device capabilities: geolocation, address lookup, images,
//! and telephony.
//!
//! Concrete implementations live in the front end. The helper flows here
//! (`current_position`, `acquire_image`, `locate_address`) encode the
//! permission-then-act sequence every caller follows. None of them add
//! timeouts or retries.

use std::{fmt, future::Future};

use tracing::debug;

use crate::{Error, Result, obstacle::Coordinates};

// ─── Permissions ─────────────────────────────────────────────────────────────

/// The device capability a permission request or failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
  Location,
  Camera,
  Gallery,
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Location => "location",
      Self::Camera => "camera",
      Self::Gallery => "photo library",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
  Granted,
  Denied,
}

impl Permission {
  pub fn is_granted(self) -> bool { matches!(self, Self::Granted) }
}

/// Where an image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
  Camera,
  Gallery,
}

impl ImageKind {
  pub fn capability(self) -> Capability {
    match self {
      Self::Camera => Capability::Camera,
      Self::Gallery => Capability::Gallery,
    }
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

pub trait Geolocator: Send + Sync {
  fn request_permission(&self) -> impl Future<Output = Permission> + Send + '_;

  fn current_position(&self) -> impl Future<Output = Result<Coordinates>> + Send + '_;
}

pub trait Geocoder: Send + Sync {
  /// Resolve free-text `address` to candidate positions, best match first.
  /// An unresolvable address yields an empty list, not an error.
  fn resolve<'a>(
    &'a self,
    address: &'a str,
  ) -> impl Future<Output = Result<Vec<Coordinates>>> + Send + 'a;
}

pub trait ImageSource: Send + Sync {
  fn request_permission(
    &self,
    kind: ImageKind,
  ) -> impl Future<Output = Permission> + Send + '_;

  /// Capture or pick an image. `Ok(None)` means the user cancelled.
  fn acquire(
    &self,
    kind: ImageKind,
  ) -> impl Future<Output = Result<Option<String>>> + Send + '_;
}

/// Fire-and-forget call launcher.
pub trait Dialer: Send + Sync {
  fn place_call(&self, phone_number: &str) -> Result<()>;
}

// ─── Flows ───────────────────────────────────────────────────────────────────

/// Ask for location permission, then read the current position.
pub async fn current_position<G: Geolocator>(geolocator: &G) -> Result<Coordinates> {
  if !geolocator.request_permission().await.is_granted() {
    return Err(Error::PermissionDenied(Capability::Location));
  }
  let position = geolocator.current_position().await?;
  debug!(%position, "current position");
  Ok(position)
}

/// Ask for the permission `kind` needs, then capture or pick an image.
pub async fn acquire_image<S: ImageSource>(source: &S, kind: ImageKind) -> Result<Option<String>> {
  if !source.request_permission(kind).await.is_granted() {
    return Err(Error::PermissionDenied(kind.capability()));
  }
  source.acquire(kind).await
}

/// Resolve `address` and keep the best match.
pub async fn locate_address<G: Geocoder>(geocoder: &G, address: &str) -> Result<Coordinates> {
  let address = address.trim();
  if address.is_empty() {
    return Err(Error::EmptyAddress);
  }
  geocoder
    .resolve(address)
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| Error::AddressNotFound(address.to_owned()))
}
