//! Non-interactive subcommands.
//!
//! Every command writes to a caller-supplied sink and reads confirmations
//! from a caller-supplied reader so the whole flow can run against an
//! in-memory store in tests.

use std::{
  io::{BufRead, Write},
  path::PathBuf,
  process::ExitCode,
};

use anyhow::{Context as _, Result};
use chrono::{Local, Utc};
use convoy_core::{
  contact,
  obstacle::{Coordinates, Obstacle, ObstacleDraft},
  provider::{self, Dialer, Geocoder, Geolocator, ImageKind, ImageSource},
  sample::sample_obstacles,
  store::{KeyValueStore, ObstacleStore},
  validate::{self, ObstacleInput, Validation},
};
use tracing::info;

// ─── Arguments ────────────────────────────────────────────────────────────────

/// Input for [`add`], as parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
  pub title:       String,
  pub description: String,
  pub photo:       Option<PathBuf>,
  pub camera:      bool,
  pub latitude:    Option<String>,
  pub longitude:   Option<String>,
  pub here:        bool,
  pub address:     Option<String>,
}

/// The capability providers the `add` flow may consult.
#[derive(Debug)]
pub struct Devices<'a, G, C, I> {
  pub geolocator: &'a G,
  pub geocoder:   &'a C,
  pub images:     &'a I,
}

// ─── list ─────────────────────────────────────────────────────────────────────

pub async fn list<K: KeyValueStore>(
  store: &ObstacleStore<K>,
  json: bool,
  out: &mut impl Write,
) -> Result<ExitCode> {
  let obstacles = store.list().await;

  if json {
    serde_json::to_writer_pretty(&mut *out, &obstacles).context("writing JSON")?;
    writeln!(out)?;
    return Ok(ExitCode::SUCCESS);
  }

  if obstacles.is_empty() {
    writeln!(out, "No obstacles recorded yet. Add one with `convoy add`.")?;
    return Ok(ExitCode::SUCCESS);
  }

  for (i, obstacle) in obstacles.iter().enumerate() {
    if i > 0 {
      writeln!(out)?;
    }
    write_obstacle(out, obstacle)?;
  }
  Ok(ExitCode::SUCCESS)
}

fn write_obstacle(out: &mut impl Write, o: &Obstacle) -> std::io::Result<()> {
  writeln!(out, "[{}] {}", o.id, o.title)?;
  writeln!(out, "    {}", o.description)?;
  if let Some(photo) = &o.photo {
    writeln!(out, "    photo:    {photo}")?;
  }
  if let Some(position) = o.coordinates() {
    writeln!(out, "    position: {position}")?;
  }
  writeln!(
    out,
    "    created:  {}",
    o.creation_timestamp
      .with_timezone(&Local)
      .format("%d/%m/%Y %H:%M:%S")
  )
}

// ─── add ──────────────────────────────────────────────────────────────────────

pub async fn add<K, G, C, I>(
  store: &ObstacleStore<K>,
  devices: Devices<'_, G, C, I>,
  args: AddArgs,
  out: &mut impl Write,
) -> Result<ExitCode>
where
  K: KeyValueStore,
  G: Geolocator,
  C: Geocoder,
  I: ImageSource,
{
  // Resolve the position first so its values go through the same checks as
  // typed coordinates.
  let (latitude, longitude) = if args.here {
    let pos = provider::current_position(devices.geolocator)
      .await
      .context("cannot read the current position")?;
    (Some(pos.latitude.to_string()), Some(pos.longitude.to_string()))
  } else if let Some(address) = &args.address {
    let pos = provider::locate_address(devices.geocoder, address)
      .await
      .context("cannot locate that address")?;
    writeln!(out, "Address found: {} ({pos})", address.trim())?;
    (Some(pos.latitude.to_string()), Some(pos.longitude.to_string()))
  } else {
    (args.latitude.clone(), args.longitude.clone())
  };

  let validation = validate::validate_obstacle(&ObstacleInput {
    title:       &args.title,
    description: &args.description,
    latitude:    latitude.as_deref(),
    longitude:   longitude.as_deref(),
  });
  if !validation.is_valid() {
    write_validation(out, &validation)?;
    return Ok(ExitCode::FAILURE);
  }

  let photo = if args.camera {
    provider::acquire_image(devices.images, ImageKind::Camera)
      .await
      .context("cannot take a photo")?
  } else if args.photo.is_some() {
    provider::acquire_image(devices.images, ImageKind::Gallery)
      .await
      .context("cannot attach the photo")?
  } else {
    None
  };

  // Titles are single-line; descriptions keep their line breaks.
  let mut draft = ObstacleDraft::new(validate::sanitize_text(&args.title), args.description);
  draft.photo = photo;
  draft.coordinates = latitude
    .as_deref()
    .and_then(validate::parse_coordinate)
    .zip(longitude.as_deref().and_then(validate::parse_coordinate))
    .map(|(lat, lng)| Coordinates::new(lat, lng));

  let obstacle = draft.into_obstacle(Utc::now());
  let id = obstacle.id.clone();
  store
    .add(obstacle)
    .await
    .context("failed to save the obstacle")?;

  info!(%id, "obstacle added");
  writeln!(out, "Obstacle saved with id {id}.")?;
  Ok(ExitCode::SUCCESS)
}

// ─── validate ─────────────────────────────────────────────────────────────────

pub fn validate(input: &ObstacleInput<'_>, out: &mut impl Write) -> Result<ExitCode> {
  let validation = validate::validate_obstacle(input);
  if validation.is_valid() {
    writeln!(out, "Valid.")?;
    return Ok(ExitCode::SUCCESS);
  }
  write_validation(out, &validation)?;
  Ok(ExitCode::FAILURE)
}

fn write_validation(out: &mut impl Write, validation: &Validation) -> std::io::Result<()> {
  writeln!(out, "Invalid obstacle:")?;
  for message in validation.messages() {
    writeln!(out, "  - {message}")?;
  }
  Ok(())
}

// ─── remove / clear ───────────────────────────────────────────────────────────

pub async fn remove<K: KeyValueStore>(
  store: &ObstacleStore<K>,
  id: &str,
  yes: bool,
  input: &mut impl BufRead,
  out: &mut impl Write,
) -> Result<ExitCode> {
  let current = store.list().await;
  let Some(target) = current.iter().find(|o| o.id == id) else {
    writeln!(out, "No obstacle with id {id}.")?;
    return Ok(ExitCode::SUCCESS);
  };

  if !yes && !confirm(input, out, &format!("Remove \"{}\"?", target.title))? {
    writeln!(out, "Cancelled.")?;
    return Ok(ExitCode::SUCCESS);
  }

  store
    .remove(id)
    .await
    .context("failed to remove the obstacle")?;
  info!(id, "obstacle removed");
  writeln!(out, "Removed.")?;
  Ok(ExitCode::SUCCESS)
}

pub async fn clear<K: KeyValueStore>(
  store: &ObstacleStore<K>,
  yes: bool,
  input: &mut impl BufRead,
  out: &mut impl Write,
) -> Result<ExitCode> {
  let count = store.list().await.len();
  if !yes && !confirm(input, out, &format!("Remove all {count} obstacles?"))? {
    writeln!(out, "Cancelled.")?;
    return Ok(ExitCode::SUCCESS);
  }

  store.clear().await;
  info!(count, "obstacles cleared");
  writeln!(out, "Cleared.")?;
  Ok(ExitCode::SUCCESS)
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
fn confirm(input: &mut impl BufRead, out: &mut impl Write, question: &str) -> Result<bool> {
  write!(out, "{question} [y/N] ")?;
  out.flush()?;
  let mut line = String::new();
  input.read_line(&mut line).context("reading confirmation")?;
  Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

// ─── seed / check ─────────────────────────────────────────────────────────────

pub async fn seed<K: KeyValueStore>(store: &ObstacleStore<K>, out: &mut impl Write) -> Result<ExitCode> {
  let samples = sample_obstacles(Utc::now());
  let count = samples.len();
  store
    .add_all(samples)
    .await
    .context("failed to add sample obstacles")?;
  writeln!(out, "Added {count} sample obstacles.")?;
  Ok(ExitCode::SUCCESS)
}

pub async fn check<K: KeyValueStore>(store: &ObstacleStore<K>, out: &mut impl Write) -> Result<ExitCode> {
  match store.try_list().await {
    Ok(obstacles) => {
      writeln!(out, "OK: {} obstacles stored.", obstacles.len())?;
      Ok(ExitCode::SUCCESS)
    }
    Err(e) => {
      writeln!(out, "Problem: {e}")?;
      Ok(ExitCode::FAILURE)
    }
  }
}

// ─── contacts / call ──────────────────────────────────────────────────────────

pub fn contacts(out: &mut impl Write) -> Result<ExitCode> {
  for c in contact::contacts() {
    writeln!(out, "{:>2}  {:<22} {:<18} {}", c.id, c.name, c.phone_number, c.role)?;
  }
  Ok(ExitCode::SUCCESS)
}

pub fn call<D: Dialer>(dialer: &D, contact_id: &str, out: &mut impl Write) -> Result<ExitCode> {
  let contact = contact::find(contact_id)
    .ok_or_else(|| convoy_core::Error::ContactNotFound(contact_id.to_owned()))?;
  dialer
    .place_call(contact.phone_number)
    .context("cannot place the call")?;
  writeln!(out, "Calling {} ({})…", contact.name, contact.phone_number)?;
  Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use convoy_core::{Error, provider::Permission, store::MemoryStore};

  use super::*;

  // ── Test doubles ────────────────────────────────────────────────────────

  struct Gps(Option<Coordinates>);

  impl Geolocator for Gps {
    async fn request_permission(&self) -> Permission {
      if self.0.is_some() { Permission::Granted } else { Permission::Denied }
    }

    async fn current_position(&self) -> convoy_core::Result<Coordinates> {
      self.0.ok_or_else(|| Error::Provider("no fix".into()))
    }
  }

  struct Atlas;

  impl Geocoder for Atlas {
    async fn resolve(&self, address: &str) -> convoy_core::Result<Vec<Coordinates>> {
      Ok(if address == "Metz" { vec![Coordinates::new(49.1193, 6.1757)] } else { vec![] })
    }
  }

  struct Photos(Option<&'static str>);

  impl ImageSource for Photos {
    async fn request_permission(&self, _kind: ImageKind) -> Permission { Permission::Granted }

    async fn acquire(&self, _kind: ImageKind) -> convoy_core::Result<Option<String>> {
      Ok(self.0.map(str::to_owned))
    }
  }

  #[derive(Default)]
  struct RecordingDialer {
    calls: Mutex<Vec<String>>,
  }

  impl Dialer for RecordingDialer {
    fn place_call(&self, phone_number: &str) -> convoy_core::Result<()> {
      self.calls.lock().unwrap().push(phone_number.to_owned());
      Ok(())
    }
  }

  fn store() -> ObstacleStore<MemoryStore> { ObstacleStore::new(MemoryStore::new()) }

  fn args(title: &str, description: &str) -> AddArgs {
    AddArgs { title: title.into(), description: description.into(), ..AddArgs::default() }
  }

  async fn run_add(
    store: &ObstacleStore<MemoryStore>,
    gps: Option<Coordinates>,
    photo: Option<&'static str>,
    a: AddArgs,
  ) -> (Result<ExitCode>, String) {
    let mut out = Vec::new();
    let devices = Devices { geolocator: &Gps(gps), geocoder: &Atlas, images: &Photos(photo) };
    let code = add(store, devices, a, &mut out).await;
    (code, String::from_utf8(out).unwrap())
  }

  // ── add ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_saves_trimmed_obstacle() {
    let s = store();
    let mut a = args("  Pont \t bas ", "Pont avec limitation de hauteur à 4,5m.");
    a.latitude = Some("49.12".into());
    a.longitude = Some("6.17".into());

    let (code, out) = run_add(&s, None, None, a).await;
    assert_eq!(code.unwrap(), ExitCode::SUCCESS);
    assert!(out.contains("Obstacle saved with id"));

    let all = s.list().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Pont bas");
    assert_eq!(all[0].coordinates(), Some(Coordinates::new(49.12, 6.17)));
  }

  #[tokio::test]
  async fn add_rejects_invalid_input_and_lists_every_message() {
    let s = store();
    let (code, out) = run_add(&s, None, None, args("ab", "short")).await;

    assert_eq!(code.unwrap(), ExitCode::FAILURE);
    assert!(out.contains("title must be at least 3 characters"));
    assert!(out.contains("description must be at least 10 characters"));
    assert!(s.list().await.is_empty());
  }

  #[tokio::test]
  async fn add_uses_current_position() {
    let s = store();
    let mut a = args("Feu tricolore", "Feu à démonter au carrefour.");
    a.here = true;

    let (code, _) = run_add(&s, Some(Coordinates::new(49.0, 6.0)), None, a).await;
    assert_eq!(code.unwrap(), ExitCode::SUCCESS);
    assert_eq!(s.list().await[0].coordinates(), Some(Coordinates::new(49.0, 6.0)));
  }

  #[tokio::test]
  async fn add_without_location_permission_fails() {
    let s = store();
    let mut a = args("Feu tricolore", "Feu à démonter au carrefour.");
    a.here = true;

    let (code, _) = run_add(&s, None, None, a).await;
    assert!(code.is_err());
    assert!(s.list().await.is_empty());
  }

  #[tokio::test]
  async fn add_geocodes_address_and_attaches_photo() {
    let s = store();
    let mut a = args("Passage à niveau", "Coordination nécessaire avec la SNCF.");
    a.address = Some("Metz".into());
    a.photo = Some(PathBuf::from("pont.jpg"));

    let (code, out) = run_add(&s, None, Some("file:///tmp/pont.jpg"), a).await;
    assert_eq!(code.unwrap(), ExitCode::SUCCESS);
    assert!(out.contains("Address found: Metz"));

    let saved = &s.list().await[0];
    assert_eq!(saved.coordinates(), Some(Coordinates::new(49.1193, 6.1757)));
    assert_eq!(saved.photo.as_deref(), Some("file:///tmp/pont.jpg"));
  }

  #[tokio::test]
  async fn add_with_unknown_address_fails() {
    let s = store();
    let mut a = args("Passage à niveau", "Coordination nécessaire avec la SNCF.");
    a.address = Some("Atlantis".into());

    let (code, _) = run_add(&s, None, None, a).await;
    assert!(code.is_err());
    assert!(s.list().await.is_empty());
  }

  // ── list ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_empty_shows_hint() {
    let mut out = Vec::new();
    list(&store(), false, &mut out).await.unwrap();
    assert!(String::from_utf8(out).unwrap().contains("No obstacles recorded yet"));
  }

  #[tokio::test]
  async fn list_prints_position_with_six_decimals() {
    let s = store();
    seed(&s, &mut Vec::new()).await.unwrap();

    let mut out = Vec::new();
    list(&s, false, &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[sample-1] Feu tricolore à démonter"));
    assert!(text.contains("position: 49.119309, 6.175716"));
  }

  #[tokio::test]
  async fn list_json_is_the_stored_array() {
    let s = store();
    seed(&s, &mut Vec::new()).await.unwrap();

    let mut out = Vec::new();
    list(&s, true, &mut out).await.unwrap();
    let parsed: Vec<Obstacle> = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed, s.list().await);
  }

  // ── remove / clear ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn remove_asks_for_confirmation() {
    let s = store();
    seed(&s, &mut Vec::new()).await.unwrap();

    let mut out = Vec::new();
    remove(&s, "sample-2", false, &mut &b"n\n"[..], &mut out).await.unwrap();
    assert_eq!(s.list().await.len(), 3);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Remove \"Passage à niveau SNCF\"?"));
    assert!(text.contains("Cancelled."));

    remove(&s, "sample-2", false, &mut &b"y\n"[..], &mut Vec::new())
      .await
      .unwrap();
    let ids: Vec<_> = s.list().await.into_iter().map(|o| o.id).collect();
    assert_eq!(ids, ["sample-1", "sample-3"]);
  }

  #[tokio::test]
  async fn remove_unknown_id_reports_and_succeeds() {
    let s = store();
    let mut out = Vec::new();
    let code = remove(&s, "42", true, &mut &b""[..], &mut out).await.unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(String::from_utf8(out).unwrap().contains("No obstacle with id 42"));
  }

  #[tokio::test]
  async fn clear_with_yes_skips_prompt() {
    let s = store();
    seed(&s, &mut Vec::new()).await.unwrap();

    clear(&s, true, &mut &b""[..], &mut Vec::new()).await.unwrap();
    assert!(s.list().await.is_empty());
  }

  // ── check / validate / contacts ─────────────────────────────────────────

  #[tokio::test]
  async fn check_reports_corruption() {
    let s = store();
    s.backend()
      .set(convoy_core::store::OBSTACLES_KEY, "oops".into())
      .await
      .unwrap();

    let mut out = Vec::new();
    assert_eq!(check(&s, &mut out).await.unwrap(), ExitCode::FAILURE);
    assert!(String::from_utf8(out).unwrap().contains("corrupt"));
  }

  #[test]
  fn validate_command_exit_codes() {
    let ok = ObstacleInput {
      title:       "Pont bas",
      description: "Pont avec limitation de hauteur à 4,5m.",
      latitude:    Some("49.1"),
      longitude:   Some("6.1"),
    };
    assert_eq!(validate(&ok, &mut Vec::new()).unwrap(), ExitCode::SUCCESS);

    let bad = ObstacleInput { latitude: Some("95"), ..ok };
    let mut out = Vec::new();
    assert_eq!(validate(&bad, &mut out).unwrap(), ExitCode::FAILURE);
    assert!(String::from_utf8(out).unwrap().contains("latitude must be between -90 and 90"));
  }

  #[test]
  fn call_dials_the_contact_number() {
    let dialer = RecordingDialer::default();
    let mut out = Vec::new();
    call(&dialer, "6", &mut out).unwrap();
    assert_eq!(*dialer.calls.lock().unwrap(), ["3635"]);
    assert!(String::from_utf8(out).unwrap().contains("SNCF Info Trafic"));

    assert!(call(&dialer, "99", &mut Vec::new()).is_err());
  }

  #[test]
  fn contacts_lists_every_entry() {
    let mut out = Vec::new();
    contacts(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 6);
    assert!(text.contains("Pompiers"));
  }
}
