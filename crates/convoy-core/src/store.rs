//! The key-value storage abstraction and the obstacle record store built on
//! top of it.
//!
//! Storage backends (e.g. `convoy-store-sqlite`) implement
//! [`KeyValueStore`]. The obstacle collection lives in a single slot as one
//! JSON array, and every mutation rewrites the whole array. There is no
//! locking or versioning: two overlapping mutations can race and the last
//! writer wins, so callers issue one mutation at a time.

use std::{collections::HashMap, convert::Infallible, future::Future, sync::Mutex};

use tracing::{debug, warn};

use crate::{Error, Result, obstacle::Obstacle};

/// The slot holding the serialised obstacle array.
pub const OBSTACLES_KEY: &str = "obstacles";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a string-to-string persistence provider.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`. Returns `None` if the key is absent.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete `key`. Removing an absent key succeeds.
  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local [`KeyValueStore`]; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    // A panic while holding the lock cannot leave a map half-written.
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.entries().get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Infallible> {
    self.entries().insert(key.to_owned(), value);
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<(), Infallible> {
    self.entries().remove(key);
    Ok(())
  }
}

// ─── Obstacle store ──────────────────────────────────────────────────────────

/// The durable obstacle list.
///
/// Reads are lenient: [`ObstacleStore::list`] turns a missing, unreadable, or
/// corrupt slot into an empty list. Use [`ObstacleStore::try_list`] to tell
/// those cases apart.
#[derive(Debug, Clone)]
pub struct ObstacleStore<K> {
  kv: K,
}

impl<K: KeyValueStore> ObstacleStore<K> {
  pub fn new(kv: K) -> Self { Self { kv } }

  /// The underlying key-value provider.
  pub fn backend(&self) -> &K { &self.kv }

  /// Every stored obstacle, in insertion order. Never fails.
  pub async fn list(&self) -> Vec<Obstacle> {
    match self.try_list().await {
      Ok(obstacles) => obstacles,
      Err(e) => {
        warn!(error = %e, "reading obstacles failed, treating as empty");
        Vec::new()
      }
    }
  }

  /// Strict read: an absent slot is an empty list, a provider failure is
  /// [`Error::Storage`], and an undecodable value is [`Error::Corrupt`].
  pub async fn try_list(&self) -> Result<Vec<Obstacle>> {
    let raw = self.kv.get(OBSTACLES_KEY).await.map_err(Error::storage)?;
    let Some(raw) = raw else {
      debug!("no obstacle collection stored yet");
      return Ok(Vec::new());
    };
    let obstacles: Vec<Obstacle> = serde_json::from_str(&raw).map_err(Error::Corrupt)?;
    debug!(count = obstacles.len(), "loaded obstacles");
    Ok(obstacles)
  }

  /// Append `obstacle` and rewrite the collection. Ids are not checked for
  /// uniqueness.
  pub async fn add(&self, obstacle: Obstacle) -> Result<()> {
    self.add_all([obstacle]).await
  }

  /// Append several obstacles in order with a single rewrite.
  pub async fn add_all(&self, obstacles: impl IntoIterator<Item = Obstacle>) -> Result<()> {
    let mut current = self.list().await;
    current.extend(obstacles);
    self.save(&current).await
  }

  /// Drop every obstacle whose id is `id` and rewrite the collection.
  /// Removing an unknown id rewrites the collection unchanged.
  pub async fn remove(&self, id: &str) -> Result<()> {
    let mut current = self.list().await;
    let before = current.len();
    current.retain(|o| o.id != id);
    debug!(id, removed = before - current.len(), "removing obstacle");
    self.save(&current).await
  }

  /// Delete the whole collection. Provider failures are logged and
  /// otherwise ignored.
  pub async fn clear(&self) {
    if let Err(e) = self.kv.remove(OBSTACLES_KEY).await {
      warn!(error = %e, "clearing obstacles failed");
    }
  }

  async fn save(&self, obstacles: &[Obstacle]) -> Result<()> {
    let json = serde_json::to_string(obstacles)?;
    self
      .kv
      .set(OBSTACLES_KEY, json)
      .await
      .map_err(Error::storage)?;
    debug!(count = obstacles.len(), "saved obstacles");
    Ok(())
  }
}
