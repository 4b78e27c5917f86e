//! Sample obstacles for development and demos.

use chrono::{DateTime, Duration, Utc};

use crate::obstacle::Obstacle;

/// Three realistic obstacles dated one, two, and three days before `now`.
/// Ids are fixed (`sample-1` to `sample-3`), so seeding twice duplicates them.
pub fn sample_obstacles(now: DateTime<Utc>) -> Vec<Obstacle> {
  vec![
    Obstacle {
      id:                 "sample-1".into(),
      title:              "Feu tricolore à démonter".into(),
      description:        "Feu tricolore situé au carrefour de la rue principale. Nécessite \
                           l'intervention des services municipaux pour démontage temporaire."
        .into(),
      photo:              None,
      latitude:           Some(49.1193089),
      longitude:          Some(6.1757156),
      creation_timestamp: now - Duration::days(1),
    },
    Obstacle {
      id:                 "sample-2".into(),
      title:              "Passage à niveau SNCF".into(),
      description:        "Coordination nécessaire avec la SNCF pour le passage du convoi \
                           exceptionnel. Prévoir un arrêt de 15 minutes minimum."
        .into(),
      photo:              None,
      latitude:           Some(49.1203089),
      longitude:          Some(6.1767156),
      creation_timestamp: now - Duration::days(2),
    },
    Obstacle {
      id:                 "sample-3".into(),
      title:              "Pont à hauteur limitée".into(),
      description:        "Pont avec limitation de hauteur à 4,5m. Vérifier les dimensions du \
                           chargement avant passage."
        .into(),
      photo:              None,
      latitude:           Some(49.1213089),
      longitude:          Some(6.1777156),
      creation_timestamp: now - Duration::days(3),
    },
  ]
}
