//! The fixed directory of emergency and operational contacts.

use serde::Serialize;

/// A contact entry. The directory is compiled in and never changes at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:           &'static str,
  pub name:         &'static str,
  pub phone_number: &'static str,
  pub role:         &'static str,
}

impl Contact {
  pub fn tel_uri(&self) -> String { tel_uri(self.phone_number) }
}

/// The `tel:` URI for `phone_number`, with whitespace removed.
pub fn tel_uri(phone_number: &str) -> String {
  let digits: String = phone_number
    .chars()
    .filter(|c| !c.is_whitespace())
    .collect();
  format!("tel:{digits}")
}

static CONTACTS: [Contact; 6] = [
  Contact { id: "1", name: "Urgences", phone_number: "15", role: "SAMU" },
  Contact { id: "2", name: "Police/Gendarmerie", phone_number: "17", role: "Secours" },
  Contact { id: "3", name: "Pompiers", phone_number: "18", role: "Incendie/Secours" },
  Contact {
    id:           "4",
    name:         "Dispatcher Transport",
    phone_number: "03 87 XX XX XX",
    role:         "Coordination",
  },
  Contact {
    id:           "5",
    name:         "Chef d'équipe",
    phone_number: "06 XX XX XX XX",
    role:         "Supervision",
  },
  Contact {
    id:           "6",
    name:         "SNCF Info Trafic",
    phone_number: "3635",
    role:         "Info ferroviaire",
  },
];

/// Every contact, in display order.
pub fn contacts() -> &'static [Contact] { &CONTACTS }

pub fn find(id: &str) -> Option<&'static Contact> {
  CONTACTS.iter().find(|c| c.id == id)
}
