//! Closed set of entity kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Kind of personally-identifiable entity a span refers to.
///
/// Serialized with the short labels used in tokens (`[PHONE_001]`),
/// long names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Russian national insurance number (SNILS)
    #[serde(rename = "SNILS", alias = "NATIONAL_ID")]
    NationalId,
    #[serde(rename = "PHONE")]
    Phone,
    #[serde(rename = "ADDR", alias = "ADDRESS")]
    Address,
    #[serde(rename = "PER", alias = "PERSON")]
    Person,
}

impl EntityKind {
    /// All kinds in default priority order (highest first)
    pub const ALL: [EntityKind; 4] = [
        EntityKind::NationalId,
        EntityKind::Phone,
        EntityKind::Address,
        EntityKind::Person,
    ];

    /// Label used in ids, token strings and persisted documents
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::NationalId => "SNILS",
            EntityKind::Phone => "PHONE",
            EntityKind::Address => "ADDR",
            EntityKind::Person => "PER",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SNILS" | "NATIONAL_ID" => Ok(EntityKind::NationalId),
            "PHONE" => Ok(EntityKind::Phone),
            "ADDR" | "ADDRESS" => Ok(EntityKind::Address),
            "PER" | "PERSON" => Ok(EntityKind::Person),
            _ => Err(Error::UnsupportedType(s.to_string())),
        }
    }
}
