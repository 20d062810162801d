//! People eligible for staffing.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one staffable person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub Uuid);

impl PersonId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employment regime of a person.
///
/// Carried for the surrounding staffing screens; occupancy fractions are
/// always relative to full-time capacity regardless of regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRegime {
    FullTime,
    PartTime,
}

/// Immutable reference to a staffable person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub display_name: String,
    pub contract: ContractRegime,
}

impl Person {
    pub fn new(display_name: impl Into<String>, contract: ContractRegime) -> Self {
        Self::with_id(PersonId::new(), display_name, contract)
    }

    /// Used when identity already exists externally.
    pub fn with_id(id: PersonId, display_name: impl Into<String>, contract: ContractRegime) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            contract,
        }
    }
}
