use crate::domain::ids::PlayerId;
use serde::{Deserialize, Serialize};

/// Only the fields the engine cares about. The host player document has a
/// great deal more (profile, payment, auth); everything else is ignored at
/// the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

impl Player {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
