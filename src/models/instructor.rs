//! Instructor identity model.

use serde::{Deserialize, Serialize};

/// The instructor using the console. Display only; no authorization is
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub username: String,
    pub display_name: String,
}

impl Instructor {
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
        }
    }
}

impl Default for Instructor {
    fn default() -> Self {
        Self::new("instructor", "Instructor")
    }
}
