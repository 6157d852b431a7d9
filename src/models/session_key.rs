use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one viewer watching one video. Every store is keyed by it.
///
/// The pair is kept structurally rather than concatenated into a string, so
/// `("a_b", "c")` and `("a", "b_c")` stay distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionKey {
    pub user_id: String,
    pub video_id: String,
}

impl SessionKey {
    pub fn new(user_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            video_id: video_id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.video_id)
    }
}
