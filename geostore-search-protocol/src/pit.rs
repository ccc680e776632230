//! Point-in-time tokens.

use serde::{Deserialize, Serialize};

/// A point-in-time token fixing a consistent backend snapshot.
///
/// A collection created with a `Pit` attaches it to every fetch it issues,
/// isolating the whole pagination run from concurrent index mutation
/// (refreshes, newly ingested documents). The token's backend-side lifetime
/// is governed by `keep_alive` and is not managed by this client; an expired
/// token surfaces as an ordinary backend request failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pit {
    /// Opaque backend snapshot id.
    pub id: String,

    /// Lifetime extension applied on each use (e.g. "5m").
    pub keep_alive: String,
}

impl Pit {
    /// Token `id` with the given keep-alive lifetime.
    pub fn new(id: impl Into<String>, keep_alive: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keep_alive: keep_alive.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pit_wire_shape() {
        let pit = Pit::new("46ToAwEPZ", "5m");
        assert_eq!(
            serde_json::to_value(&pit).unwrap(),
            json!({ "id": "46ToAwEPZ", "keep_alive": "5m" })
        );
    }
}
