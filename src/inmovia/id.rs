use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// How fresh record ids are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Random UUID v4.
    #[default]
    Uuid,
    /// Milliseconds since the epoch followed by three random digits.
    /// Matches ids written by earlier versions of the back office.
    Timestamp,
}

impl IdStrategy {
    fn draw(self) -> String {
        match self {
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
            IdStrategy::Timestamp => {
                let suffix = Uuid::new_v4().as_u128() % 1000;
                format!("{}{:03}", Utc::now().timestamp_millis(), suffix)
            }
        }
    }

    /// Draw an id that does not collide with any id in `taken`.
    pub fn generate(self, taken: &HashSet<String>) -> String {
        loop {
            let id = self.draw();
            if !taken.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_parse_as_uuids() {
        let id = IdStrategy::Uuid.generate(&HashSet::new());
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn timestamp_ids_are_numeric() {
        let id = IdStrategy::Timestamp.generate(&HashSet::new());
        assert!(id.len() >= 16);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn timestamp_ids_never_repeat_within_a_burst() {
        let mut taken = HashSet::new();
        for _ in 0..500 {
            let id = IdStrategy::Timestamp.generate(&taken);
            assert!(taken.insert(id));
        }
    }

    #[test]
    fn strategy_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&IdStrategy::Timestamp).unwrap(),
            "\"timestamp\""
        );
    }
}
