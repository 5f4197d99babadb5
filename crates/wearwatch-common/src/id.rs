use chrono::{DateTime, Utc};

/// Alert id generator: a monotonic counter combined with the creation time.
///
/// Ids look like `ALT-1718000000-0001`. The counter never resets for the
/// lifetime of the sequence, so ids stay unique even when the clock stalls.
#[derive(Debug, Default)]
pub struct AlertIdSequence {
    counter: u64,
}

impl AlertIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> String {
        self.counter += 1;
        format!("ALT-{}-{:04}", now.timestamp(), self.counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_next_id_returns_unique_ids() {
        let mut seq = AlertIdSequence::new();
        let now = Utc::now();
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = seq.next_id(now);
            assert!(ids.insert(id), "Duplicate ID generated");
        }
        assert_eq!(seq.next_id(now), format!("ALT-{}-1001", now.timestamp()));
    }

    #[test]
    fn test_next_id_format() {
        let mut seq = AlertIdSequence::new();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(seq.next_id(now), "ALT-1700000000-0001");
        assert_eq!(seq.next_id(now), "ALT-1700000000-0002");
    }
}
